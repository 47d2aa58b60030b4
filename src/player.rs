// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{
    error::Error,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{error, info, span, Level, Span};

use crate::{
    notation::SheetData,
    playback::{PlaybackState, PlaybackStatus, PlaybackUpdate, Scheduler, Transport},
    playsync::CancelHandle,
};

/// The default position poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

struct PollHandles {
    join: JoinHandle<()>,
    cancel: CancelHandle,
}

/// Drives a [`Scheduler`] from a background thread that polls the transport while playing.
///
/// All calls are safe to make from any thread. The poll thread is always cancelled and joined
/// before a call that changes the timeline or stops playback, so no update is published after
/// `pause`, `stop` or `dispose` return.
pub struct Player {
    scheduler: Arc<Mutex<Scheduler>>,
    /// Keeps track of the poll thread. There should only be one at a time.
    poll: Mutex<Option<PollHandles>>,
    poll_interval: Duration,
    /// The logging span.
    span: Span,
}

impl Player {
    /// Creates a new player.
    pub fn new(transport: Arc<dyn Transport>, poll_interval: Duration) -> Player {
        Player {
            scheduler: Arc::new(Mutex::new(Scheduler::new(transport))),
            poll: Mutex::new(None),
            poll_interval,
            span: span!(Level::INFO, "player"),
        }
    }

    /// Loads a new sheet, stopping anything that's playing.
    pub fn load(&self, sheet: &SheetData) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        let mut poll = self.poll.lock();
        Player::stop_poll(poll.take());
        self.scheduler.lock().load(sheet)
    }

    /// Starts playback and the position poll.
    pub fn play(&self) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        let mut poll = self.poll.lock();
        {
            let mut scheduler = self.scheduler.lock();
            scheduler.play()?;
            if scheduler.state().status != PlaybackStatus::Playing {
                return Ok(());
            }
        }

        Player::stop_poll(poll.take());

        let cancel = CancelHandle::new();
        let join = {
            let scheduler = self.scheduler.clone();
            let cancel = cancel.clone();
            let poll_interval = self.poll_interval;
            thread::spawn(move || Player::poll(scheduler, cancel, poll_interval))
        };
        *poll = Some(PollHandles { join, cancel });
        Ok(())
    }

    /// Pauses playback.
    pub fn pause(&self) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        let mut poll = self.poll.lock();
        Player::stop_poll(poll.take());
        self.scheduler.lock().pause()
    }

    /// Stops playback and rewinds.
    pub fn stop(&self) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        let mut poll = self.poll.lock();
        Player::stop_poll(poll.take());
        self.scheduler.lock().stop()
    }

    pub fn seek_to(&self, position: f64) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();
        self.scheduler.lock().seek_to(position)
    }

    pub fn set_tempo(&self, multiplier: f64) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();
        self.scheduler.lock().set_tempo(multiplier)
    }

    /// A snapshot of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.scheduler.lock().state().clone()
    }

    pub fn subscribe(&self) -> Receiver<PlaybackUpdate> {
        self.scheduler.lock().subscribe()
    }

    /// Stops the poll and the transport. Nothing is published after this returns.
    pub fn dispose(&self) {
        let _enter = self.span.enter();

        let mut poll = self.poll.lock();
        Player::stop_poll(poll.take());
        if let Err(e) = self.scheduler.lock().stop() {
            error!(err = e.as_ref(), "Error stopping transport while disposing.");
        }
    }

    fn poll(scheduler: Arc<Mutex<Scheduler>>, cancel: CancelHandle, poll_interval: Duration) {
        loop {
            {
                let mut scheduler = scheduler.lock();
                if cancel.is_cancelled() {
                    return;
                }
                scheduler.tick();
                if scheduler.state().status != PlaybackStatus::Playing {
                    info!("Playback ended, position poll exiting.");
                    return;
                }
            }

            if cancel.wait_timeout(poll_interval) {
                return;
            }
        }
    }

    fn stop_poll(handles: Option<PollHandles>) {
        if let Some(handles) = handles {
            handles.cancel.cancel();
            if handles.join.join().is_err() {
                error!("Position poll thread panicked.");
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, sync::Arc, time::Duration};

    use crate::{
        notation::{build_sheet_data, SheetData},
        playback::{
            mock::{self, Call},
            PlaybackStatus, PlaybackUpdate,
        },
        testutil::{eventually, note},
    };

    use super::Player;

    fn sheet() -> SheetData {
        build_sheet_data(&[note(60, 0.0, 0.5), note(64, 0.5, 1.0)], 120.0, 4, 4, 0)
    }

    fn setup() -> Result<(Player, mock::Transport), Box<dyn Error>> {
        let transport = mock::Transport::get("mock-transport");
        let player = Player::new(Arc::new(transport.clone()), Duration::from_millis(5));
        player.load(&sheet())?;
        Ok((player, transport))
    }

    #[test]
    fn test_poll_tracks_position() -> Result<(), Box<dyn Error>> {
        let (player, transport) = setup()?;
        let updates = player.subscribe();

        player.play()?;
        assert_eq!(PlaybackStatus::Playing, player.state().status);

        transport.set_position(0.25);
        eventually(
            || player.state().current_note_index == Some(0),
            "Cursor never reached the first note",
        );

        transport.set_position(0.75);
        eventually(
            || player.state().current_note_index == Some(1),
            "Cursor never reached the second note",
        );

        transport.set_position(1.5);
        eventually(
            || player.state().status == PlaybackStatus::Stopped,
            "Playback never finished",
        );

        let finished = updates
            .try_iter()
            .filter(|update| *update == PlaybackUpdate::Finished)
            .count();
        assert_eq!(1, finished);
        Ok(())
    }

    #[test]
    fn test_pause_stops_updates() -> Result<(), Box<dyn Error>> {
        let (player, transport) = setup()?;
        let updates = player.subscribe();

        player.play()?;
        transport.set_position(0.25);
        eventually(
            || player.state().current_note_index == Some(0),
            "Cursor never reached the first note",
        );

        player.pause()?;
        assert_eq!(PlaybackStatus::Paused, player.state().status);
        let _ = updates.try_iter().count();

        transport.set_position(0.75);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(0, updates.try_iter().count());
        assert_eq!(Some(0), player.state().current_note_index);

        player.play()?;
        eventually(
            || player.state().current_note_index == Some(1),
            "Cursor never moved after resuming",
        );
        Ok(())
    }

    #[test]
    fn test_stop_and_replay() -> Result<(), Box<dyn Error>> {
        let (player, transport) = setup()?;

        player.play()?;
        player.stop()?;
        assert_eq!(PlaybackStatus::Stopped, player.state().status);
        assert_eq!(0.0, player.state().current_position);

        player.play()?;
        transport.set_position(0.75);
        eventually(
            || player.state().current_note_index == Some(1),
            "Cursor never moved after replaying",
        );
        assert_eq!(
            &[Call::LoadEvents(2), Call::Play, Call::Stop, Call::Play],
            &transport.calls()[..4]
        );
        Ok(())
    }

    #[test]
    fn test_load_while_playing() -> Result<(), Box<dyn Error>> {
        let (player, _transport) = setup()?;
        player.play()?;

        player.load(&build_sheet_data(&[note(60, 0.0, 4.0)], 120.0, 4, 4, 0))?;
        let state = player.state();
        assert_eq!(PlaybackStatus::Stopped, state.status);
        assert_eq!(4.0, state.total_duration);
        Ok(())
    }

    #[test]
    fn test_dispose() -> Result<(), Box<dyn Error>> {
        let (player, transport) = setup()?;
        let updates = player.subscribe();

        player.play()?;
        player.dispose();
        assert_eq!(PlaybackStatus::Stopped, player.state().status);
        let _ = updates.try_iter().count();

        transport.set_position(0.25);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(0, updates.try_iter().count());
        assert_eq!(Some(&Call::Stop), transport.calls().last());
        Ok(())
    }
}
