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

use std::path::Path;

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Outputs the given number of seconds in a minutes:seconds.tenths format. Negative or
/// non-finite values display as zero.
pub fn seconds_display(seconds: f64) -> String {
    let tenths = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 10.0).floor() as u64
    } else {
        0
    };
    let minutes = tenths / 600;
    let secs = (tenths % 600) / 10;
    format!("{}:{:02}.{}", minutes, secs, tenths % 10)
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::util::{filename_display, seconds_display};

    #[test]
    fn test_seconds_display() {
        assert_eq!("0:00.0", seconds_display(0.0));
        assert_eq!("0:00.5", seconds_display(0.5));
        assert_eq!("0:05.0", seconds_display(5.0));
        assert_eq!("0:55.2", seconds_display(55.25));
        assert_eq!("1:00.0", seconds_display(60.0));
        assert_eq!("2:05.0", seconds_display(125.0));
        assert_eq!("60:06.0", seconds_display(3606.0));
        assert_eq!("0:00.0", seconds_display(-3.0));
        assert_eq!("0:00.0", seconds_display(f64::NAN));
    }

    #[test]
    fn test_filename_display() {
        assert_eq!("song.mid", filename_display(Path::new("/music/song.mid")));
        assert_eq!("unreadable file name", filename_display(Path::new("/")));
    }
}
