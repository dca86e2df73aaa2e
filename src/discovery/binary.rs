//! Binary detection and the large-file threshold.

use std::io::Read;
use std::path::Path;

/// Bytes sniffed from the head of each file.
pub const BINARY_SNIFF_LEN: usize = 8192;

/// A file is binary when any null byte appears in its first
/// [`BINARY_SNIFF_LEN`] bytes. Empty files are not binary.
///
/// # Errors
/// Propagates the underlying read error; the caller records it on the
/// descriptor instead of classifying the file.
pub fn is_binary_file(path: &Path) -> std::io::Result<bool> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = [0u8; BINARY_SNIFF_LEN];
    let mut filled = 0;
    loop {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == BINARY_SNIFF_LEN {
            break;
        }
    }
    Ok(buf[..filled].contains(&0))
}

/// Whether a file exceeds the configured threshold. `0` disables the check.
#[must_use]
pub const fn exceeds_size_limit(size: u64, max_file_size: u64) -> bool {
    max_file_size > 0 && size > max_file_size
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn text_file_is_not_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "plain text\nwith lines\n").unwrap();
        assert!(!is_binary_file(&path).unwrap());
    }

    #[test]
    fn null_byte_marks_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, b"ELF\x00\x01\x02").unwrap();
        assert!(is_binary_file(&path).unwrap());
    }

    #[test]
    fn empty_file_is_not_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();
        assert!(!is_binary_file(&path).unwrap());
    }

    #[test]
    fn null_byte_beyond_sniff_window_is_missed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late-null");
        let mut bytes = vec![b'a'; BINARY_SNIFF_LEN];
        bytes.push(0);
        fs::write(&path, &bytes).unwrap();
        assert!(!is_binary_file(&path).unwrap());
    }

    #[test]
    fn missing_file_propagates_error() {
        let dir = TempDir::new().unwrap();
        assert!(is_binary_file(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn size_limit_zero_disables_check() {
        assert!(!exceeds_size_limit(10_000_000, 0));
        assert!(exceeds_size_limit(2_000_000, 1_048_576));
        assert!(!exceeds_size_limit(1_048_576, 1_048_576));
    }
}
