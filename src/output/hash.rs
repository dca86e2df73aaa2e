//! The content fingerprint.
//!
//! XXH3-64 over each included descriptor's `path + 0x00 + content` in
//! sorted-path order. Internal sorting means permuting the input never
//! changes the digest, and the result is identical across platforms.

use xxhash_rust::xxh3::{Xxh3, xxh3_64};

use crate::descriptor::FileDescriptor;

/// Zero-padded 16-hex-char lowercase fingerprint of the included set.
#[must_use]
pub fn content_fingerprint(files: &[FileDescriptor]) -> String {
    let mut sorted: Vec<&FileDescriptor> = files.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut hasher = Xxh3::new();
    for fd in sorted {
        hasher.update(fd.path.as_bytes());
        hasher.update(&[0]);
        hasher.update(fd.content.as_bytes());
    }
    format!("{:016x}", hasher.digest())
}

/// Per-file hash of the processed content.
#[must_use]
pub fn file_hash(content: &str) -> u64 {
    xxh3_64(content.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn descriptor(path: &str, content: &str) -> FileDescriptor {
        let mut fd =
            FileDescriptor::new(path.to_string(), PathBuf::from(path), content.len() as u64);
        fd.content = content.to_string();
        fd
    }

    #[test]
    fn fingerprint_is_sixteen_lowercase_hex_chars() {
        let files = vec![descriptor("a.txt", "alpha")];
        let hash = content_fingerprint(&files);
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash.to_lowercase());
    }

    #[test]
    fn permuted_input_yields_identical_fingerprint() {
        let a = descriptor("a.txt", "alpha");
        let b = descriptor("b.txt", "beta");
        let forward = content_fingerprint(&[a.clone(), b.clone()]);
        let backward = content_fingerprint(&[b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn content_changes_change_the_fingerprint() {
        let before = content_fingerprint(&[descriptor("a.txt", "alpha")]);
        let after = content_fingerprint(&[descriptor("a.txt", "alphb")]);
        assert_ne!(before, after);
    }

    #[test]
    fn path_participates_in_the_stream() {
        let one = content_fingerprint(&[descriptor("a.txt", "same")]);
        let other = content_fingerprint(&[descriptor("b.txt", "same")]);
        assert_ne!(one, other);
    }

    #[test]
    fn separator_prevents_boundary_ambiguity() {
        // "ab" + "c" must not collide with "a" + "bc".
        let one = content_fingerprint(&[descriptor("ab", "c")]);
        let other = content_fingerprint(&[descriptor("a", "bc")]);
        assert_ne!(one, other);
    }

    #[test]
    fn empty_set_still_fingerprints() {
        assert_eq!(content_fingerprint(&[]).len(), 16);
    }

    #[test]
    fn per_file_hash_is_stable() {
        assert_eq!(file_hash("hello"), file_hash("hello"));
        assert_ne!(file_hash("hello"), file_hash("world"));
        assert_eq!(file_hash(""), file_hash(""));
    }
}
