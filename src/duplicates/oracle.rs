//! Content equality decisions.
//!
//! Two layers: [`digest_equal`] compares the attached hashes without any
//! I/O, and [`byte_exact_equal`] re-reads both files in lockstep for the
//! paranoid among us.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::scanner::Candidate;

/// Chunk size for the byte-exact comparison.
pub const READ_CHUNK: usize = 8192;

/// Compare two candidates' digest and both fingerprints.
///
/// Pure and side-effect free; true only if all three buffers match entirely.
#[must_use]
pub fn digest_equal(a: &Candidate, b: &Candidate) -> bool {
    a.digest == b.digest
        && a.fingerprints[0] == b.fingerprints[0]
        && a.fingerprints[1] == b.fingerprints[1]
}

/// Byte-for-byte comparison of two files.
///
/// Reads fixed-size chunks from each file in lockstep. Unequal chunk lengths
/// or any differing byte means not-equal; both streams running dry at the
/// same moment means equal.
///
/// A path that cannot be opened is a hard not-equal. The historical behavior
/// here treated an open failure as "equal", which turned a vanished or
/// unreadable file into a confirmed duplicate; that defect is deliberately
/// not preserved.
///
/// Known limitation: a read error surfacing as a short-but-equal-length read
/// on both sides at once is indistinguishable from simultaneous EOF. An
/// error reported by the OS is handled (not-equal), this one case cannot be.
#[must_use]
pub fn byte_exact_equal(a: &Path, b: &Path) -> bool {
    let mut fa = match File::open(a) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Cannot open {} for verification: {}", a.display(), e);
            return false;
        }
    };
    let mut fb = match File::open(b) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("Cannot open {} for verification: {}", b.display(), e);
            return false;
        }
    };

    let mut ba = [0u8; READ_CHUNK];
    let mut bb = [0u8; READ_CHUNK];

    loop {
        let na = match fa.read(&mut ba) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Read error on {} during verification: {}", a.display(), e);
                return false;
            }
        };
        let nb = match fb.read(&mut bb) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Read error on {} during verification: {}", b.display(), e);
                return false;
            }
        };

        if na != nb {
            return false;
        }
        if na == 0 {
            return true;
        }
        if ba[..na] != bb[..nb] {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ContentSignature, FileMeta, DIGEST_LEN};
    use std::fs;
    use std::path::PathBuf;

    fn candidate(digest: u8, fp0: u8, fp1: u8) -> Candidate {
        Candidate::new(
            FileMeta {
                path: PathBuf::from("/x"),
                size: 1,
                device_id: 0,
                inode: 0,
            },
            ContentSignature {
                digest: [digest; DIGEST_LEN],
                fingerprints: [[fp0; DIGEST_LEN], [fp1; DIGEST_LEN]],
            },
        )
    }

    #[test]
    fn test_digest_equal_all_match() {
        assert!(digest_equal(&candidate(1, 2, 3), &candidate(1, 2, 3)));
    }

    #[test]
    fn test_digest_equal_rejects_digest_difference() {
        assert!(!digest_equal(&candidate(1, 2, 3), &candidate(9, 2, 3)));
    }

    #[test]
    fn test_digest_equal_rejects_head_fingerprint_difference() {
        assert!(!digest_equal(&candidate(1, 2, 3), &candidate(1, 9, 3)));
    }

    #[test]
    fn test_digest_equal_rejects_tail_fingerprint_difference() {
        assert!(!digest_equal(&candidate(1, 2, 3), &candidate(1, 2, 9)));
    }

    #[test]
    fn test_digest_equal_single_byte_difference() {
        let a = candidate(1, 2, 3);
        let mut b = candidate(1, 2, 3);
        b.digest[DIGEST_LEN - 1] ^= 0x01;
        assert!(!digest_equal(&a, &b));
    }

    #[test]
    fn test_byte_exact_equal_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"same content here").unwrap();
        fs::write(&b, b"same content here").unwrap();
        assert!(byte_exact_equal(&a, &b));
    }

    #[test]
    fn test_byte_exact_differing_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"same content here").unwrap();
        fs::write(&b, b"same content herE").unwrap();
        assert!(!byte_exact_equal(&a, &b));
    }

    #[test]
    fn test_byte_exact_different_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"short").unwrap();
        fs::write(&b, b"short but longer").unwrap();
        assert!(!byte_exact_equal(&a, &b));
        assert!(!byte_exact_equal(&b, &a));
    }

    #[test]
    fn test_byte_exact_multi_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        // Difference in the second chunk.
        let mut one = vec![0xaau8; READ_CHUNK * 2 + 17];
        let two = one.clone();
        one[READ_CHUNK + 5] = 0xbb;
        fs::write(&a, &one).unwrap();
        fs::write(&b, &two).unwrap();
        assert!(!byte_exact_equal(&a, &b));

        fs::write(&a, &two).unwrap();
        assert!(byte_exact_equal(&a, &b));
    }

    #[test]
    fn test_byte_exact_open_failure_is_not_equal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        fs::write(&a, b"exists").unwrap();
        let missing = dir.path().join("missing");
        assert!(!byte_exact_equal(&a, &missing));
        assert!(!byte_exact_equal(&missing, &a));
        assert!(!byte_exact_equal(&missing, &missing));
    }

    #[test]
    fn test_byte_exact_empty_files_equal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();
        assert!(byte_exact_equal(&a, &b));
    }
}
