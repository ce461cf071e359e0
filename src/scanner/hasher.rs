//! Content digests and partial fingerprints.
//!
//! Every candidate carries three 128-bit values: a digest of the whole file
//! and two fingerprints hashing the first and last [`FINGERPRINT_SPAN`] bytes.
//! The fingerprints are a cheap pre-filter: two files whose heads or tails
//! already differ are rejected without trusting the digest at all.
//!
//! All three values come from BLAKE3 in XOF mode, truncated to 16 bytes.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use rayon::prelude::*;

use crate::duplicates::{CandidateGroup, SizeBucket};
use crate::scanner::Candidate;

/// Digest width in bytes (128 bits).
pub const DIGEST_LEN: usize = 16;

/// A fixed-size 128-bit hash value.
pub type Digest = [u8; DIGEST_LEN];

/// How many bytes of the head and tail each fingerprint covers.
pub const FINGERPRINT_SPAN: u64 = 4096;

/// Read buffer for the full-content pass.
const READ_BUF: usize = 64 * 1024;

/// Full digest plus head/tail fingerprints for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSignature {
    /// Digest over the entire content
    pub digest: Digest,
    /// Hashes of the first and last [`FINGERPRINT_SPAN`] bytes
    pub fingerprints: [Digest; 2],
}

/// Compute the content signature of one file.
///
/// Reads the file three times: head fragment, tail fragment, full content.
/// For files shorter than [`FINGERPRINT_SPAN`] all three cover the same
/// bytes, which is harmless.
///
/// # Errors
///
/// Returns any I/O error from opening or reading the file.
pub fn signature(path: &Path) -> io::Result<ContentSignature> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();

    let head_len = size.min(FINGERPRINT_SPAN) as usize;
    let mut head = vec![0u8; head_len];
    file.read_exact(&mut head)?;
    let fp_head = hash_fragment(&head);

    file.seek(SeekFrom::Start(size.saturating_sub(FINGERPRINT_SPAN)))?;
    let mut tail = Vec::with_capacity(head_len);
    file.read_to_end(&mut tail)?;
    let fp_tail = hash_fragment(&tail);

    file.seek(SeekFrom::Start(0))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; READ_BUF];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(ContentSignature {
        digest: finalize16(&hasher),
        fingerprints: [fp_head, fp_tail],
    })
}

/// Hash every bucket member and assemble the candidate groups.
///
/// Hashing runs on a bounded rayon pool (`io_threads`) to keep disk seeks in
/// check. Order within each group follows discovery order; the resolver's
/// original/duplicate tie-break depends on it. A member whose signature
/// cannot be computed is dropped with a warning, and buckets left with fewer
/// than two members are discarded.
#[must_use]
pub fn attach_signatures(buckets: Vec<SizeBucket>, io_threads: usize) -> Vec<CandidateGroup> {
    if buckets.is_empty() {
        return Vec::new();
    }

    let total: usize = buckets.iter().map(|b| b.files.len()).sum();
    log::info!("Computing signatures for {} file(s)", total);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(io_threads)
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "Failed to create custom thread pool, using global pool with {} threads",
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        });

    pool.install(|| {
        buckets
            .into_par_iter()
            .filter_map(|bucket| {
                let size = bucket.size;
                // Parallel collect into Vec preserves input order, so chain
                // order stays the scanner's discovery order.
                let candidates: Vec<Candidate> = bucket
                    .files
                    .into_par_iter()
                    .filter_map(|meta| match signature(&meta.path) {
                        Ok(sig) => Some(Candidate::new(meta, sig)),
                        Err(e) => {
                            log::warn!("Cannot hash {}: {}", meta.path.display(), e);
                            None
                        }
                    })
                    .collect();

                if candidates.len() < 2 {
                    log::debug!("Bucket of size {} collapsed below two members", size);
                    return None;
                }
                Some(CandidateGroup::new(size, candidates))
            })
            .collect()
    })
}

/// The digest as a fixed-width (32-character) hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    digest.iter().fold(String::with_capacity(32), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}

fn hash_fragment(data: &[u8]) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    finalize16(&hasher)
}

fn finalize16(hasher: &blake3::Hasher) -> Digest {
    let mut out = [0u8; DIGEST_LEN];
    hasher.finalize_xof().fill(&mut out);
    out
}
