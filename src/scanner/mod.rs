//! Scanner module for file discovery and content signatures.
//!
//! This module provides the collaborators the resolver consumes:
//! - [`walker`]: directory traversal and file discovery
//! - [`hasher`]: content digests and partial fingerprints (BLAKE3, 128-bit)
//!
//! The scanner constructs [`Candidate`] records; the duplicates module owns
//! them from there.

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{digest_to_hex, ContentSignature, Digest, DIGEST_LEN};
pub use walker::FileMeta;

/// One file under consideration for duplicate status.
///
/// Built from a [`FileMeta`] plus its [`ContentSignature`]. The `pending`
/// flag starts `true` and is cleared forever the moment the candidate is
/// confirmed as part of a duplicate relationship, original or copy.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Absolute or as-discovered path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Device the file lives on (0 where the platform has no notion)
    pub device_id: u64,
    /// Inode number (0 where the platform has no notion)
    pub inode: u64,
    /// Full-content 128-bit digest
    pub digest: Digest,
    /// Head and tail partial fingerprints, cheap pre-filter for the digest
    pub fingerprints: [Digest; 2],
    /// True until this candidate is confirmed in a duplicate relationship
    pub pending: bool,
}

impl Candidate {
    /// Combine file metadata with its content signature.
    #[must_use]
    pub fn new(meta: FileMeta, signature: ContentSignature) -> Self {
        Self {
            path: meta.path,
            size: meta.size,
            device_id: meta.device_id,
            inode: meta.inode,
            digest: signature.digest,
            fingerprints: signature.fingerprints,
            pending: true,
        }
    }

    /// The digest as a fixed-width hex string (32 characters).
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }
}
