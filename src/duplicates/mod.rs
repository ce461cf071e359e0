//! Duplicate confirmation core.
//!
//! # Architecture
//!
//! - [`groups`]: size buckets and the index-stable candidate group container
//! - [`oracle`]: content equality decisions (digest, fingerprints, byte-exact)
//! - [`resolver`]: per-group confirmation, reporting and disposal
//!
//! A group enters [`resolver::Resolver::resolve`] with every candidate
//! pending; it leaves with each confirmed candidate logged and disposed of,
//! and each candidate that matched nothing removed from the group.

pub mod groups;
pub mod oracle;
pub mod resolver;

pub use groups::{bucket_by_size, CandidateGroup, SizeBucket};
pub use resolver::{Cancelled, Resolver};

/// A confirmed candidate's role within its cluster.
///
/// Cluster membership is decided purely by chain order: the first pending
/// candidate encountered becomes the reported original. That choice is
/// arbitrary but deterministic, driven by the scanner's ordering, and is
/// part of the contract; no secondary key (mtime, path length) is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The first member of a cluster, the one duplicates are compared against.
    Original,
    /// A confirmed copy of the cluster's original.
    Duplicate,
}

impl Role {
    /// The marker bit written at the start of a structured log line.
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Original => '0',
            Self::Duplicate => '1',
        }
    }
}
