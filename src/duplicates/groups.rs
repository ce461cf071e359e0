//! Size buckets and the candidate group container.
//!
//! Size bucketing is the cheap first phase: files of different sizes cannot
//! be duplicates. Buckets that keep two or more members become
//! [`CandidateGroup`]s once content signatures are attached.
//!
//! `CandidateGroup` replaces the classic splice-a-linked-list-while-walking-it
//! construction with an index-stable vector plus a per-slot removal marker.
//! `count` and `aggregate_size` are maintained incrementally on every removal,
//! never by rescanning, and [`CandidateGroup::compact`] drops the marked
//! slots once a resolution pass is done.

use std::collections::{HashMap, HashSet};

use crate::scanner::{Candidate, FileMeta};

/// Files known to share one byte size, before content is read.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// Byte size shared by every member
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<FileMeta>,
}

/// Group files by exact size, keeping only buckets with 2+ members.
///
/// Hardlinks are collapsed here: two names for the same (device, inode) are
/// the same bytes on disk, so only the first name of each inode stays in a
/// bucket. Buckets come back ordered by size descending.
#[must_use]
pub fn bucket_by_size(files: Vec<FileMeta>) -> Vec<SizeBucket> {
    let total = files.len();
    let mut by_size: HashMap<u64, Vec<FileMeta>> = HashMap::new();
    for file in files {
        by_size.entry(file.size).or_default().push(file);
    }

    let mut buckets: Vec<SizeBucket> = by_size
        .into_iter()
        .filter_map(|(size, members)| {
            let mut seen_inodes: HashSet<(u64, u64)> = HashSet::new();
            let members: Vec<FileMeta> = members
                .into_iter()
                .filter(|m| {
                    // (0, 0) means "identity unknown", never collapse those.
                    if m.device_id == 0 && m.inode == 0 {
                        return true;
                    }
                    if seen_inodes.insert((m.device_id, m.inode)) {
                        true
                    } else {
                        log::debug!("Dropping hardlink: {}", m.path.display());
                        false
                    }
                })
                .collect();

            if members.len() < 2 {
                None
            } else {
                Some(SizeBucket { size, files: members })
            }
        })
        .collect();

    buckets.sort_by(|a, b| b.size.cmp(&a.size));

    let kept: usize = buckets.iter().map(|b| b.files.len()).sum();
    log::info!(
        "Size bucketing: {} file(s) -> {} potential duplicate(s) in {} bucket(s)",
        total,
        kept,
        buckets.len()
    );
    buckets
}

/// All candidates known to share one byte size.
///
/// Slots are never reordered; removal marks a slot dead and updates the
/// incremental bookkeeping. Indices therefore stay valid for the whole
/// resolution pass.
#[derive(Debug)]
pub struct CandidateGroup {
    /// Byte size shared by every member
    pub size: u64,
    candidates: Vec<Candidate>,
    removed: Vec<bool>,
    count: usize,
    aggregate_size: u64,
}

impl CandidateGroup {
    /// Build a group from candidates in chain (discovery) order.
    #[must_use]
    pub fn new(size: u64, candidates: Vec<Candidate>) -> Self {
        let count = candidates.len();
        let aggregate_size = candidates.iter().map(|c| c.size).sum();
        let removed = vec![false; count];
        Self {
            size,
            candidates,
            removed,
            count,
            aggregate_size,
        }
    }

    /// Number of slots, live or removed. Stable during a resolution pass.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.candidates.len()
    }

    /// Number of candidates still in the group.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of `size` over remaining candidates.
    #[must_use]
    pub fn aggregate_size(&self) -> u64 {
        self.aggregate_size
    }

    /// Whether no live candidates remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the slot at `idx` has not been removed.
    #[must_use]
    pub fn is_live(&self, idx: usize) -> bool {
        !self.removed[idx]
    }

    /// The candidate at `idx`, regardless of liveness.
    #[must_use]
    pub fn candidate(&self, idx: usize) -> &Candidate {
        &self.candidates[idx]
    }

    /// Clear the pending flag on the candidate at `idx`. Never set again.
    pub fn clear_pending(&mut self, idx: usize) {
        self.candidates[idx].pending = false;
    }

    /// Remove the slot at `idx` from the group.
    ///
    /// Updates `count` and `aggregate_size` incrementally. Marking an
    /// already-removed slot is a programming error.
    pub fn mark_removed(&mut self, idx: usize) {
        debug_assert!(!self.removed[idx], "slot {} removed twice", idx);
        self.removed[idx] = true;
        self.count -= 1;
        self.aggregate_size -= self.candidates[idx].size;
    }

    /// Drop removed slots, keeping live candidates in order.
    ///
    /// Call once the resolution pass is finished; indices handed out before
    /// this point are invalid afterwards.
    pub fn compact(&mut self) {
        if self.count == self.candidates.len() {
            return;
        }
        let removed = std::mem::take(&mut self.removed);
        let mut keep = removed.iter().map(|r| !r);
        self.candidates.retain(|_| keep.next().unwrap_or(false));
        self.removed = vec![false; self.candidates.len()];
        debug_assert_eq!(self.count, self.candidates.len());
    }

    /// Iterate over live candidates in chain order.
    pub fn iter_live(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .zip(self.removed.iter())
            .filter(|(_, r)| !**r)
            .map(|(c, _)| c)
    }
}
