//! Parallel resolution against one shared report.
//!
//! Many groups resolve concurrently while writing to the same audit log;
//! the shared lock must keep every cluster's records contiguous.

use std::path::PathBuf;
use std::sync::Mutex;

use rayon::prelude::*;

use dupelint::config::{DisposalMode, Settings};
use dupelint::duplicates::{CandidateGroup, Resolver};
use dupelint::report::{AuditLog, ReportState};
use dupelint::scanner::{walker, Candidate, ContentSignature, DIGEST_LEN};

fn candidate(path: String, size: u64, digest: u8) -> Candidate {
    Candidate::new(
        walker::FileMeta {
            path: PathBuf::from(path),
            size,
            device_id: 1,
            inode: 0,
        },
        ContentSignature {
            digest: [digest; DIGEST_LEN],
            fingerprints: [[digest; DIGEST_LEN], [digest; DIGEST_LEN]],
        },
    )
}

#[test]
fn parallel_groups_keep_clusters_contiguous_in_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit.log");
    let settings = Settings {
        mode: DisposalMode::Report,
        paranoid: false,
        output: Some(log_path.clone()),
        line_suffix: "\n".to_string(),
        io_threads: 4,
    };

    // 32 groups, one cluster of three per group, each with its own digest
    // byte so the log lines can be attributed afterwards.
    let mut groups: Vec<CandidateGroup> = (0..32u8)
        .map(|g| {
            let size = 100 + u64::from(g);
            CandidateGroup::new(
                size,
                (0..3)
                    .map(|n| candidate(format!("/par/g{}/f{}", g, n), size, g + 1))
                    .collect(),
            )
        })
        .collect();

    let shared = Mutex::new(ReportState::new(AuditLog::open(&settings)));
    let resolver = Resolver::new(&settings, &shared);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    pool.install(|| {
        groups
            .par_iter_mut()
            .try_for_each(|group| resolver.resolve(group).map(|_| ()))
    })
    .unwrap();

    {
        let mut report = shared.lock().unwrap();
        assert_eq!(report.duplicates, 64); // two per group
        report.log.flush();
    }

    // Parse record lines back: (marker, digest).
    let text = std::fs::read_to_string(&log_path).unwrap();
    let records: Vec<(char, String)> = text
        .lines()
        .filter(|l| l.starts_with('0') || l.starts_with('1'))
        .map(|l| {
            let marker = l.chars().next().unwrap();
            let digest = l.rsplit(' ').next().unwrap().to_string();
            (marker, digest)
        })
        .collect();
    assert_eq!(records.len(), 96);

    // Every cluster must appear as one original record immediately followed
    // by its duplicates, never interleaved with another digest's records.
    let mut idx = 0;
    while idx < records.len() {
        let (marker, digest) = &records[idx];
        assert_eq!(*marker, '0', "cluster must open with an original record");
        assert_eq!(records[idx + 1], ('1', digest.clone()));
        assert_eq!(records[idx + 2], ('1', digest.clone()));
        idx += 3;
    }

    // All 32 digests made it through exactly once as an original.
    let originals: std::collections::HashSet<&str> = records
        .iter()
        .filter(|(m, _)| *m == '0')
        .map(|(_, d)| d.as_str())
        .collect();
    assert_eq!(originals.len(), 32);
}

#[test]
fn parallel_groups_accumulate_wasted_bytes_exactly() {
    let settings = Settings {
        mode: DisposalMode::Report,
        paranoid: false,
        output: None,
        line_suffix: "\n".to_string(),
        io_threads: 8,
    };

    // 100 pairs of duplicates, each pair 10 bytes: 1000 wasted bytes.
    let mut groups: Vec<CandidateGroup> = (0..100u8)
        .map(|g| {
            CandidateGroup::new(
                10,
                vec![
                    candidate(format!("/acc/{}/a", g), 10, g),
                    candidate(format!("/acc/{}/b", g), 10, g),
                ],
            )
        })
        .collect();

    let shared = Mutex::new(ReportState::new(AuditLog::disabled()));
    let resolver = Resolver::new(&settings, &shared);

    groups
        .par_iter_mut()
        .try_for_each(|group| resolver.resolve(group).map(|_| ()))
        .unwrap();

    let report = shared.lock().unwrap();
    assert_eq!(report.duplicates, 100);
    assert_eq!(report.wasted_bytes, 1000);
}
