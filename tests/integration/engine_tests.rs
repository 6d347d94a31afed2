use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use linkdupe::dedup::{DedupConfig, DedupEngine, EntrySet};
use linkdupe::error::ErrorKind;
use linkdupe::progress::ProgressCallback;
use linkdupe::scanner::Entry;

use super::support::{MemFs, Op};

fn engine(fs: MemFs) -> DedupEngine<MemFs> {
    DedupEngine::with_filesystem(DedupConfig::default().with_block_size(4), fs)
}

fn pairs(report: &linkdupe::dedup::DedupReport) -> Vec<(String, String)> {
    report
        .linked
        .iter()
        .map(|p| {
            (
                p.keep.display().to_string(),
                p.removed.display().to_string(),
            )
        })
        .collect()
}

fn pair(keep: &str, removed: &str) -> (String, String) {
    (keep.to_string(), removed.to_string())
}

#[test]
fn test_three_identical_files_link_to_first() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"same content here")
        .add("/b", 1, b"same content here")
        .add("/c", 1, b"same content here");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert_eq!(pairs(&report), vec![pair("/a", "/b"), pair("/a", "/c")]);
    assert_eq!(fs.ino("/b"), fs.ino("/a"));
    assert_eq!(fs.ino("/c"), fs.ino("/a"));
    assert_eq!(report.stats.linked, 2);
    assert_eq!(report.stats.bytes_reclaimed, 2 * 17);
    assert!(!report.has_errors());
}

#[test]
fn test_cross_device_pair_is_skipped_silently() {
    let fs = MemFs::new();
    fs.add("/x", 1, b"payload payload").add("/y", 2, b"payload payload");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert!(report.linked.is_empty());
    assert!(!report.has_errors());
    assert_eq!(report.stats.skipped_cross_device, 1);
    assert_eq!(report.stats.comparisons, 0);
    assert!(!fs.ops().iter().any(|op| matches!(op, Op::Open(_))));
    assert!(!fs.mutated());
}

#[test]
fn test_same_inode_pair_is_not_relinked() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"already linked!!").add_link("/a", "/a2");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert!(report.linked.is_empty());
    assert_eq!(report.stats.skipped_same_file, 1);
    assert!(!engine.filesystem().mutated());
}

#[test]
fn test_different_content_same_size_untouched() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"aaaaaaaaaaaaaaaa")
        .add("/b", 1, b"aaaaaaaaaaaaaaab");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert!(report.linked.is_empty());
    assert_eq!(report.stats.different, 1);
    assert_ne!(engine.filesystem().ino("/a"), engine.filesystem().ino("/b"));
}

#[test]
fn test_size_groups_are_independent() {
    let fs = MemFs::new();
    fs.add("/big1", 1, b"0123456789abcdef0123")
        .add("/small1", 1, b"0123456789abcdef")
        .add("/big2", 1, b"0123456789abcdef0123")
        .add("/small2", 1, b"0123456789abcdef");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert_eq!(
        pairs(&report),
        vec![pair("/small1", "/small2"), pair("/big1", "/big2")]
    );
    assert_eq!(report.stats.anchors, 2);
}

#[test]
fn test_disposed_entries_are_never_touched_again() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"common bytes!!!!")
        .add("/b", 1, b"common bytes!!!!")
        .add("/c", 1, b"common bytes!!!!")
        .add("/d", 1, b"distinct bytes!!");
    let mut entries = fs.entries();

    let engine = engine(fs);
    engine.run(&mut entries);
    let ops = engine.filesystem().ops();

    for removed in engine.filesystem().removed() {
        let at = ops
            .iter()
            .position(|op| *op == Op::Remove(removed.clone()))
            .unwrap();
        let touched_later = ops[at + 1..].iter().any(|op| match op {
            Op::Open(p) | Op::Stat(p) | Op::Remove(p) => *p == removed,
            Op::Link(_, _) => false,
        });
        assert!(!touched_later, "{} touched after disposal", removed.display());
    }

    // Every entry ends up disposed after a complete run
    assert_eq!(entries.live_count(), 0);
}

#[test]
fn test_unreadable_anchor_abandons_its_run_only() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!")
        .add("/b", 1, b"shared content!!")
        .add("/c", 1, b"shared content!!")
        .fail_open("/a");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), ErrorKind::OpenFailed);
    assert_eq!(report.errors[0].path(), PathBuf::from("/a"));
    // /b becomes the next anchor
    assert_eq!(pairs(&report), vec![pair("/b", "/c")]);
    assert!(engine.filesystem().exists("/a"));
}

#[test]
fn test_unreadable_candidate_is_disposed_and_scan_continues() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!")
        .add("/b", 1, b"shared content!!")
        .add("/c", 1, b"shared content!!")
        .fail_open("/b");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path(), PathBuf::from("/b"));
    assert_eq!(pairs(&report), vec![pair("/a", "/c")]);

    // /b failed once and was never retried as an anchor
    let opens_of_b = engine
        .filesystem()
        .ops()
        .into_iter()
        .filter(|op| *op == Op::Open(PathBuf::from("/b")))
        .count();
    assert_eq!(opens_of_b, 1);
}

#[test]
fn test_candidate_stat_failure_is_reported() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"0123456789abcdef")
        .add("/b", 1, b"0123456789abcdef")
        .fail_stat("/b");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert!(report.linked.is_empty());
    assert_eq!(report.errors[0].kind(), ErrorKind::StatFailed);
    assert!(!engine.filesystem().mutated());
}

#[test]
fn test_remove_failure_leaves_duplicate_in_place() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!")
        .add("/b", 1, b"shared content!!")
        .add("/c", 1, b"shared content!!")
        .fail_remove("/b");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), ErrorKind::RemoveFailed);
    assert!(!report.errors[0].lost_path());
    assert_eq!(pairs(&report), vec![pair("/a", "/c")]);

    assert!(fs.exists("/b"));
    assert_ne!(fs.ino("/b"), fs.ino("/a"));
    // No link attempted for /b
    assert!(!fs
        .ops()
        .iter()
        .any(|op| matches!(op, Op::Link(_, link) if link == &PathBuf::from("/b"))));
}

#[test]
fn test_link_failure_reports_missing_path() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!")
        .add("/b", 1, b"shared content!!")
        .fail_link("/b");
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert!(report.linked.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind(), ErrorKind::LinkFailed);
    assert!(report.errors[0].lost_path());
    assert!(report.errors[0].to_string().contains("/b is now missing"));
    assert!(!engine.filesystem().exists("/b"));
}

#[test]
fn test_preset_shutdown_does_nothing() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!").add("/b", 1, b"shared content!!");
    let mut entries = fs.entries();

    let flag = Arc::new(AtomicBool::new(true));
    let engine = DedupEngine::with_filesystem(DedupConfig::default().with_shutdown_flag(flag), fs);
    let report = engine.run(&mut entries);

    assert!(report.interrupted);
    assert!(report.linked.is_empty());
    assert!(engine.filesystem().ops().is_empty());
}

/// Raises the shutdown flag once the engine reaches a given anchor.
struct StopAt {
    anchor: usize,
    flag: Arc<AtomicBool>,
}

impl ProgressCallback for StopAt {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, current: usize, _path: &str) {
        if current >= self.anchor {
            self.flag.store(true, Ordering::SeqCst);
        }
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_shutdown_between_pairs_completes_started_transactions() {
    let fs = MemFs::new();
    fs.add("/s1", 1, b"sixteen bytes!!!")
        .add("/s2", 1, b"sixteen bytes!!!")
        .add("/t1", 1, b"twenty bytes, twenty")
        .add("/t2", 1, b"twenty bytes, twenty");
    let mut entries = fs.entries();

    let flag = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(StopAt {
        anchor: 3,
        flag: Arc::clone(&flag),
    });
    let config = DedupConfig::default()
        .with_shutdown_flag(flag)
        .with_progress_callback(stop);
    let engine = DedupEngine::with_filesystem(config, fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert!(report.interrupted);
    assert_eq!(pairs(&report), vec![pair("/s1", "/s2")]);
    assert_eq!(fs.ino("/s2"), fs.ino("/s1"));
    assert_ne!(fs.ino("/t2"), fs.ino("/t1"));
    // Every removal was followed by its link
    assert_eq!(fs.removed().len(), 1);
    assert!(fs.exists("/s2"));
}

#[test]
fn test_two_of_three_equal_size_files_identical() {
    let same = vec![b'a'; 100];
    let mut other = same.clone();
    other[50] = b'z';

    let fs = MemFs::new();
    fs.add("/a", 1, &same).add("/b", 1, &same).add("/c", 1, &other);
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert_eq!(pairs(&report), vec![pair("/a", "/b")]);
    assert_eq!(report.stats.identical, 1);
    assert_eq!(report.stats.different, 1);
    assert_eq!(fs.ino("/b"), fs.ino("/a"));
    assert_ne!(fs.ino("/c"), fs.ino("/a"));
    assert_eq!(fs.content("/c"), Some(other));
}

#[test]
fn test_identical_files_on_two_devices() {
    let data = vec![0x42u8; 500];
    let fs = MemFs::new();
    fs.add("/mnt/one/x", 1, &data).add("/mnt/two/y", 2, &data);
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert!(report.linked.is_empty());
    assert!(!report.has_errors());
    assert!(!engine.filesystem().mutated());
}

#[test]
fn test_repeated_path_without_identity_is_never_removed() {
    let fs = MemFs::new();
    fs.add("/only", 1, b"collected twice!").without_identity();
    let mut entries: EntrySet = vec![Entry::new("/only", 16), Entry::new("/only", 16)].into();

    let engine = engine(fs);
    let report = engine.run(&mut entries);
    let fs = engine.filesystem();

    assert!(report.linked.is_empty());
    assert!(!report.has_errors());
    assert_eq!(report.stats.skipped_same_file, 1);
    assert!(fs.exists("/only"));
    assert!(!fs.mutated());
}

#[test]
fn test_distinct_paths_without_identity_still_link() {
    let fs = MemFs::new();
    fs.add("/a", 1, b"shared content!!")
        .add("/b", 1, b"shared content!!")
        .without_identity();
    let mut entries = fs.entries();

    let engine = engine(fs);
    let report = engine.run(&mut entries);

    assert_eq!(pairs(&report), vec![pair("/a", "/b")]);
    assert_eq!(engine.filesystem().ino("/b"), engine.filesystem().ino("/a"));
}
