use std::fs;
use std::path::Path;

use linkdupe::dedup::{DedupConfig, DedupEngine, DedupReport, EntrySet};
use linkdupe::scanner::{Collector, CollectorConfig};
use tempfile::{tempdir, TempDir};

fn collect(dir: &Path, min_size: u64) -> EntrySet {
    let collector = Collector::new(
        vec![dir.display().to_string()],
        CollectorConfig::default().with_min_size(min_size),
    );
    collector.collect().filter_map(Result::ok).collect()
}

fn run(dir: &TempDir, config: DedupConfig, min_size: u64) -> DedupReport {
    let mut entries = collect(dir.path(), min_size);
    DedupEngine::new(config).run(&mut entries)
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let (ma, mb) = (fs::metadata(a).unwrap(), fs::metadata(b).unwrap());
    ma.dev() == mb.dev() && ma.ino() == mb.ino()
}

#[test]
fn test_duplicates_become_hard_links() {
    let dir = tempdir().unwrap();
    let content = b"a file large enough to be considered";
    fs::write(dir.path().join("a"), content).unwrap();
    fs::write(dir.path().join("b"), content).unwrap();
    fs::write(dir.path().join("c"), content).unwrap();

    let report = run(&dir, DedupConfig::default(), 16);

    assert_eq!(report.linked.len(), 2);
    assert!(!report.has_errors());
    for pair in &report.linked {
        assert_eq!(pair.keep, dir.path().join("a"));
    }
    #[cfg(unix)]
    {
        assert!(same_inode(&dir.path().join("a"), &dir.path().join("b")));
        assert!(same_inode(&dir.path().join("a"), &dir.path().join("c")));
    }
    for name in ["a", "b", "c"] {
        assert_eq!(fs::read(dir.path().join(name)).unwrap(), content);
    }
}

#[test]
fn test_small_files_below_min_size_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"tiny").unwrap();
    fs::write(dir.path().join("b"), b"tiny").unwrap();

    let report = run(&dir, DedupConfig::default(), 16);

    assert_eq!(report.stats.entries, 0);
    assert!(report.linked.is_empty());
}

#[cfg(unix)]
#[test]
fn test_second_run_is_a_no_op() {
    let dir = tempdir().unwrap();
    let content = vec![7u8; 4096];
    for name in ["one", "two", "three"] {
        fs::write(dir.path().join(name), &content).unwrap();
    }

    let first = run(&dir, DedupConfig::default(), 16);
    assert_eq!(first.linked.len(), 2);

    let second = run(&dir, DedupConfig::default(), 16);
    assert!(second.linked.is_empty());
    assert!(!second.has_errors());
    assert_eq!(second.stats.comparisons, 0);
    assert_eq!(second.stats.skipped_same_file, 3);
}

#[test]
fn test_content_fidelity_across_block_boundaries() {
    let block = 64usize;
    for size in [0, 1, block - 1, block, block + 1, 3 * block, 3 * block + 5] {
        let dir = tempdir().unwrap();
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(dir.path().join("a_orig"), &content).unwrap();
        fs::write(dir.path().join("b_copy"), &content).unwrap();

        let mut tail_differs = content.clone();
        if let Some(last) = tail_differs.last_mut() {
            *last ^= 0xff;
            fs::write(dir.path().join("c_tail"), &tail_differs).unwrap();
        }

        let report = run(&dir, DedupConfig::default().with_block_size(block), 0);

        assert_eq!(report.linked.len(), 1, "size {size}");
        assert_eq!(report.linked[0].removed, dir.path().join("b_copy"));
        assert_eq!(fs::read(dir.path().join("b_copy")).unwrap(), content);
        if size > 0 {
            assert_eq!(
                fs::read(dir.path().join("c_tail")).unwrap(),
                tail_differs,
                "size {size}"
            );
        }
    }
}

#[test]
fn test_only_identical_members_of_a_size_group_are_linked() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"AAAAAAAAAAAAAAAAAAAA").unwrap();
    fs::write(dir.path().join("b"), b"BBBBBBBBBBBBBBBBBBBB").unwrap();
    fs::write(dir.path().join("c"), b"AAAAAAAAAAAAAAAAAAAA").unwrap();
    fs::write(dir.path().join("d"), b"BBBBBBBBBBBBBBBBBBBB").unwrap();

    let report = run(&dir, DedupConfig::default(), 16);

    let got: Vec<(String, String)> = report
        .linked
        .iter()
        .map(|p| {
            (
                p.keep.file_name().unwrap().to_string_lossy().into_owned(),
                p.removed.file_name().unwrap().to_string_lossy().into_owned(),
            )
        })
        .collect();
    assert_eq!(
        got,
        vec![
            ("a".to_string(), "c".to_string()),
            ("b".to_string(), "d".to_string())
        ]
    );
    assert_eq!(report.stats.comparisons, 4);
}

#[test]
fn test_nested_directories_are_deduplicated_across() {
    let dir = tempdir().unwrap();
    let content = b"shared between two directories";
    fs::create_dir_all(dir.path().join("left/deep")).unwrap();
    fs::create_dir_all(dir.path().join("right")).unwrap();
    fs::write(dir.path().join("left/deep/file"), content).unwrap();
    fs::write(dir.path().join("right/file"), content).unwrap();

    let report = run(&dir, DedupConfig::default(), 16);

    assert_eq!(report.linked.len(), 1);
    assert_eq!(report.linked[0].keep, dir.path().join("left/deep/file"));
    assert_eq!(report.linked[0].removed, dir.path().join("right/file"));
}

#[cfg(unix)]
#[test]
fn test_followed_symlink_anchor_links_to_its_target() {
    let dir = tempdir().unwrap();
    let content = [0x5au8; 64];
    fs::write(dir.path().join("t"), content).unwrap();
    std::os::unix::fs::symlink("t", dir.path().join("l")).unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c"), content).unwrap();

    let collector = Collector::new(
        vec![dir.path().display().to_string()],
        CollectorConfig::default().with_follow_symlinks(true),
    );
    let mut entries: EntrySet = collector.collect().filter_map(Result::ok).collect();
    let report = DedupEngine::new(DedupConfig::default()).run(&mut entries);

    let c = dir.path().join("sub").join("c");
    assert!(!report.has_errors());
    assert_eq!(report.linked.len(), 1);
    assert_eq!(report.linked[0].removed, c);
    assert!(!fs::symlink_metadata(&c).unwrap().file_type().is_symlink());
    assert_eq!(fs::read(&c).unwrap(), content);
    assert!(same_inode(&c, &dir.path().join("t")));
    assert!(fs::symlink_metadata(dir.path().join("l"))
        .unwrap()
        .file_type()
        .is_symlink());
}
