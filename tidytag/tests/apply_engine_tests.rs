//! Apply engine integration tests against real MP3 files and ID3 tags

mod helpers;

use helpers::{capture_logs, music_dir, read_tag, write_mp3, write_tagged_mp3};
use std::fs;
use std::sync::Arc;
use tidytag::models::{FailureKind, FileSet, ProcessedCounter};
use tidytag::rules::{RuleChain, RuleId};
use tidytag::services::{ApplyEngine, ApplyOptions, CollisionPolicy, FileScanner, Id3TagStore};

fn id3_engine(policy: CollisionPolicy) -> (ApplyEngine<Id3TagStore>, ProcessedCounter) {
    let counter = ProcessedCounter::new();
    let engine = ApplyEngine::new(
        Arc::new(Id3TagStore::new()),
        counter.clone(),
        ApplyOptions {
            workers: 4,
            collision_policy: policy,
        },
    )
    .unwrap();
    (engine, counter)
}

// ============================================================================
// Tag round trip
// ============================================================================

#[test]
fn test_untagged_file_gets_title_and_artist() {
    let (dir, paths) = music_dir(&["DJ Foo - Night Drive.mp3"]);
    let (engine, counter) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), paths);

    let report = engine.process_files(&mut files, &RuleChain::single(RuleId::ExtractArtist));

    let target = dir.path().join("Night Drive.mp3");
    assert_eq!(report.renamed, 1);
    assert_eq!(counter.get(), 1);
    assert_eq!(
        read_tag(&target),
        (Some("Night Drive".to_string()), Some("DJ Foo".to_string()))
    );
}

#[test]
fn test_existing_artist_tag_preserved() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_tagged_mp3(dir.path(), "night_drive.mp3", Some("old"), Some("Tagged Artist"));
    let (engine, _) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), vec![path]);

    engine.process_files(&mut files, &RuleChain::single(RuleId::ReplaceUnderscores));

    assert_eq!(
        read_tag(&dir.path().join("night drive.mp3")),
        (Some("night drive".to_string()), Some("Tagged Artist".to_string()))
    );
}

#[test]
fn test_audio_frames_survive_tag_write() {
    let (dir, paths) = music_dir(&["song_1.mp3"]);
    let before = fs::read(&paths[0]).unwrap();
    let (engine, _) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), paths);

    engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    let after = fs::read(dir.path().join("song_.mp3")).unwrap();
    assert!(after.len() > before.len());
    assert!(after.ends_with(&before));
}

#[test]
fn test_unreadable_file_is_contained() {
    let (dir, mut paths) = music_dir(&["good_1.mp3"]);
    // A directory named like an MP3 cannot be read as one
    let bad = dir.path().join("bad_2.mp3");
    fs::create_dir(&bad).unwrap();
    paths.push(bad.clone());

    let (engine, counter) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), paths);
    let report = engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    assert_eq!(counter.get(), 1);
    assert_eq!(report.renamed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::TagRead);
    assert!(bad.exists());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_n_files_n_saves_n_renames() {
    const N: usize = 64;
    let dir = tempfile::TempDir::new().unwrap();
    for i in 0..N {
        write_mp3(dir.path(), &format!("album_{}/track_{:02}.mp3", i % 4, i));
    }
    let mut files = FileScanner::new().scan_file_set(dir.path()).unwrap();
    assert_eq!(files.len(), N);

    let (engine, counter) = id3_engine(CollisionPolicy::Refuse);
    let chain = RuleChain::new([RuleId::FixCasing, RuleId::ReplaceUnderscores]);
    let report = engine.process_files(&mut files, &chain);

    assert_eq!(counter.get(), N);
    assert_eq!(report.processed, N);
    assert_eq!(report.renamed, N);
    assert!(report.failures.is_empty(), "{:?}", report.failures);

    for path in files.paths() {
        assert!(path.exists());
        let (title, artist) = read_tag(&path);
        assert_eq!(title.as_deref(), path.file_stem().and_then(|s| s.to_str()));
        assert!(title.unwrap().starts_with("Track "));
        assert!(artist.is_none());
    }
}

#[test]
fn test_pass_logs_on_calling_thread() {
    let (dir, paths) = music_dir(&["a_1.mp3", "b_2.mp3"]);
    let (capture, _guard) = capture_logs();
    let (engine, _) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), paths);

    engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    capture.assert_contains("Starting apply pass");
    capture.assert_contains("Apply pass complete");
}

// ============================================================================
// Collisions (regression)
// ============================================================================

/// Last writer wins: one of the two colliding files is gone afterwards.
#[test]
fn test_overwrite_collision_loses_a_file() {
    let (dir, paths) = music_dir(&["Song 1.mp3", "Song 2.mp3"]);
    let (engine, counter) = id3_engine(CollisionPolicy::Overwrite);
    let mut files = FileSet::new(dir.path(), paths);

    let report = engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    assert_eq!(counter.get(), 2);
    assert_eq!(report.renamed, 2);
    assert!(report.failures.is_empty());

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1);
    assert!(dir.path().join("Song .mp3").exists());
}

#[test]
fn test_refuse_collision_keeps_both_files() {
    let (dir, paths) = music_dir(&["Song 1.mp3", "Song 2.mp3"]);
    let (engine, counter) = id3_engine(CollisionPolicy::Refuse);
    let mut files = FileSet::new(dir.path(), paths);

    let report = engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    assert_eq!(counter.get(), 2);
    assert_eq!(report.renamed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::RenameCollision);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);

    // Loser kept its name but its tag was still written
    let loser = files
        .paths()
        .into_iter()
        .find(|p| p != &dir.path().join("Song .mp3"))
        .unwrap();
    assert_eq!(read_tag(&loser).0.as_deref(), Some("Song "));
}

/// A folder linked into the music root must not make one file two units
#[cfg(unix)]
#[test]
fn test_symlinked_folder_processed_once() {
    let (dir, paths) = music_dir(&["real/song_1.mp3"]);
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let mut files = FileScanner::new().scan_file_set(dir.path()).unwrap();
    assert_eq!(files.paths(), paths);

    let (engine, counter) = id3_engine(CollisionPolicy::Refuse);
    let report = engine.process_files(&mut files, &RuleChain::single(RuleId::RemoveNumbers));

    assert_eq!(counter.get(), 1);
    assert_eq!(report.renamed, 1);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(
        read_tag(&dir.path().join("real/song_.mp3")).0.as_deref(),
        Some("song_")
    );
}
