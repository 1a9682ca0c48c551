//! Concurrent writers on a single page never share or skip a version.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use wk_core::{AuthorRef, Wiki, WikiConfig};
use wk_store::{FsStorage, MemoryStorage, Storage};

const WRITERS: usize = 8;
const SAVES_PER_WRITER: usize = 10;

fn contended_wiki(storage: Arc<dyn Storage>) -> Wiki {
    let config = WikiConfig {
        // Large enough that no writer gives up under test contention.
        max_append_attempts: 10_000,
        ..WikiConfig::default()
    };
    Wiki::new(storage, config)
}

fn run_writers(wiki: &Wiki) {
    thread::scope(|scope| {
        for writer in 0..WRITERS {
            scope.spawn(move || {
                let author = AuthorRef::new(
                    format!("w{writer}"),
                    format!("Writer {writer}"),
                    format!("w{writer}@example.com"),
                );
                for save in 0..SAVES_PER_WRITER {
                    wiki.save_page("Busy", &format!("{writer}:{save}"), &author)
                        .unwrap();
                }
            });
        }
    });
}

fn assert_dense_history(wiki: &Wiki) {
    let revisions: Vec<_> = wiki
        .page_history("Busy")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let total = (WRITERS * SAVES_PER_WRITER) as u64;

    let versions: Vec<u64> = revisions.iter().map(|r| r.version).collect();
    assert_eq!(versions, (1..=total).rev().collect::<Vec<_>>());

    // Every save landed exactly once.
    let bodies: BTreeSet<&str> = revisions.iter().map(|r| r.body.as_str()).collect();
    assert_eq!(bodies.len(), WRITERS * SAVES_PER_WRITER);

    // Each writer's own saves appear in the order it made them.
    for writer in 0..WRITERS {
        let prefix = format!("{writer}:");
        let own: Vec<&str> = revisions
            .iter()
            .rev()
            .filter_map(|r| r.body.strip_prefix(prefix.as_str()))
            .collect();
        let expected: Vec<String> = (0..SAVES_PER_WRITER).map(|s| s.to_string()).collect();
        assert_eq!(own, expected);
    }
}

#[test]
fn test_concurrent_saves_memory() {
    let wiki = contended_wiki(Arc::new(MemoryStorage::new()));
    run_writers(&wiki);
    assert_dense_history(&wiki);
}

#[test]
fn test_concurrent_saves_fs() {
    let dir = tempfile::tempdir().unwrap();
    let wiki = contended_wiki(Arc::new(FsStorage::new(dir.path().to_path_buf())));
    run_writers(&wiki);
    assert_dense_history(&wiki);
}

#[test]
fn test_concurrent_first_saves_create_one_page() {
    let storage = Arc::new(MemoryStorage::new());
    let wiki = contended_wiki(Arc::clone(&storage) as Arc<dyn Storage>);

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let wiki = &wiki;
            scope.spawn(move || {
                let author = AuthorRef::new(format!("w{writer}"), "Writer", "w@example.com");
                wiki.save_page("Fresh", "first", &author).unwrap();
            });
        }
    });

    assert_eq!(storage.pages().unwrap().len(), 1);
    assert_eq!(wiki.page_history("Fresh").unwrap().count(), WRITERS);
}

#[test]
fn test_concurrent_first_saves_fs() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FsStorage::new(dir.path().to_path_buf()));
    let wiki = contended_wiki(Arc::clone(&storage) as Arc<dyn Storage>);

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let wiki = &wiki;
            scope.spawn(move || {
                let author = AuthorRef::new(format!("w{writer}"), "Writer", "w@example.com");
                wiki.save_page("Fresh", "first", &author).unwrap();
            });
        }
    });

    assert_eq!(storage.pages().unwrap().len(), 1);
    assert_eq!(wiki.page_history("Fresh").unwrap().count(), WRITERS);
}
