//! End-to-end page operations against both storage backends.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wk_core::{AuthorDirectory, AuthorRef, StaticAuthorDirectory, Wiki, WikiConfig, WikiError};
use wk_store::{FsStorage, MemoryStorage, Storage};

fn a1() -> AuthorRef {
    AuthorRef::new("a1", "Alice", "alice@example.com")
}

fn history_of(wiki: &Wiki, title: &str) -> (Vec<u64>, Vec<String>) {
    wiki.page_history(title)
        .unwrap()
        .map(|revision| {
            let revision = revision.unwrap();
            (revision.version, revision.body)
        })
        .unzip()
}

fn save_scenario(storage: Arc<dyn Storage>) {
    let wiki = Wiki::new(storage, WikiConfig::default());

    wiki.save_page("Test", "Hello WikiWord", &a1()).unwrap();
    wiki.save_page("Test", "v2", &a1()).unwrap();

    let (versions, bodies) = history_of(&wiki, "Test");
    assert_eq!(versions, vec![2, 1]);
    assert_eq!(bodies, vec!["v2", "Hello WikiWord"]);

    let resolved = wiki.resolve_page("Test").unwrap();
    let latest = resolved.latest.unwrap();
    assert_eq!(latest.version, 2);
    assert_eq!(latest.author, a1());
}

#[test]
fn test_save_scenario_memory() {
    save_scenario(Arc::new(MemoryStorage::new()));
}

#[test]
fn test_save_scenario_fs() {
    let dir = tempfile::tempdir().unwrap();
    save_scenario(Arc::new(FsStorage::new(dir.path().to_path_buf())));
}

#[test]
fn test_missing_page_on_empty_store() {
    let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());

    assert!(matches!(
        wiki.resolve_page("Missing"),
        Err(WikiError::NotFound { .. })
    ));
}

#[test]
fn test_sequential_appends_follow_call_order() {
    let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());

    for i in 1..=10 {
        let revision = wiki.save_page("Counter", &format!("body {i}"), &a1()).unwrap();
        assert_eq!(revision.version, i);
    }

    let (versions, _) = history_of(&wiki, "Counter");
    assert_eq!(versions, (1..=10).rev().collect::<Vec<u64>>());
}

#[test]
fn test_rendered_body_of_latest_revision() {
    let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());
    wiki.save_page(
        "StartPage",
        "# Welcome\n\nSee AliceBob and CarolDave here.\n\n<script>alert(1)</script>\n",
        &a1(),
    )
    .unwrap();

    let latest = wiki.resolve_page("StartPage").unwrap().latest.unwrap();
    let body = wiki.rendered_body(&latest);

    assert_eq!(
        body.html,
        concat!(
            r#"<h1 id="welcome">Welcome</h1>"#,
            r#"<p>See <a href="/view/AliceBob">AliceBob</a> and <a href="/view/CarolDave">CarolDave</a> here.</p>"#,
            "&lt;script&gt;alert(1)&lt;/script&gt;\n"
        )
    );
    assert_eq!(body.links, vec!["AliceBob", "CarolDave"]);
    assert_eq!(body.toc[0].title, "Welcome");
}

#[test]
fn test_link_targets_need_not_exist() {
    let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());
    let revision = wiki.save_page("StartPage", "Go to NowhereYet", &a1()).unwrap();

    assert_eq!(wiki.rendered_body(&revision).links, vec!["NowhereYet"]);
    assert!(matches!(
        wiki.resolve_page("NowhereYet"),
        Err(WikiError::NotFound { .. })
    ));
    assert_eq!(wiki.edit_draft("NowhereYet").unwrap(), "");
}

#[test]
fn test_save_with_directory_author() {
    let directory: StaticAuthorDirectory = [a1()].into_iter().collect();
    let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());

    let author = directory.lookup_author("a1").unwrap();
    wiki.save_page("StartPage", "hello", &author).unwrap();

    let titles: Vec<String> = wiki.contributions("a1").unwrap().into_iter().collect();
    assert_eq!(titles, vec!["StartPage"]);
}

#[test]
fn test_fs_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let wiki = Wiki::new(
            Arc::new(FsStorage::new(dir.path().to_path_buf())),
            WikiConfig::default(),
        );
        wiki.save_page("Test", "one", &a1()).unwrap();
        wiki.save_page("Test", "two", &a1()).unwrap();
    }

    let wiki = Wiki::new(
        Arc::new(FsStorage::new(dir.path().to_path_buf())),
        WikiConfig::default(),
    );
    wiki.save_page("Test", "three", &a1()).unwrap();

    let (versions, bodies) = history_of(&wiki, "Test");
    assert_eq!(versions, vec![3, 2, 1]);
    assert_eq!(bodies, vec!["three", "two", "one"]);
}

#[test]
fn test_unstorable_title_is_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let wiki = Wiki::new(
        Arc::new(FsStorage::new(dir.path().to_path_buf())),
        WikiConfig::default(),
    );
    let title = "A".repeat(200);

    assert!(matches!(
        wiki.save_page(&title, "body", &a1()),
        Err(WikiError::MalformedInput(_))
    ));
    assert!(matches!(
        wiki.resolve_page(&title),
        Err(WikiError::MalformedInput(_))
    ));
}
