//! Concurrency tests for the serialization lock.
//!
//! Every checkout-bearing sequence runs inside a session, so instrumented
//! session bodies must never overlap, and threads writing to different
//! stages of one project must never see each other's files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use cfgstore::core::paths::StorePaths;
use cfgstore::core::types::{BranchName, ProjectName, ResourcePath, StageName};
use cfgstore::git::Author;
use cfgstore::store::{ConfigStore, ResourceScope};

fn new_store(dir: &TempDir) -> Arc<ConfigStore> {
    Arc::new(ConfigStore::new(
        StorePaths::new(dir.path().to_path_buf()),
        BranchName::new("master").unwrap(),
        Author::new("Test User", "test@example.com"),
        ResourcePath::new("shipyard.yaml").unwrap(),
    ))
}

#[test]
fn session_intervals_never_overlap() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir);
    let shop = ProjectName::new("shop").unwrap();
    store.create_project(&shop).unwrap();

    let inside = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let store = Arc::clone(&store);
            let shop = shop.clone();
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            thread::spawn(move || {
                for i in 0..4 {
                    let mut session = store.session().unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);

                    let workspace = session.checkout(&shop, &ResourceScope::Project).unwrap();
                    let path = ResourcePath::new(format!("t{}/r{}", t, i)).unwrap();
                    workspace.put(&path, b"x").unwrap();
                    thread::sleep(Duration::from_millis(1));

                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(
        store
            .list_resources(&shop, &ResourceScope::Project)
            .unwrap()
            .len(),
        24
    );
}

#[test]
fn concurrent_writers_to_different_stages_stay_isolated() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir);
    let shop = ProjectName::new("shop").unwrap();
    store.create_project(&shop).unwrap();

    let stages: Vec<StageName> = ["dev", "staging", "production"]
        .iter()
        .map(|s| StageName::new(*s).unwrap())
        .collect();
    for stage in &stages {
        store.create_stage(&shop, stage).unwrap();
    }

    let handles: Vec<_> = stages
        .iter()
        .cloned()
        .map(|stage| {
            let store = Arc::clone(&store);
            let shop = shop.clone();
            thread::spawn(move || {
                let scope = ResourceScope::Stage(stage.clone());
                for i in 0..5 {
                    let path = ResourcePath::new(format!("{}-{}.yaml", stage, i)).unwrap();
                    store
                        .put_resource(&shop, &scope, &path, stage.as_str().as_bytes())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for stage in &stages {
        let scope = ResourceScope::Stage(stage.clone());
        let paths = store.list_resources(&shop, &scope).unwrap();
        assert_eq!(paths.len(), 5, "stage {} has foreign files: {:?}", stage, paths);
        for path in paths {
            assert!(path.as_str().starts_with(stage.as_str()));
            let resource = store.get_resource(&shop, &scope, &path).unwrap();
            assert_eq!(resource.content, stage.as_str().as_bytes());
        }
    }
}

#[test]
fn concurrent_identical_puts_commit_once() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir);
    let shop = ProjectName::new("shop").unwrap();
    store.create_project(&shop).unwrap();
    let path = ResourcePath::new("same.yaml").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let shop = shop.clone();
            let path = path.clone();
            thread::spawn(move || {
                store
                    .put_resource(&shop, &ResourceScope::Project, &path, b"same")
                    .unwrap()
            })
        })
        .collect();

    let versions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(versions.windows(2).all(|w| w[0] == w[1]));

    let history = store
        .resource_history(&shop, &ResourceScope::Project, &path)
        .unwrap();
    assert_eq!(history.len(), 1);
}
