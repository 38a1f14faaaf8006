//! Integration tests for the watch and timer triggers

mod test_helpers;

use coda_scanner::ScanOptions;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{build_scanner, library_config, setup_pool, write_track};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_watch_cancellation_exits_promptly() {
    let temp = TempDir::new().unwrap();
    let music = temp.path().join("music");
    fs::create_dir(&music).unwrap();

    let pool = setup_pool(temp.path()).await;
    let scanner = Arc::new(build_scanner(&pool, &library_config(&[&music])));

    let cancel = CancellationToken::new();
    let handle = {
        let scanner = scanner.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { scanner.execute_watch(cancel).await })
    };

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("watch loop should exit after cancellation")
        .expect("watch task should not panic");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_watch_event_triggers_scan() {
    let temp = TempDir::new().unwrap();
    let music = temp.path().join("music");
    fs::create_dir(&music).unwrap();

    let pool = setup_pool(temp.path()).await;
    let scanner = Arc::new(build_scanner(&pool, &library_config(&[&music])));

    let cancel = CancellationToken::new();
    let handle = {
        let scanner = scanner.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { scanner.execute_watch(cancel).await })
    };

    // Give the watcher a moment to register, then drop a track in
    tokio::time::sleep(Duration::from_millis(250)).await;
    write_track(&music, "band/record/one.flac", "title=One\nartist=Band\n");

    let mut cataloged = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let mut conn = pool.acquire().await.unwrap();
        if coda_storage::tracks::count(&mut conn).await.unwrap() == 1 {
            cataloged = true;
            break;
        }
    }

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(cataloged, "watch-triggered scan should catalog the new track");
}

#[tokio::test]
async fn test_concurrent_trigger_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let music = temp.path().join("music");
    fs::create_dir(&music).unwrap();
    write_track(&music, "band/one.flac", "title=One\nartist=Band\n");

    let pool = setup_pool(temp.path()).await;
    let scanner = Arc::new(build_scanner(&pool, &library_config(&[&music])));

    // Both triggers race for the single-flight flag; at most one runs,
    // the loser reports the conflict rather than queueing
    let first = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.scan_and_clean(ScanOptions::default()).await })
    };
    let second = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.scan_and_clean(ScanOptions::default()).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let completed = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(coda_scanner::ScanError::AlreadyScanning)))
        .count();
    assert!(completed >= 1);
    assert_eq!(completed + conflicts, 2);

    // The flag is released, so a later scan runs again
    assert!(!scanner.is_scanning());
    scanner
        .scan_and_clean(ScanOptions::default())
        .await
        .expect("flag released after previous runs");
}
