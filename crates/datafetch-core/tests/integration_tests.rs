//! Integration tests for datafetch-core.
//!
//! These tests drive the public API end to end: a loopback HTTP server,
//! the blocking fetcher, the streaming extractor and a real filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use datafetch_core::FetchConfig;
use datafetch_core::FetchError;
use datafetch_core::NoopProgress;
use datafetch_core::catalog::DatasetCatalog;
use datafetch_core::extraction::ArchiveStreamExtractor;
use datafetch_core::fetch::HttpFetcher;
use datafetch_core::install::Installer;
use datafetch_core::io::CancelToken;
use datafetch_core::source::SourceFetcher;
use datafetch_core::source::SourceOutcome;
use datafetch_core::test_utils::FakeFetcher;
use datafetch_core::test_utils::RecordingVcs;
use datafetch_core::test_utils::TarGzBuilder;
use datafetch_core::test_utils::serve_once;
use datafetch_core::test_utils::serve_stalled;
use datafetch_core::types::DestDir;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn http() -> HttpFetcher {
    HttpFetcher::new(&FetchConfig::default().with_connect_timeout(Duration::from_secs(5))).unwrap()
}

fn dataset_archive(name: &str) -> Vec<u8> {
    TarGzBuilder::new()
        .add_directory(&format!("{name}/"))
        .add_file(&format!("{name}/a.txt"), b"first file")
        .add_file(&format!("{name}/sub/b.txt"), b"second file")
        .build()
}

#[test]
fn test_install_over_http_round_trip() {
    let url = serve_once(200, dataset_archive("test_data_fusion"));
    let catalog = DatasetCatalog::new([("test_data_fusion", url)]);
    let temp = TempDir::new().unwrap();

    let outcome = Installer::new(&catalog, http())
        .install("test_data_fusion", temp.path(), &mut NoopProgress)
        .unwrap();

    assert!(!outcome.already_present());
    let report = outcome.report().unwrap();
    assert_eq!(report.files_extracted, 2);
    assert_eq!(report.directories_created, 1);
    assert!(report.warnings.is_empty());

    let installed = outcome.final_path();
    assert_eq!(fs::read(installed.join("a.txt")).unwrap(), b"first file");
    assert_eq!(fs::read(installed.join("sub/b.txt")).unwrap(), b"second file");
}

#[test]
fn test_second_install_makes_no_request() {
    let url = serve_once(200, dataset_archive("test_data_viirs"));
    let catalog = DatasetCatalog::new([("test_data_viirs", url)]);
    let temp = TempDir::new().unwrap();
    let installer = Installer::new(&catalog, http());

    installer
        .install("test_data_viirs", temp.path(), &mut NoopProgress)
        .unwrap();

    // The server has exited; a second request would fail.
    let again = installer
        .install("test_data_viirs", temp.path(), &mut NoopProgress)
        .unwrap();
    assert!(again.already_present());
    assert!(again.report().is_none());
}

#[test]
fn test_not_found_extracts_nothing() {
    let url = serve_once(404, b"<html>Not Found</html>".to_vec());
    let catalog = DatasetCatalog::new([("test_data_gpm", url.clone())]);
    let temp = TempDir::new().unwrap();

    let err = Installer::new(&catalog, http())
        .install("test_data_gpm", temp.path(), &mut NoopProgress)
        .unwrap_err();

    match err {
        FetchError::HttpError {
            url: failed,
            status_code,
        } => {
            assert_eq!(failed, url);
            assert_eq!(status_code, 404);
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_traversal_member_aborts_install() {
    let archive = TarGzBuilder::new()
        .add_file("test_data_sar/ok.txt", b"safe")
        .add_raw_name_file("../escape.txt", b"evil")
        .build();
    let url = serve_once(200, archive);
    let catalog = DatasetCatalog::new([("test_data_sar", url)]);
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("root");
    fs::create_dir(&root).unwrap();

    let err = Installer::new(&catalog, http())
        .install("test_data_sar", &root, &mut NoopProgress)
        .unwrap_err();

    assert!(err.is_security_violation());
    assert!(matches!(
        &err,
        FetchError::UnsafeArchiveMember { member_name } if member_name == "../escape.txt"
    ));
    assert_eq!(fs::read(root.join("test_data_sar/ok.txt")).unwrap(), b"safe");
    assert!(!parent.path().join("escape.txt").exists());
}

#[test]
fn test_html_body_is_corrupt_archive() {
    let url = serve_once(200, b"<html>login required</html>".to_vec());
    let catalog = DatasetCatalog::new([("test_data_scat", url.clone())]);
    let temp = TempDir::new().unwrap();

    let err = Installer::new(&catalog, http())
        .install("test_data_scat", temp.path(), &mut NoopProgress)
        .unwrap_err();

    match &err {
        FetchError::CorruptArchive { reason } => assert!(reason.contains(&url), "{reason}"),
        other => panic!("expected CorruptArchive, got {other:?}"),
    }
    assert!(err.to_string().contains(&url));
}

#[test]
fn test_cancel_unblocks_stalled_download() {
    // xorshift noise so the compressed body stays large
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    let noise: Vec<u8> = (0..1024 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[0]
        })
        .collect();
    let archive = TarGzBuilder::new()
        .add_file("test_data_amsr2/noise.bin", &noise)
        .build();
    let sent = archive.len() / 4;
    let url = serve_stalled(archive, sent);

    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let token = CancelToken::new();
    let worker_token = token.clone();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let catalog = DatasetCatalog::new([("test_data_amsr2", url)]);
        let result = Installer::new(&catalog, http())
            .with_cancel_token(worker_token)
            .install("test_data_amsr2", &root, &mut NoopProgress);
        let _ = tx.send(result);
    });

    thread::sleep(Duration::from_millis(500));
    token.cancel();

    let result = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("install still blocked after cancellation");
    let err = result.unwrap_err();
    assert!(matches!(err, FetchError::Cancelled { .. }), "{err:?}");
}

#[test]
fn test_two_file_archive_round_trip() {
    let archive = TarGzBuilder::new()
        .add_file("a.txt", b"alpha")
        .add_file("sub/b.txt", b"beta")
        .build();
    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path()).unwrap();

    let report = ArchiveStreamExtractor::default()
        .extract(archive.as_slice(), &dest, &mut NoopProgress)
        .unwrap();

    assert_eq!(report.extracted_count(), 2);
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(temp.path().join("sub/b.txt")).unwrap(), b"beta");

    let mut files = Vec::new();
    let mut pending = vec![temp.path().to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path.strip_prefix(temp.path()).unwrap().to_path_buf());
            }
        }
    }
    files.sort();
    assert_eq!(files, [Path::new("a.txt"), Path::new("sub/b.txt")]);
}

#[test]
fn test_source_fetcher_dispatch() {
    let vcs = RecordingVcs::succeeding();
    let temp = TempDir::new().unwrap();

    let url = serve_once(200, dataset_archive("pkg"));
    let tgz_url = url.replace("archive.tgz", "pkg.tgz");
    let outcome = SourceFetcher::new(http(), &vcs)
        .fetch_from_source(&tgz_url, &temp.path().join("out"), &mut NoopProgress)
        .unwrap();
    assert!(matches!(outcome, SourceOutcome::Extracted { .. }));
    assert!(temp.path().join("out/pkg/sub/b.txt").is_file());

    let outcome = SourceFetcher::new(FakeFetcher::ok(Vec::new()), &vcs)
        .fetch_from_source(
            "https://example.com/plugin.git",
            &temp.path().join("plugin"),
            &mut NoopProgress,
        )
        .unwrap();
    assert!(matches!(outcome, SourceOutcome::Cloned { .. }));
    assert_eq!(vcs.clones().len(), 1);

    let err = SourceFetcher::new(FakeFetcher::ok(Vec::new()), &vcs)
        .fetch_from_source(
            "https://example.com/plugin.zip",
            &temp.path().join("zip"),
            &mut NoopProgress,
        )
        .unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedSourceKind { .. }));
}
