use image_scraper::config::{DownloaderConfig, HttpConfig};
use image_scraper::Downloader;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_downloader(dir: &Path, concurrency: usize, queue_capacity: usize) -> Downloader {
    let config = DownloaderConfig {
        concurrency,
        queue_capacity,
        dest_dir: Some(dir.to_path_buf()),
    };
    Downloader::new(&config, &HttpConfig::default()).expect("Failed to create downloader")
}

async fn mount_file(server: &MockServer, file_path: &str, body: &[u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_file_named_after_last_path_segment() {
    let server = MockServer::start().await;
    mount_file(&server, "/a/b/photo.jpg", b"photo bytes", 1).await;
    let dir = TempDir::new().unwrap();

    let downloader = create_test_downloader(dir.path(), 2, 4);
    downloader
        .queue(&format!("{}/a/b/photo.jpg", server.uri()))
        .await
        .unwrap();
    let stats = downloader.stop().await;

    assert_eq!(stats.downloaded, 1);
    assert_eq!(
        std::fs::read(dir.path().join("photo.jpg")).unwrap(),
        b"photo bytes".to_vec()
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queueing_same_url_twice_writes_once() {
    let server = MockServer::start().await;
    mount_file(&server, "/img/logo.png", b"logo", 1).await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/img/logo.png", server.uri());

    let downloader = create_test_downloader(dir.path(), 4, 4);
    downloader.queue(&url).await.unwrap();
    downloader.queue(&url).await.unwrap();
    let stats = downloader.stop().await;

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(std::fs::read(dir.path().join("logo.png")).unwrap(), b"logo".to_vec());
}

#[tokio::test]
async fn test_same_name_from_different_urls_keeps_first() {
    let server = MockServer::start().await;
    mount_file(&server, "/first/icon.gif", b"first", 1).await;
    mount_file(&server, "/second/icon.gif", b"second", 0).await;
    let dir = TempDir::new().unwrap();

    // One worker so the first URL is written before the second is looked at
    let downloader = create_test_downloader(dir.path(), 1, 4);
    downloader
        .queue(&format!("{}/first/icon.gif", server.uri()))
        .await
        .unwrap();
    downloader
        .queue(&format!("{}/second/icon.gif", server.uri()))
        .await
        .unwrap();
    let stats = downloader.stop().await;

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(std::fs::read(dir.path().join("icon.gif")).unwrap(), b"first".to_vec());
}

#[tokio::test]
async fn test_failures_do_not_abort_batch() {
    let server = MockServer::start().await;
    mount_file(&server, "/good.png", b"good", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let downloader = create_test_downloader(dir.path(), 2, 4);
    downloader
        .queue(&format!("{}/missing.png", server.uri()))
        .await
        .unwrap();
    downloader.queue(&format!("{}/", server.uri())).await.unwrap();
    downloader
        .queue(&format!("{}/good.png", server.uri()))
        .await
        .unwrap();
    let stats = downloader.stop().await;

    assert_eq!(stats.failed, 2);
    assert_eq!(stats.downloaded, 1);
    assert!(dir.path().join("good.png").exists());
    assert!(!dir.path().join("missing.png").exists());
}

#[tokio::test]
async fn test_small_queue_still_downloads_everything() {
    let server = MockServer::start().await;
    for i in 0..20 {
        mount_file(&server, &format!("/f{}.bin", i), format!("file {}", i).as_bytes(), 1).await;
    }
    let dir = TempDir::new().unwrap();

    let downloader = create_test_downloader(dir.path(), 1, 1);
    for i in 0..20 {
        downloader
            .queue(&format!("{}/f{}.bin", server.uri(), i))
            .await
            .unwrap();
    }
    let stats = downloader.stop().await;

    assert_eq!(stats.downloaded, 20);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 20);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f7.bin")).unwrap(),
        "file 7"
    );
}
