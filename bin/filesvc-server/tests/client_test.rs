//! The client facade must give the same answers over either transport

mod common;

use common::{EXAMPLE_CONTENT, start};
use filesvc_client::FileClient;
use filesvc_common::{ClientConfig, DEFAULT_FILE_NAME, Error};

const BACKENDS: [&str; 2] = ["rest", "grpc"];

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stat_is_transport_independent() {
    let server = start(64 * 1024).await;

    let mut results = Vec::new();
    for backend in BACKENDS {
        let client = FileClient::new(&server.client_config(backend)).unwrap();
        results.push(client.stat("1234").await.unwrap());
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].name, "example.txt");
    assert_eq!(results[0].size, 12345);
    assert_eq!(results[0].mimetype, "text/plain");
    assert_eq!(results[0].create_datetime, "2023-09-20T12:34:56Z");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fractional_timestamp_is_transport_independent() {
    let server = start(64 * 1024).await;

    let rest = FileClient::new(&server.client_config("rest")).unwrap();
    let grpc = FileClient::new(&server.client_config("grpc")).unwrap();
    let from_rest = rest.stat("big").await.unwrap();
    let from_grpc = grpc.stat("big").await.unwrap();
    assert_eq!(from_rest.create_datetime, "2023-09-20T12:34:56.500Z");
    assert_eq!(from_rest, from_grpc);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_read_is_transport_independent() {
    let server = start(64 * 1024).await;

    for backend in BACKENDS {
        let client = FileClient::new(&server.client_config(backend)).unwrap();
        let content = client.read("1234").await.unwrap();
        assert_eq!(content.name, "example.txt", "{backend}");
        assert_eq!(content.data.as_ref(), EXAMPLE_CONTENT, "{backend}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_grpc_read_concatenates_all_chunks() {
    let server = start(3).await;

    let client = FileClient::new(&server.client_config("grpc")).unwrap();
    let content = client.read("big").await.unwrap();
    assert_eq!(content.data.as_ref(), b"0123456789");

    let rest = FileClient::new(&server.client_config("rest")).unwrap();
    assert_eq!(rest.read("big").await.unwrap(), content);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_not_found_on_both_transports() {
    let server = start(64 * 1024).await;

    for backend in BACKENDS {
        let client = FileClient::new(&server.client_config(backend)).unwrap();
        let err = client.stat("missing").await.unwrap_err();
        assert!(err.is_not_found(), "{backend}: {err:?}");
        let err = client.read("missing").await.unwrap_err();
        assert!(err.is_not_found(), "{backend}: {err:?}");
        let err = client.read("gone").await.unwrap_err();
        assert!(err.is_not_found(), "{backend}: {err:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bad_timestamp_on_both_transports() {
    let server = start(64 * 1024).await;

    for backend in BACKENDS {
        let client = FileClient::new(&server.client_config(backend)).unwrap();
        let err = client.stat("bad-date").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{backend}: {err:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_content() {
    let server = start(64 * 1024).await;

    for backend in BACKENDS {
        let client = FileClient::new(&server.client_config(backend)).unwrap();
        let content = client.read("empty").await.unwrap();
        assert_eq!(content.name, "empty.txt");
        assert!(content.data.is_empty(), "{backend}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_server() {
    let config = ClientConfig {
        backend: "rest".to_string(),
        base_url: "http://127.0.0.1:1".to_string(),
        grpc_server: "127.0.0.1:1".to_string(),
        timeout: Some(std::time::Duration::from_secs(5)),
    };
    let err = FileClient::new(&config).unwrap().stat("1234").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionFailed(_)), "{err:?}");

    let grpc = FileClient::new(&ClientConfig {
        backend: "grpc".to_string(),
        ..config
    })
    .unwrap();
    assert!(!grpc.stat("1234").await.unwrap_err().is_not_found());
}

#[test]
fn test_unknown_backend() {
    assert!(matches!(
        FileClient::new(&ClientConfig::with_backend("ftp")),
        Err(Error::Configuration(_))
    ));
    assert_eq!(DEFAULT_FILE_NAME, "file");
}
