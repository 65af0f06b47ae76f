//! Tests against a real tls-client library.
//!
//! Set `TLS_CLIENT_LIBRARY_DIR` to a directory holding a `tls-client*`
//! library and run with `--ignored`.

use std::time::Duration;

use tls_bridge::{Client, ClientProfile, Error, NativeEngine};

fn library_dir() -> String {
    std::env::var("TLS_CLIENT_LIBRARY_DIR").unwrap_or_else(|_| ".".to_string())
}

#[test]
fn test_missing_library_fails_at_build() {
    let err = Client::builder()
        .library_path("/definitely/not/here/tls-client.so")
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::LibraryNotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_fingerprint_echo_service() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tls_bridge=debug")
        .try_init();

    let client = Client::builder()
        .discover_library(library_dir())
        .expect("library not found")
        .profile(ClientProfile::Chrome133)
        .disable_ipv6(true)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let response = client.get("https://tls.peet.ws/api/all").send().await.unwrap();
    println!("status {} via {:?}", response.status, response.used_protocol);

    assert_eq!(response.status, 200);
    assert!(response.body.as_json().is_some(), "expected JSON body, got {:?}", response.body);

    assert!(client.destroy_session().await.unwrap());
}

#[test]
#[ignore]
fn test_discover_binds_all_entry_points() {
    let engine = NativeEngine::discover(library_dir()).unwrap();
    println!("loaded {}", engine.path().display());
}
