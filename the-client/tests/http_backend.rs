use std::time::Duration;

use the_directory_client::{
  BODY_SNIPPET_CHARS,
  HttpSearchBackend,
};
use the_directory_search::{
  EntityKind,
  SearchBackend,
  SearchError,
};
use tokio::{
  io::{
    AsyncReadExt,
    AsyncWriteExt,
  },
  net::TcpListener,
  sync::oneshot,
};

/// Serve exactly one request on a loopback port. The request head is sent
/// back through the returned receiver.
async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let (head_tx, head_rx) = oneshot::channel();

  tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
      let read = socket.read(&mut buf).await.unwrap();
      if read == 0 {
        break;
      }
      request.extend_from_slice(&buf[..read]);
    }
    let _ = head_tx.send(String::from_utf8_lossy(&request).into_owned());

    let response = format!(
      "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: \
       close\r\n\r\n{body}",
      body.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.ok();
  });

  (format!("http://{addr}/api/search"), head_rx)
}

#[tokio::test]
async fn decodes_successful_response() {
  let body = r#"{ "results": [
    { "id": 42, "type": "squad", "name": "Payments", "parentName": "Checkout", "url": "/squads/42" },
    { "id": "p-1", "type": "tribe", "name": "Commerce", "url": "/clusters/p-1" }
  ] }"#;
  let (url, head) = serve_once("200 OK", body.to_string()).await;
  let backend = HttpSearchBackend::new(&url, Duration::from_secs(5)).unwrap();

  let rows = backend.search("pay ments").await.unwrap();

  let request = head.await.unwrap();
  assert!(
    request.starts_with("GET /api/search?q=pay+ments HTTP/1.1"),
    "{request}"
  );
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].id, "42");
  assert_eq!(rows[0].parent_name.as_deref(), Some("Checkout"));
  assert_eq!(rows[1].kind, EntityKind::Cluster);
}

#[tokio::test]
async fn error_status_carries_truncated_body() {
  let body = "x".repeat(BODY_SNIPPET_CHARS * 2);
  let (url, _head) = serve_once("503 Service Unavailable", body).await;
  let backend = HttpSearchBackend::new(&url, Duration::from_secs(5)).unwrap();

  match backend.search("payments").await {
    Err(SearchError::Status { status, body }) => {
      assert_eq!(status, 503);
      assert_eq!(body.len(), BODY_SNIPPET_CHARS);
    },
    other => panic!("expected a status error, got {other:?}"),
  }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
  let (url, _head) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
  let backend = HttpSearchBackend::new(&url, Duration::from_secs(5)).unwrap();

  assert!(matches!(
    backend.search("payments").await,
    Err(SearchError::Decode(_))
  ));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  let backend =
    HttpSearchBackend::new(&format!("http://{addr}/search"), Duration::from_secs(5)).unwrap();

  assert!(matches!(
    backend.search("payments").await,
    Err(SearchError::Transport(_))
  ));
}

#[tokio::test]
async fn slow_service_times_out() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let server = tokio::spawn(async move {
    let (socket, _) = listener.accept().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    drop(socket);
  });
  let backend =
    HttpSearchBackend::new(&format!("http://{addr}/search"), Duration::from_millis(100)).unwrap();

  assert!(matches!(
    backend.search("payments").await,
    Err(SearchError::Transport(_))
  ));
  server.abort();
}
