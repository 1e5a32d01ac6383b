// Mock Messages API endpoints for tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// SSE body for a response whose text arrives as the given deltas.
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    body.push_str("event: message_start\r\n");
    body.push_str("data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"type\":\"message\",\"role\":\"assistant\",\"content\":[],\"model\":\"test\",\"usage\":{\"input_tokens\":15}}}\r\n\r\n");
    body.push_str("event: content_block_start\r\n");
    body.push_str("data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\r\n\r\n");
    for delta in deltas {
        let data = serde_json::json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": { "type": "text_delta", "text": delta }
        });
        body.push_str("event: content_block_delta\r\n");
        body.push_str(&format!("data: {data}\r\n\r\n"));
    }
    body.push_str("event: message_delta\r\n");
    body.push_str("data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":7}}\r\n\r\n");
    body.push_str("event: message_stop\r\n");
    body.push_str("data: {\"type\":\"message_stop\"}\r\n\r\n");
    body
}

/// SSE body that opens a message and then reports an API error.
pub fn sse_error_body(message: &str) -> String {
    let data = serde_json::json!({
        "type": "error",
        "error": { "type": "overloaded_error", "message": message }
    });
    format!(
        "event: message_start\r\ndata: {{\"type\":\"message_start\",\"message\":{{\"id\":\"msg_1\"}}}}\r\n\r\nevent: error\r\ndata: {data}\r\n\r\n"
    )
}

/// Serve a single HTTP response on a local port. Returns the URL to post to.
pub async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: String,
) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Read the HTTP request (discard it).
        let mut buf = vec![0u8; 8192];
        let _ = socket.read(&mut buf).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.flush().await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    });

    (format!("http://{addr}"), server)
}

/// Accept a connection and never answer it.
pub async fn serve_silence() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });

    (format!("http://{addr}"), server)
}
