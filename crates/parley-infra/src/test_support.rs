//! Raw-socket helpers for tests that need byte-level control over an HTTP
//! response (chunk timing, abrupt endings).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Read one HTTP/1.1 request, headers plus `Content-Length` body, as text.
pub async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut scratch = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut scratch).await.unwrap();
        assert!(n > 0, "connection closed before request headers ended");
        buf.extend_from_slice(&scratch[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut scratch).await.unwrap();
        assert!(n > 0, "connection closed before request body ended");
        buf.extend_from_slice(&scratch[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write the head of a chunked `200 OK` response.
pub async fn write_chunked_head(socket: &mut TcpStream, content_type: &str) {
    let head = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ntransfer-encoding: chunked\r\n\r\n"
    );
    socket.write_all(head.as_bytes()).await.unwrap();
}

/// Write one chunk of a chunked body.
pub async fn write_chunk(socket: &mut TcpStream, data: &str) {
    let framed = format!("{:x}\r\n{data}\r\n", data.len());
    socket.write_all(framed.as_bytes()).await.unwrap();
}

/// Terminate a chunked body.
pub async fn finish_chunks(socket: &mut TcpStream) {
    socket.write_all(b"0\r\n\r\n").await.unwrap();
    socket.flush().await.unwrap();
}
