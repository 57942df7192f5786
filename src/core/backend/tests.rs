use super::*;
use crate::api::ChatRequest;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

async fn read_http_request(
    stream: &mut tokio::net::TcpStream,
) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length.saturating_sub(body.len())];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}

/// Serve exactly one request with a canned response and hand back what the
/// client sent.
async fn serve_once(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<Result<CapturedRequest, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let server_task = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let captured = read_http_request(&mut stream).await?;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        Ok(captured)
    });

    (format!("http://{addr}/"), server_task)
}

fn backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(base_url, Duration::from_secs(5)).expect("client should build")
}

#[tokio::test]
async fn converse_posts_json_to_chat_endpoint() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"response":"Water when top soil is dry.","type":"success"}"#,
    )
    .await;

    let request = ChatRequest {
        message: "How often should I water a monstera?".to_string(),
        session_id: Some("abc123".to_string()),
    };
    let reply = backend(&base_url)
        .converse(&request)
        .await
        .expect("converse should succeed");

    assert_eq!(
        reply,
        ChatResponse::Reply {
            response: "Water when top soil is dry.".to_string(),
            tone: Some("success".to_string()),
        }
    );

    let captured = server.await.expect("server task").expect("server io");
    assert_eq!(captured.request_line, "POST /chat HTTP/1.1");
    assert!(captured
        .header("content-type")
        .is_some_and(|value| value.starts_with("application/json")));
    let sent: serde_json::Value =
        serde_json::from_slice(&captured.body).expect("body should be json");
    assert_eq!(sent["message"], "How often should I water a monstera?");
    assert_eq!(sent["session_id"], "abc123");
}

#[tokio::test]
async fn converse_reads_error_payload_from_failed_status() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        "application/json",
        r#"{"error":"An error occurred while processing your message. Please try again."}"#,
    )
    .await;

    let request = ChatRequest {
        message: "hello".to_string(),
        session_id: None,
    };
    let reply = backend(&base_url)
        .converse(&request)
        .await
        .expect("error payload is still a readable answer");
    assert!(matches!(reply, ChatResponse::Failure { .. }));
    server.await.expect("server task").expect("server io");
}

#[tokio::test]
async fn non_json_failure_becomes_status_error() {
    let (base_url, server) =
        serve_once("502 Bad Gateway", "text/html", "<h1>Bad Gateway</h1>").await;

    let request = ChatRequest {
        message: "hello".to_string(),
        session_id: None,
    };
    let err = backend(&base_url)
        .converse(&request)
        .await
        .expect_err("html body should not parse");
    assert_eq!(
        err,
        BackendError::Status {
            status: 502,
            body: "<h1>Bad Gateway</h1>".to_string()
        }
    );
    server.await.expect("server task").expect("server io");
}

#[tokio::test]
async fn unexpected_success_body_is_a_decode_error() {
    let (base_url, server) = serve_once("200 OK", "application/json", r#"{"ok":true}"#).await;

    let request = ChatRequest {
        message: "hello".to_string(),
        session_id: None,
    };
    let err = backend(&base_url)
        .converse(&request)
        .await
        .expect_err("shape mismatch should fail");
    assert!(matches!(err, BackendError::Decode(_)));
    server.await.expect("server task").expect("server io");
}

#[tokio::test]
async fn identify_uploads_multipart_image_field() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"plant_name":"Spider Plant","scientific_name":"Chlorophytum comosum","confidence":72}"#,
    )
    .await;

    let image = ImageUpload::new("spider.png", "image/png", b"PNGDATA".to_vec());
    let reply = backend(&base_url)
        .identify(&image)
        .await
        .expect("identify should succeed");
    match reply {
        IdentifyResponse::Identified(identification) => {
            assert_eq!(identification.plant_name, "Spider Plant");
            assert_eq!(identification.confidence, Some(72.0));
        }
        other => panic!("expected identification, got {other:?}"),
    }

    let captured = server.await.expect("server task").expect("server io");
    assert_eq!(captured.request_line, "POST /predict HTTP/1.1");
    assert!(captured
        .header("content-type")
        .is_some_and(|value| value.starts_with("multipart/form-data")));
    let body = String::from_utf8_lossy(&captured.body);
    assert!(body.contains(r#"name="image"; filename="spider.png""#));
    assert!(body.contains("Content-Type: image/png"));
    assert!(body.contains("PNGDATA"));
}

#[tokio::test]
async fn health_reads_status() {
    let (base_url, server) = serve_once(
        "200 OK",
        "application/json",
        r#"{"status":"healthy","timestamp":"2025-01-01T00:00:00"}"#,
    )
    .await;

    let health = backend(&base_url).health().await.expect("health should succeed");
    assert_eq!(health.status, "healthy");
    let captured = server.await.expect("server task").expect("server io");
    assert_eq!(captured.request_line, "GET /health HTTP/1.1");
}

#[tokio::test]
async fn health_accepts_plain_text_ok() {
    let (base_url, server) = serve_once("200 OK", "text/html; charset=utf-8", "OK").await;

    let health = backend(&base_url)
        .health()
        .await
        .expect("plain OK should count as healthy");
    assert_eq!(health.status, "OK");
    assert_eq!(health.timestamp, None);
    server.await.expect("server task").expect("server io");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    drop(listener);

    let request = ChatRequest {
        message: "hello".to_string(),
        session_id: None,
    };
    let err = backend(&format!("http://{addr}"))
        .converse(&request)
        .await
        .expect_err("nothing is listening");
    assert!(err.is_transport(), "unexpected error: {err:?}");
}
