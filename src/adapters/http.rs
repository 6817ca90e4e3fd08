//! 隨機抽牌端點的精簡 HTTP/1.1 回應器
//!
//! 只解析請求列，標頭讀取後丟棄，每個回應都會關閉連線。
//! 請求標頭在位元組上限與逾時內讀取 ([`RequestLimits`])。

use crate::core::query::DeckQuery;
use crate::utils::error::Result;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Take};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub const EMPTY_DECK_MESSAGE: &str = "The deck is empty or could not be loaded.";
pub const WELCOME_MESSAGE: &str = "Welcome to the Deck of Many Things!";

const MAX_HEADER_LINES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                tracing::error!("❌ Failed to serialize response: {}", e);
                Self::error(500, "Internal server error")
            }
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            414 => "URI Too Long",
            431 => "Request Header Fields Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

/// 把 `GET /draw-card HTTP/1.1` 拆成方法與路徑 (去掉查詢字串)
pub fn parse_request_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/") || parts.next().is_some() {
        return None;
    }
    let path = target.split('?').next().unwrap_or(target);
    Some((method, path))
}

pub fn route(method: &str, path: &str, query: &DeckQuery) -> HttpResponse {
    let known = matches!(path, "/" | "/draw-card" | "/api/draw-card");
    if !known {
        return HttpResponse::error(404, "Not found");
    }
    if method != "GET" {
        return HttpResponse::error(405, "Method not allowed");
    }

    match path {
        "/" => HttpResponse::text(200, WELCOME_MESSAGE),
        _ => match query.draw_random(&mut rand::thread_rng()) {
            Ok(card) => HttpResponse::json(200, &card),
            Err(_) => HttpResponse::error(404, EMPTY_DECK_MESSAGE),
        },
    }
}

/// 單一用戶端能讓連線 task 佔用的上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// 請求列加標頭的位元組上限
    pub max_head_bytes: u64,
    /// 請求列與標頭送達的時限
    pub read_timeout: Duration,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_head_bytes: 8 * 1024,
            read_timeout: Duration::from_secs(10),
        }
    }
}

enum RequestHead {
    Line(String),
    TooLarge(u16),
}

/// 讀取請求列並略過標頭。讀取器的位元組上限限制緩衝大小，
/// 在行中途達到上限代表用戶端送出過多資料。
async fn read_head<R>(reader: &mut Take<R>) -> std::io::Result<RequestHead>
where
    R: AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    if !request_line.ends_with('\n') && reader.limit() == 0 {
        return Ok(RequestHead::TooLarge(414));
    }

    for _ in 0..MAX_HEADER_LINES {
        let mut header = String::new();
        let read = reader.read_line(&mut header).await?;
        if read == 0 {
            // 到達上限或連線關閉
            return Ok(if reader.limit() == 0 {
                RequestHead::TooLarge(431)
            } else {
                RequestHead::Line(request_line)
            });
        }
        if header == "\r\n" || header == "\n" {
            return Ok(RequestHead::Line(request_line));
        }
        if !header.ends_with('\n') && reader.limit() == 0 {
            return Ok(RequestHead::TooLarge(431));
        }
    }
    Ok(RequestHead::TooLarge(431))
}

pub async fn handle_connection(
    mut stream: TcpStream,
    query: DeckQuery,
    limits: RequestLimits,
) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader).take(limits.max_head_bytes);

    let mut rejected = false;
    let response = match timeout(limits.read_timeout, read_head(&mut reader)).await {
        Err(_) => {
            tracing::warn!("⚠️ Client did not send a request within {:?}", limits.read_timeout);
            HttpResponse::error(408, "Request timeout")
        }
        Ok(head) => match head? {
            RequestHead::TooLarge(status) => {
                tracing::warn!(
                    "⚠️ Request head exceeds {} bytes, answering {}",
                    limits.max_head_bytes,
                    status
                );
                rejected = true;
                HttpResponse::error(status, "Request too large")
            }
            RequestHead::Line(request_line) => match parse_request_line(request_line.trim_end()) {
                Some((method, path)) => {
                    let response = route(method, path, &query);
                    tracing::info!("{} {} -> {}", method, path, response.status);
                    response
                }
                None => {
                    tracing::warn!("⚠️ Malformed request line: {:?}", request_line.trim_end());
                    HttpResponse::error(400, "Bad request")
                }
            },
        },
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.shutdown().await?;

    if rejected {
        // 讀完剩餘輸入再關閉連線
        let mut rest = reader.into_inner();
        let _ = timeout(limits.read_timeout, tokio::io::copy(&mut rest, &mut tokio::io::sink())).await;
    }
    Ok(())
}

/// 以預設請求上限接受連線，直到 `shutdown` 完成
pub async fn serve_until<F>(listener: TcpListener, query: DeckQuery, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    serve_with_limits(listener, query, RequestLimits::default(), shutdown).await
}

/// 接受連線直到 `shutdown` 完成。每個連線有自己的 task 與唯讀快照的副本。
pub async fn serve_with_limits<F>(
    listener: TcpListener,
    query: DeckQuery,
    limits: RequestLimits,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("⚠️ Failed to accept connection: {}", e);
                        continue;
                    }
                };
                let query = query.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, query, limits).await {
                        tracing::warn!("⚠️ Connection from {} failed: {}", peer, e);
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("🛑 Shutting down draw server");
                return Ok(());
            }
        }
    }
}

pub async fn serve(listener: TcpListener, query: DeckQuery) -> Result<()> {
    serve_until(listener, query, std::future::pending()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fixtures::deck;
    use crate::domain::model::{Card, Deck};
    use test_case::test_case;

    #[test_case("GET /draw-card HTTP/1.1" => Some(("GET", "/draw-card")) ; "plain get")]
    #[test_case("GET /api/draw-card?x=1 HTTP/1.0" => Some(("GET", "/api/draw-card")) ; "query string dropped")]
    #[test_case("GET /draw-card" => None ; "missing version")]
    #[test_case("garbage" => None ; "garbage")]
    #[test_case("" => None ; "empty line")]
    fn test_parse_request_line(line: &str) -> Option<(&str, &str)> {
        parse_request_line(line)
    }

    #[test_case("GET", "/draw-card" => 200 ; "draw")]
    #[test_case("GET", "/api/draw-card" => 200 ; "legacy draw route")]
    #[test_case("GET", "/" => 200 ; "welcome")]
    #[test_case("POST", "/draw-card" => 405 ; "post not allowed")]
    #[test_case("GET", "/shuffle" => 404 ; "unknown path")]
    fn test_route_status(method: &str, path: &str) -> u16 {
        let query = DeckQuery::new(deck(&["Throne"]));
        route(method, path, &query).status
    }

    #[test]
    fn test_draw_returns_card_json() {
        let query = DeckQuery::new(deck(&["Throne"]));
        let response = route("GET", "/draw-card", &query);
        let card: Card = serde_json::from_str(&response.body).unwrap();
        assert_eq!(card.name, "Throne");
        assert_eq!(response.content_type, "application/json");
    }

    #[test]
    fn test_empty_deck_is_404_with_error_body() {
        let query = DeckQuery::new(Deck::default());
        let response = route("GET", "/draw-card", &query);
        assert_eq!(response.status, 404);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], EMPTY_DECK_MESSAGE);
    }

    #[test]
    fn test_response_bytes() {
        let bytes = HttpResponse::text(200, "hi").to_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }

    async fn head_of(raw: &str, limit: u64) -> RequestHead {
        let mut reader = AsyncReadExt::take(raw.as_bytes(), limit);
        read_head(&mut reader).await.unwrap()
    }

    #[tokio::test]
    async fn test_read_head_within_limit() {
        let head = head_of("GET /draw-card HTTP/1.1\r\nHost: x\r\n\r\n", 1024).await;
        assert!(matches!(head, RequestHead::Line(line) if line == "GET /draw-card HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_read_head_rejects_oversized_input() {
        let long_target = format!("GET /draw-card?{} HTTP/1.1\r\n\r\n", "A".repeat(500));
        assert!(matches!(head_of(&long_target, 128).await, RequestHead::TooLarge(414)));

        let long_header = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "B".repeat(500));
        assert!(matches!(head_of(&long_header, 128).await, RequestHead::TooLarge(431)));

        let many_headers = format!("GET / HTTP/1.1\r\n{}\r\n", "X: y\r\n".repeat(MAX_HEADER_LINES + 1));
        assert!(matches!(head_of(&many_headers, 64 * 1024).await, RequestHead::TooLarge(431)));
    }
}
