//! Client request reading and origin request composition.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{ProxyError, Result};

/// Longest request or header line accepted, terminator included.
pub const MAX_LINE: usize = 8192;

/// Identifying client-agent header sent to every origin.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

// == Line Reading ==
/// One line read from a client.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Nothing left to read
    Eof,
    /// Line contents without the trailing `\r\n` or `\n`
    Text(Vec<u8>),
    /// `MAX_LINE` bytes arrived without a line terminator
    TooLong,
}

/// Reads a single line of at most `limit` bytes.
///
/// A final unterminated line before end-of-stream is returned as text.
pub async fn read_line<R>(reader: &mut R, limit: usize) -> io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = reader.take(limit as u64).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Line::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() >= limit {
        return Ok(Line::TooLong);
    }
    Ok(Line::Text(buf))
}

/// Consumes the rest of the client's header block up to the empty line.
///
/// Headers are never forwarded; they are read so the client is not reset by
/// unread input when the connection closes.
pub async fn drain_headers<R>(reader: &mut R) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut count = 0;
    loop {
        match read_line(reader, MAX_LINE).await? {
            Line::Eof => return Ok(count),
            Line::Text(line) if line.is_empty() => return Ok(count),
            Line::Text(_) | Line::TooLong => count += 1,
        }
    }
}

// == Request Line ==
/// The three tokens of an HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    /// Request-target exactly as sent; also the cache key
    pub target: String,
    pub version: String,
}

impl RequestLine {
    /// Splits a request line on whitespace. Tokens past the third are ignored.
    pub fn parse(line: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(line)
            .map_err(|_| ProxyError::MalformedRequest(String::from_utf8_lossy(line).into_owned()))?;

        let mut tokens = text.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(target), Some(version)) => Ok(Self {
                method: method.to_string(),
                target: target.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ProxyError::MalformedRequest(text.to_string())),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

// == Origin Request ==
/// Composes the HTTP/1.0 request sent to the origin.
///
/// Only the path and host are carried over; other client headers are dropped.
pub fn build_origin_request(host: &str, path: &str) -> String {
    format!(
        "GET {path} HTTP/1.0\r\n\
         Host: {host}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Connection: close\r\n\
         Proxy-Connection: close\r\n\
         \r\n"
    )
}
