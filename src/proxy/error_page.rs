//! Minimal HTML error responses sent back to clients.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// An HTTP/1.0 error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    /// What the client sent that caused the error
    pub cause: String,
    pub status: u16,
    /// Reason phrase for the status line
    pub reason: &'static str,
    /// Longer explanation shown in the body
    pub message: &'static str,
}

impl ErrorPage {
    pub fn new(
        cause: impl Into<String>,
        status: u16,
        reason: &'static str,
        message: &'static str,
    ) -> Self {
        Self {
            cause: cause.into(),
            status,
            reason,
            message,
        }
    }

    pub fn body(&self) -> String {
        format!(
            "<html><title>Proxy Error</title><body bgcolor=\"ffffff\">\r\n\
             {}: {}\r\n\
             <p>{}: {}\r\n\
             <hr><em>The Proxy Server</em>\r\n",
            self.status,
            self.reason,
            self.message,
            escape_html(&self.cause)
        )
    }

    /// Status line and headers for a body of `body_len` bytes.
    pub fn header(&self, body_len: usize) -> String {
        format!(
            "HTTP/1.0 {} {}\r\n\
             Content-type: text/html\r\n\
             Content-length: {}\r\n\r\n",
            self.status, self.reason, body_len
        )
    }

    /// Full response bytes, header followed by body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body();
        let mut bytes = self.header(body.len()).into_bytes();
        bytes.extend_from_slice(body.as_bytes());
        bytes
    }

    /// Writes the header and then the body to `writer`.
    pub async fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let body = self.body();
        writer.write_all(self.header(body.len()).as_bytes()).await?;
        writer.write_all(body.as_bytes()).await?;
        writer.flush().await
    }
}

/// The cause is echoed from client input.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
