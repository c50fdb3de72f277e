//! Relay Engine
//!
//! Serves one client connection: reads the request, answers from the cache
//! when possible, otherwise fetches from the origin and streams the response
//! back while buffering it for the cache.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::cache::{ObjectCache, PutOutcome};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::proxy::request::{
    build_origin_request, drain_headers, read_line, Line, RequestLine, MAX_LINE,
};
use crate::proxy::uri::{parse_uri, OriginTarget};

/// Bytes read from the origin per chunk.
pub const CHUNK_SIZE: usize = 8192;

/// How long leftover request headers are read after an error page.
const ERROR_LINGER: Duration = Duration::from_millis(250);

/// State shared by every connection task.
#[derive(Debug, Clone)]
pub struct ProxyState {
    /// Shared object cache
    pub cache: Arc<ObjectCache>,
    /// Origin connect deadline, None = wait indefinitely
    pub connect_timeout: Option<Duration>,
}

impl ProxyState {
    pub fn new(cache: ObjectCache) -> Self {
        Self {
            cache: Arc::new(cache),
            connect_timeout: None,
        }
    }

    /// Creates the state from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = ObjectCache::new(config.max_cache_size, config.max_object_size);
        Self {
            connect_timeout: config.connect_timeout(),
            ..Self::new(cache)
        }
    }
}

/// How a connection ended when no I/O error cut it short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Client closed before sending a request line
    NoRequest,
    /// Served from the cache without contacting the origin
    CacheHit { bytes: usize },
    /// Relayed from the origin; `cached` is true when this response was stored
    Relayed { bytes: usize, cached: bool },
    /// An error page was sent instead of a response
    ErrorPage { status: u16 },
}

// == Serve Client ==
/// Handles one request on `client`.
///
/// Client errors are answered with an error page and reported as
/// [`RelayOutcome::ErrorPage`]. An `Err` means the connection failed in a way
/// that leaves nothing sensible to send. The caller owns and closes `client`.
pub async fn serve_client<S>(client: &mut S, state: &ProxyState) -> Result<RelayOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut client = BufReader::new(client);

    match handle_request(&mut client, state).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => match err.error_page() {
            Some(page) => {
                info!(status = page.status, error = %err, "Rejecting request");
                page.write_to(&mut client).await?;
                linger(&mut client).await;
                Ok(RelayOutcome::ErrorPage {
                    status: page.status,
                })
            }
            None => Err(err),
        },
    }
}

async fn handle_request<C>(client: &mut BufReader<C>, state: &ProxyState) -> Result<RelayOutcome>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let line = match read_line(client, MAX_LINE).await? {
        Line::Eof => return Ok(RelayOutcome::NoRequest),
        Line::TooLong => return Err(ProxyError::RequestTooLong(MAX_LINE)),
        Line::Text(line) => line,
    };

    let request = RequestLine::parse(&line)?;
    if !request.is_get() {
        return Err(ProxyError::NotImplemented(request.method));
    }

    let target = parse_uri(&request.target).map_err(|source| ProxyError::MalformedUri {
        uri: request.target.clone(),
        source,
    })?;
    drain_headers(client).await?;

    if let Some(payload) = state.cache.get(&request.target).await {
        debug!(uri = %request.target, bytes = payload.len(), "Cache hit");
        client.write_all(&payload).await?;
        client.flush().await?;
        return Ok(RelayOutcome::CacheHit {
            bytes: payload.len(),
        });
    }
    debug!(uri = %request.target, "Cache miss");

    let mut origin = connect_origin(&target, state.connect_timeout).await?;
    origin
        .write_all(build_origin_request(&target.host, &target.path).as_bytes())
        .await?;

    let max_object_size = state.cache.max_object_size().await;
    let (bytes, object) = relay_response(&mut origin, client, max_object_size).await?;
    drop(origin);

    let cached = match object {
        Some(object) if !object.is_empty() => matches!(
            state.cache.put(&request.target, &object).await,
            PutOutcome::Inserted { .. }
        ),
        _ => false,
    };

    info!(uri = %request.target, bytes, cached, "Relayed response");
    Ok(RelayOutcome::Relayed { bytes, cached })
}

/// Discards header lines the client already sent, so closing right after an
/// error page does not reset the connection under it. Bounded by
/// [`ERROR_LINGER`] since the client may still be waiting on its own side.
async fn linger<R>(client: &mut R)
where
    R: AsyncBufRead + Unpin,
{
    if let Ok(Ok(lines)) = tokio::time::timeout(ERROR_LINGER, drain_headers(client)).await {
        debug!(lines, "Discarded request headers");
    }
}

/// Opens the origin connection, bounded by `timeout` when one is set.
async fn connect_origin(target: &OriginTarget, timeout: Option<Duration>) -> Result<TcpStream> {
    let attempt = TcpStream::connect((target.host.as_str(), target.port));
    let connected = match timeout {
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))),
        None => attempt.await,
    };

    connected.map_err(|source| ProxyError::BadGateway {
        host: target.host.clone(),
        port: target.port,
        source,
    })
}

// == Relay Response ==
/// Copies `origin` to `client` until end-of-stream.
///
/// Returns the byte count and, if the whole response fit within
/// `max_object_size`, a copy of it. Buffering never changes what the client
/// receives.
pub async fn relay_response<R, W>(
    origin: &mut R,
    client: &mut W,
    max_object_size: usize,
) -> io::Result<(usize, Option<Vec<u8>>)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut object = Some(Vec::new());
    let mut total = 0;

    loop {
        let n = origin.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        client.write_all(&chunk[..n]).await?;
        total += n;

        match object.as_mut() {
            Some(buf) if buf.len() + n <= max_object_size => buf.extend_from_slice(&chunk[..n]),
            _ => object = None,
        }
    }
    client.flush().await?;

    Ok((total, object))
}
