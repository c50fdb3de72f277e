//! Absolute URI decomposition.

use thiserror::Error;

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 80;

const SCHEME: &str = "http://";

/// Why a request-target could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("only http:// URIs are supported")]
    UnsupportedScheme,

    #[error("empty host")]
    EmptyHost,

    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Where a request must be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTarget {
    pub host: String,
    pub port: u16,
    /// Origin-form path, always starting with `/`
    pub path: String,
}

/// Splits an absolute `http://host[:port][/path]` URI.
///
/// The scheme is matched case-insensitively. The host runs up to the first
/// `:` or `/`; a missing port means 80 and a missing path means `/`.
pub fn parse_uri(uri: &str) -> Result<OriginTarget, UriError> {
    let rest = uri
        .get(..SCHEME.len())
        .filter(|scheme| scheme.eq_ignore_ascii_case(SCHEME))
        .map(|_| &uri[SCHEME.len()..])
        .ok_or(UriError::UnsupportedScheme)?;

    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let (host, mut rest) = rest.split_at(host_end);
    if host.is_empty() {
        return Err(UriError::EmptyHost);
    }

    let mut port = DEFAULT_PORT;
    if let Some(after_colon) = rest.strip_prefix(':') {
        let port_end = after_colon.find('/').unwrap_or(after_colon.len());
        let (digits, remainder) = after_colon.split_at(port_end);
        port = digits
            .parse()
            .map_err(|_| UriError::InvalidPort(digits.to_string()))?;
        rest = remainder;
    }

    let path = if rest.starts_with('/') { rest } else { "/" };

    Ok(OriginTarget {
        host: host.to_string(),
        port,
        path: path.to_string(),
    })
}
