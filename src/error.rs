//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use std::io;

use thiserror::Error;

use crate::proxy::{ErrorPage, UriError};

// == Proxy Error Enum ==
/// Everything that can end the handling of one client connection.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Request line did not split into method, target and version
    #[error("malformed request line: {0:?}")]
    MalformedRequest(String),

    /// Request line longer than the line limit
    #[error("request line exceeds {0} bytes")]
    RequestTooLong(usize),

    /// Any method other than GET
    #[error("unsupported method: {0}")]
    NotImplemented(String),

    /// Request-target is not a usable absolute http URI
    #[error("malformed URI {uri:?}: {source}")]
    MalformedUri {
        uri: String,
        #[source]
        source: UriError,
    },

    /// Origin could not be reached
    #[error("cannot connect to {host}:{port}: {source}")]
    BadGateway {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Socket failure; nothing more can be sent to the client
    #[error(transparent)]
    Io(#[from] io::Error),
}

// == Error Page Mapping ==
impl ProxyError {
    /// The error page to send the client, or None when the connection must be
    /// dropped without a response.
    pub fn error_page(&self) -> Option<ErrorPage> {
        let page = match self {
            ProxyError::MalformedRequest(line) => {
                ErrorPage::new(line, 400, "Bad Request", "Cannot parse request line")
            }
            ProxyError::RequestTooLong(_) => {
                ErrorPage::new("request line", 400, "Bad Request", "Request line too long")
            }
            ProxyError::NotImplemented(method) => {
                ErrorPage::new(method, 501, "Not Implemented", "Proxy only supports GET")
            }
            ProxyError::MalformedUri { uri, .. } => {
                ErrorPage::new(uri, 400, "Bad Request", "Malformed URI")
            }
            ProxyError::BadGateway { host, .. } => {
                ErrorPage::new(host, 502, "Bad Gateway", "Cannot connect to server")
            }
            ProxyError::Io(_) => return None,
        };
        Some(page)
    }
}

// == Config Error Enum ==
/// Startup configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Wrong number of command line arguments
    #[error("Usage: {0} <port>")]
    Usage(String),

    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("MAX_OBJECT_SIZE ({max_object_size}) must be between 1 and MAX_CACHE_SIZE ({max_cache_size})")]
    Sizes {
        max_cache_size: usize,
        max_object_size: usize,
    },
}

// == Result Type Alias ==
/// Convenience Result type for connection handling.
pub type Result<T> = std::result::Result<T, ProxyError>;
