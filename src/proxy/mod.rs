//! Proxy Module
//!
//! Request parsing, origin forwarding and the per-connection relay.
//!
//! # Flow
//! request line -> method check -> URI parse -> cache lookup -> origin fetch
//! -> streamed relay -> cache insert

pub mod error_page;
pub mod relay;
pub mod request;
pub mod uri;

pub use error_page::ErrorPage;
pub use relay::{serve_client, ProxyState, RelayOutcome};
pub use request::{build_origin_request, RequestLine, USER_AGENT};
pub use uri::{parse_uri, OriginTarget, UriError};
