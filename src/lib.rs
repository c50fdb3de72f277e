//! Cache Proxy - A forwarding HTTP proxy with an in-memory object cache
//!
//! Relays GET requests to origin servers and caches small responses with
//! byte-bounded LRU eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod proxy;
pub mod server;
pub mod tasks;

pub use config::Config;
pub use proxy::ProxyState;
pub use server::Server;
pub use tasks::spawn_stats_task;
