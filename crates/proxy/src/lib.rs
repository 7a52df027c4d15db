//! Capability-typed proxies over reference lifecycle controllers.
//!
//! A [`Proxy`] stands in for "whatever currently implements these capabilities".
//! Each call takes the shared lock of its [`Ref`], reads the delegate and forwards
//! to it, failing with [`ProxyError`] while nothing is bound.
//!
//! # Mental model
//!
//! - Capabilities are traits declared with [`capability!`], which also generates
//!   their descriptor and a forwarding trait implemented for [`Proxy`].
//! - A [`ProxyClass`] is the forwarding layout for one ordered capability list. The
//!   [`ProxyClassCache`] builds each class once and hands the same `Arc` to every
//!   later request for that list.
//! - Proxies are cheap handles: a class plus a controller. They hold no delegate.
//!
//! # Configuration
//!
//! [`CacheConfig`] is read from TOML and tunes the cache's class name prefix and map
//! sizing. [`ProxyClassCache::global`] uses the defaults.
#![warn(missing_docs)]

mod cache;
mod class;
mod config;
mod error;
mod key;
mod macros;
mod proxy;

pub use cache::ProxyClassCache;
pub use class::ProxyClass;
pub use config::{CacheConfig, DEFAULT_PREFIX};
pub use error::{ConfigError, ProxyError};
pub use gyro_ref::{Capability, CapabilityType, Operation, Ref, RefError};
pub use key::ProxyKey;
pub use proxy::Proxy;
