//! Error types for proxy forwarding and cache configuration.

use gyro_ref::RefError;
use thiserror::Error;

/// Errors returned by proxy calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProxyError {
	/// The backing controller refused the call, usually because it is not bound.
	#[error(transparent)]
	Ref(#[from] RefError),

	/// The proxy class does not include the requested capability.
	#[error("{class} does not implement {capability}")]
	Unsupported {
		/// Name of the proxy class.
		class: String,
		/// Name of the requested capability.
		capability: &'static str,
	},
}

impl ProxyError {
	/// Returns true when the backing controller had no delegate.
	pub fn is_unbound(&self) -> bool {
		matches!(self, Self::Ref(err) if err.is_unbound())
	}
}

/// Errors that can occur when loading a [`crate::CacheConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A field holds a value the cache cannot use.
	#[error("invalid {field}: {reason}")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// What was wrong with it.
		reason: String,
	},
}
