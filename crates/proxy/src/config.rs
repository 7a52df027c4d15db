//! Proxy class cache configuration.
//!
//! ```toml
//! prefix = "$proxy"
//! capacity = 64
//! shards = 16
//! ```
//!
//! Every field is optional.

use serde::Deserialize;

use crate::ConfigError;

/// Class name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "$proxy";

/// Settings for a [`crate::ProxyClassCache`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	/// Prefix of synthesized class names. Must not be empty.
	pub prefix: String,
	/// Number of classes to reserve room for up front.
	pub capacity: usize,
	/// Shard count of the underlying map. Must be a power of two greater than one.
	pub shards: Option<usize>,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			prefix: DEFAULT_PREFIX.to_owned(),
			capacity: 0,
			shards: None,
		}
	}
}

impl CacheConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks every field.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.prefix.is_empty() {
			return Err(ConfigError::Invalid {
				field: "prefix",
				reason: "must not be empty".into(),
			});
		}
		if let Some(shards) = self.shards
			&& (shards < 2 || !shards.is_power_of_two())
		{
			return Err(ConfigError::Invalid {
				field: "shards",
				reason: format!("{shards} is not a power of two greater than one"),
			});
		}
		Ok(())
	}
}
