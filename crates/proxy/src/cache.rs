//! Process-wide memo of proxy classes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gyro_ref::{CapabilityType, Ref};
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::{CacheConfig, ConfigError, Proxy, ProxyClass, ProxyKey};

static GLOBAL: LazyLock<ProxyClassCache> = LazyLock::new(ProxyClassCache::new);

/// Maps each distinct ordered capability list to its [`ProxyClass`].
///
/// Lookups and synthesis are safe from any number of threads; a class is
/// synthesized at most once per key and lives as long as the cache.
pub struct ProxyClassCache {
	classes: DashMap<ProxyKey, Arc<ProxyClass>, FxBuildHasher>,
	serial: AtomicU64,
	prefix: Box<str>,
}

impl ProxyClassCache {
	/// Creates an empty cache with the default configuration.
	pub fn new() -> Self {
		Self::build(&CacheConfig::default())
	}

	/// Creates an empty cache from validated settings.
	pub fn with_config(config: &CacheConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::build(config))
	}

	fn build(config: &CacheConfig) -> Self {
		let classes = match config.shards {
			Some(shards) => DashMap::with_capacity_and_hasher_and_shard_amount(config.capacity, FxBuildHasher, shards),
			None => DashMap::with_capacity_and_hasher(config.capacity, FxBuildHasher),
		};
		Self {
			classes,
			serial: AtomicU64::new(0),
			prefix: config.prefix.as_str().into(),
		}
	}

	/// The shared cache used when callers do not bring their own.
	pub fn global() -> &'static Self {
		&GLOBAL
	}

	/// Returns the class for the ordered capability list, synthesizing it on first use.
	pub fn class_for(&self, types: impl IntoIterator<Item = CapabilityType>) -> Arc<ProxyClass> {
		let key = ProxyKey::new(types);

		if let Some(class) = self.classes.get(&key) {
			trace!(class = class.name(), "proxy class cache hit");
			return Arc::clone(&class);
		}

		match self.classes.entry(key) {
			Entry::Occupied(entry) => Arc::clone(entry.get()),
			Entry::Vacant(entry) => {
				let serial = self.serial.fetch_add(1, Ordering::Relaxed);
				let class = Arc::new(ProxyClass::synthesize(&self.prefix, serial, entry.key().clone()));
				debug!(class = class.name(), operations = class.operations().len(), "synthesized proxy class");
				entry.insert(Arc::clone(&class));
				class
			}
		}
	}

	/// Returns a proxy over `reference` implementing exactly `types`, in that order.
	pub fn get_or_create<D>(&self, types: impl IntoIterator<Item = CapabilityType>, reference: Arc<Ref<D>>) -> Proxy<D>
	where
		D: Send + Sync + 'static,
	{
		Proxy::new(self.class_for(types), reference)
	}

	/// Returns a proxy over `reference` implementing the controller's declared types.
	pub fn proxy<D>(&self, reference: Arc<Ref<D>>) -> Proxy<D>
	where
		D: Send + Sync + 'static,
	{
		let class = self.class_for(reference.types().iter().copied());
		Proxy::new(class, reference)
	}

	/// Number of cached classes.
	pub fn len(&self) -> usize {
		self.classes.len()
	}

	/// Returns true if no class has been synthesized yet.
	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Class name prefix.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}
}

impl Default for ProxyClassCache {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ProxyClassCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyClassCache")
			.field("prefix", &self.prefix)
			.field("classes", &self.classes.len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
