use std::sync::Barrier;
use std::thread;

use pretty_assertions::assert_eq;

use super::*;
use crate::capability;

capability! {
	trait Reader via ReaderProxy {
		fn read(&self) -> String;
	}
}

capability! {
	trait Writer via WriterProxy {
		fn write(&self, text: String);
	}
}

fn reader() -> CapabilityType {
	CapabilityType::of::<dyn Reader>()
}

fn writer() -> CapabilityType {
	CapabilityType::of::<dyn Writer>()
}

#[test]
fn same_list_returns_same_class() {
	let cache = ProxyClassCache::new();
	let first = cache.class_for([reader(), writer()]);
	let second = cache.class_for([reader(), writer()]);

	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(cache.len(), 1);
}

#[test]
fn duplicates_collapse_onto_the_same_key() {
	let cache = ProxyClassCache::new();
	let plain = cache.class_for([reader(), writer()]);
	let repeated = cache.class_for([reader(), writer(), reader()]);

	assert!(Arc::ptr_eq(&plain, &repeated));
}

#[test]
fn order_and_set_changes_give_new_classes() {
	let cache = ProxyClassCache::new();
	let rw = cache.class_for([reader(), writer()]);
	let wr = cache.class_for([writer(), reader()]);
	let r = cache.class_for([reader()]);

	assert!(!Arc::ptr_eq(&rw, &wr));
	assert_eq!(cache.len(), 3);
	assert_eq!(rw.name(), "$proxy0.ReaderWriter");
	assert_eq!(wr.name(), "$proxy1.WriterReader");
	assert_eq!(r.name(), "$proxy2.Reader");
}

#[test]
fn configured_prefix_names_classes() {
	let config = CacheConfig {
		prefix: "$gen".into(),
		capacity: 4,
		shards: Some(4),
	};
	let cache = ProxyClassCache::with_config(&config).unwrap();
	assert!(cache.is_empty());
	assert_eq!(cache.prefix(), "$gen");
	assert_eq!(cache.class_for([writer()]).name(), "$gen0.Writer");
}

#[test]
fn invalid_config_is_rejected() {
	let config = CacheConfig {
		shards: Some(3),
		..CacheConfig::default()
	};
	assert!(ProxyClassCache::with_config(&config).is_err());
}

#[test]
fn proxy_uses_declared_types() {
	let cache = ProxyClassCache::new();
	let reference = Arc::new(Ref::<String>::new([writer(), reader()]));

	let proxy = cache.proxy(Arc::clone(&reference));
	assert!(Arc::ptr_eq(proxy.class(), &cache.class_for([writer(), reader()])));
	assert!(Arc::ptr_eq(proxy.reference(), &reference));
}

#[test]
fn global_is_one_instance() {
	assert!(std::ptr::eq(ProxyClassCache::global(), ProxyClassCache::global()));
	assert_eq!(ProxyClassCache::global().prefix(), crate::DEFAULT_PREFIX);
}

#[test]
fn concurrent_first_use_synthesizes_once() {
	const THREADS: usize = 16;

	let cache = ProxyClassCache::new();
	let barrier = Barrier::new(THREADS);

	let classes: Vec<Arc<ProxyClass>> = thread::scope(|scope| {
		let handles: Vec<_> = (0..THREADS)
			.map(|_| {
				scope.spawn(|| {
					barrier.wait();
					cache.class_for([reader(), writer()])
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(cache.len(), 1);
	assert!(classes.iter().all(|c| Arc::ptr_eq(c, &classes[0])));
	assert_eq!(classes[0].name(), "$proxy0.ReaderWriter");
}
