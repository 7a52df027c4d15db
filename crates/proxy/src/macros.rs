//! Capability declaration macro.

/// Declares a capability trait together with its proxy forwarding trait.
///
/// ```
/// use std::sync::Arc;
///
/// use gyro_proxy::{ProxyClassCache, Ref, capability};
///
/// capability! {
/// 	/// Adds numbers.
/// 	pub trait Sum via SumProxy {
/// 		/// Returns `a + b`.
/// 		fn add(&self, a: i32, b: i32) -> i32;
/// 		fn reset(&self);
/// 	}
/// }
///
/// struct Adder;
///
/// impl Sum for Adder {
/// 	fn add(&self, a: i32, b: i32) -> i32 {
/// 		a + b
/// 	}
///
/// 	fn reset(&self) {}
/// }
///
/// let reference = Arc::new(Ref::<Adder>::of::<dyn Sum>());
/// let proxy = ProxyClassCache::new().proxy(Arc::clone(&reference));
/// assert!(proxy.add(1, 2).unwrap_err().is_unbound());
///
/// reference.open()?;
/// reference.bind(Adder, None)?;
/// assert_eq!(proxy.add(1, 2).unwrap(), 3);
/// # Ok::<(), gyro_proxy::RefError>(())
/// ```
///
/// Expands to:
///
/// - the trait itself, with `Send + Sync` supertraits;
/// - `impl Capability for dyn Trait`, naming the trait and listing each method;
/// - a blanket impl for `Arc<S>` where `S: Trait`;
/// - the forwarding trait, with every method returning `Result<_, ProxyError>`,
///   implemented for each [`Proxy<D>`](crate::Proxy) whose `D` implements the trait.
///
/// Methods take `&self` and owned or borrowed arguments; generic methods are not
/// supported.
#[macro_export]
macro_rules! capability {
	(
		$(#[$meta:meta])*
		$vis:vis trait $name:ident via $proxy:ident {
			$(
				$(#[$fmeta:meta])*
				fn $method:ident(&self $(, $arg:ident : $argty:ty)* $(,)?) $(-> $ret:ty)?;
			)*
		}
	) => {
		$(#[$meta])*
		$vis trait $name: ::core::marker::Send + ::core::marker::Sync {
			$(
				$(#[$fmeta])*
				fn $method(&self $(, $arg: $argty)*) $(-> $ret)?;
			)*
		}

		impl $crate::Capability for dyn $name {
			const NAME: &'static str = ::core::stringify!($name);
			const OPERATIONS: &'static [$crate::Operation] = &[
				$(
					$crate::Operation::new(
						::core::stringify!($method),
						::core::stringify!(fn $method(&self $(, $arg: $argty)*) $(-> $ret)?),
					),
				)*
			];
		}

		impl<S: $name + ?Sized> $name for ::std::sync::Arc<S> {
			$(
				fn $method(&self $(, $arg: $argty)*) $(-> $ret)? {
					<S as $name>::$method(&**self $(, $arg)*)
				}
			)*
		}

		#[doc = ::core::concat!("Forwards [`", ::core::stringify!($name), "`] calls through a proxy.")]
		$vis trait $proxy {
			$(
				#[allow(unused_parens)]
				$(#[$fmeta])*
				fn $method(&self $(, $arg: $argty)*) -> ::core::result::Result<($($ret)?), $crate::ProxyError>;
			)*
		}

		impl<D: $name + 'static> $proxy for $crate::Proxy<D> {
			$(
				#[allow(unused_parens)]
				fn $method(&self $(, $arg: $argty)*) -> ::core::result::Result<($($ret)?), $crate::ProxyError> {
					self.forward::<dyn $name, _, _>(move |delegate| <D as $name>::$method(delegate $(, $arg)*))
				}
			)*
		}
	};
}
