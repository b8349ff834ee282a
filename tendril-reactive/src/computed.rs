//! # Computed signals
//!
//! A computed signal, [`Computed`], caches the result of a reactive function,
//! that is, a function that reads other signals or computeds.
//!
//! The function is only evaluated lazily, when the computed is read without a
//! valid cache. Any change to a signal read during the last evaluation
//! invalidates the cache, synchronously, even during a batch.
//!
//! ## Examples
//! ```rust
//! use tendril_reactive::{Computed, Signal, SignalGet};
//! let a = Signal::new(5);
//! let b = Signal::new(3);
//! let sum = Computed::new({
//! 	let (a, b) = (a.clone(), b.clone());
//! 	move || a.get() + b.get()
//! });
//! assert_eq!(sum.get(), 8);
//!
//! b.set(1);
//! assert_eq!(sum.get(), 6);
//! ```
//!
//! ## Late binding
//! When a computed is read from cache, it's function isn't run, so none of the
//! signals it depends on would be read. To still wire the reader up to them, the
//! computed remembers every signal it read during it's last evaluation (it's
//! upstream), and gathers the current context onto each of them on a cached read.

// Imports
use {
	crate::{
		SignalWith,
		context::{computed_stack, is_tracking},
		dependents::{Dependents, WeakDependents},
		loc::Loc,
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
		mem,
	},
	std::rc::Rc,
};

/// Computed node.
///
/// Type-erased interface of a computed, used by the
/// computed stack and dependents.
pub(crate) trait ComputedNode {
	/// Invalidates the cache
	fn invalidate(&self);

	/// Adds an upstream dependency
	fn add_upstream(&self, dependents: &Dependents);
}

/// Computed inner
struct Inner<T> {
	/// Cached value
	value: RefCell<Option<T>>,

	/// Whether the cached value is valid
	has_cache: Cell<bool>,

	/// Whether we're currently evaluating
	evaluating: Cell<bool>,

	/// Upstream dependencies, replayed on cached reads
	upstream: RefCell<Vec<WeakDependents>>,

	/// Where this computed was defined
	defined_loc: Loc,

	/// Function
	f: Box<dyn Fn() -> T>,
}

impl<T> ComputedNode for Inner<T> {
	fn invalidate(&self) {
		if self.has_cache.replace(false) {
			tracing::trace!("Invalidated computed\nComputed: {}", self.defined_loc);
		}
	}

	fn add_upstream(&self, dependents: &Dependents) {
		let mut upstream = self.upstream.borrow_mut();
		if !upstream.iter().any(|upstream| upstream.id() == dependents.id()) {
			upstream.push(dependents.downgrade());
		}
	}
}

/// Computed signal.
///
/// See the module documentation for more information.
pub struct Computed<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Computed<T> {
	/// Creates a new computed signal.
	///
	/// `f` isn't run until the computed is first read.
	#[track_caller]
	pub fn new<F>(f: F) -> Self
	where
		F: Fn() -> T + 'static,
	{
		let inner = Inner {
			value:       RefCell::new(None),
			has_cache:   Cell::new(false),
			evaluating:  Cell::new(false),
			upstream:    RefCell::new(vec![]),
			defined_loc: Loc::caller(),
			f:           Box::new(f),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Returns if the value is currently cached
	#[must_use]
	pub fn is_cached(&self) -> bool {
		self.inner.has_cache.get()
	}

	/// Returns where this computed was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Ensures the value is cached, gathering the current context.
	#[track_caller]
	fn refresh(&self) {
		if !self.inner.has_cache.get() {
			self.evaluate();
			return;
		}

		// Note: A `Dependents` gathers everything in the current context,
		//       so skip the replay when nothing would be tracked.
		if !is_tracking() {
			return;
		}

		let upstream = self.inner.upstream.borrow().clone();
		for dependents in upstream.iter().filter_map(WeakDependents::upgrade) {
			dependents.gather();
		}
	}

	/// Evaluates the function and caches it's value.
	///
	/// If the function panics, the cache is left unset.
	#[track_caller]
	fn evaluate(&self) {
		assert!(
			!self.inner.evaluating.get(),
			"Computed was read during it's own evaluation\nComputed: {}\nRead    : {}",
			self.inner.defined_loc,
			Loc::caller()
		);

		tracing::trace!("Evaluating computed\nComputed: {}", self.inner.defined_loc);

		// Note: The upstream is rebuilt by the reads during evaluation, so
		//       stop being invalidated by anything we might no longer read.
		let computed_id = Rc::as_ptr(&self.inner).addr();
		let upstream = mem::take(&mut *self.inner.upstream.borrow_mut());
		for dependents in upstream.iter().filter_map(WeakDependents::upgrade) {
			dependents.remove_invalidator(computed_id);
		}

		let value = {
			let _gatherer = ComputedDepsGatherer::new(&self.inner);
			(self.inner.f)()
		};

		*self
			.inner
			.value
			.try_borrow_mut()
			.expect("Cannot update computed value while using it") = Some(value);
		self.inner.has_cache.set(true);
	}
}

impl<T: 'static> SignalWith for Computed<T> {
	type Value = T;

	#[track_caller]
	fn with<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&Self::Value) -> O,
	{
		self.refresh();

		let value = self
			.inner
			.value
			.try_borrow()
			.expect("Cannot use computed value while updating it");
		let value = value.as_ref().expect("Value wasn't initialized");
		f(value)
	}
}

impl<T> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Computed");
		s.field("defined_loc", &self.inner.defined_loc);
		s.field("has_cache", &self.inner.has_cache.get());
		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value).finish(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}

/// Computed dependency gatherer.
///
/// While this type is alive, any signals used will be added
/// as a dependency of the computed.
struct ComputedDepsGatherer<'a, T> {
	/// Inner
	inner: &'a Inner<T>,
}

impl<'a, T: 'static> ComputedDepsGatherer<'a, T> {
	/// Creates a new dependency gatherer
	fn new(inner: &'a Rc<Inner<T>>) -> Self {
		inner.evaluating.set(true);
		computed_stack::push(Some(Rc::clone(inner) as Rc<dyn ComputedNode>));

		Self { inner: inner.as_ref() }
	}
}

impl<T> Drop for ComputedDepsGatherer<'_, T> {
	fn drop(&mut self) {
		computed_stack::pop();
		self.inner.evaluating.set(false);
	}
}
