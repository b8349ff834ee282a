//! Dependents
//!
//! The registry each reactive cell owns, recording who has read it:
//! the effects to re-run and the computed caches to invalidate once it
//! changes.
//!
//! Effects are only held weakly, so depending on a cell never extends
//! an effect's lifetime. Each subscription also registers a teardown on
//! the effect, which removes it from this registry once the effect is
//! re-run, destroyed or dropped.

// Imports
use {
	crate::{
		Effect,
		WeakEffect,
		computed::ComputedNode,
		context::{batch_stack, computed_stack, effect_stack},
		loc::Loc,
	},
	core::{
		cell::RefCell,
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	std::rc::{Rc, Weak},
};

/// Dependents inner
struct Inner {
	/// Subscribed effects, in the order they subscribed
	effects: RefCell<Vec<WeakEffect>>,

	/// Computed caches to invalidate
	invalidators: RefCell<Vec<Weak<dyn ComputedNode>>>,

	/// Where this was defined
	defined_loc: Loc,
}

/// Dependents
pub struct Dependents {
	/// Inner
	inner: Rc<Inner>,
}

impl Dependents {
	/// Creates new, empty, dependents
	#[must_use]
	#[track_caller]
	pub fn new() -> Self {
		let inner = Inner {
			effects:      RefCell::new(vec![]),
			invalidators: RefCell::new(vec![]),
			defined_loc:  Loc::caller(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Downgrades these dependents
	#[must_use]
	pub fn downgrade(&self) -> WeakDependents {
		WeakDependents {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Returns a unique identifier to these dependents.
	///
	/// Downgrading and cloning will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner).addr()
	}

	/// Returns where these dependents were defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Returns the number of subscribed effects
	#[must_use]
	pub fn effect_count(&self) -> usize {
		self.inner.effects.borrow().len()
	}

	/// Gathers the current context as dependents.
	///
	/// The tracking effect, if any, is subscribed, and every computed
	/// being evaluated will be invalidated on the next [`invalidate`](Self::invalidate)
	/// and remembers us as an upstream, to re-gather if it's read from cache.
	#[track_caller]
	pub fn gather(&self) {
		if let Some(effect) = effect_stack::tracking() {
			self.subscribe(&effect);
		}

		for computed in computed_stack::tracking() {
			self.add_invalidator(&computed);
			computed.add_upstream(self);
		}
	}

	/// Subscribes an effect to be triggered.
	///
	/// If the effect was already subscribed, does nothing.
	#[track_caller]
	pub fn subscribe(&self, effect: &Effect) {
		// Note: Effects that destroyed themselves mid-run would never
		//       tear down this subscription, so skip them.
		if effect.is_destroyed() {
			return;
		}

		{
			let sub = effect.downgrade();
			let mut effects = self.inner.effects.borrow_mut();
			if effects.contains(&sub) {
				return;
			}
			effects.push(sub);
		}

		tracing::trace!(
			"Subscribed effect\nEffect    : {}\nDependents: {}\nGathered  : {}",
			effect.defined_loc(),
			self.defined_loc(),
			Loc::caller(),
		);

		let dependents = self.downgrade();
		let effect_id = effect.id();
		effect.add_teardown(move || {
			if let Some(dependents) = dependents.upgrade() {
				dependents.unsubscribe(effect_id);
			}
		});
	}

	/// Unsubscribes an effect by id
	fn unsubscribe(&self, effect_id: usize) {
		self.inner.effects.borrow_mut().retain(|effect| effect.id() != effect_id);
	}

	/// Adds a computed to invalidate
	fn add_invalidator(&self, computed: &Rc<dyn ComputedNode>) {
		let computed_id = Rc::as_ptr(computed).addr();
		let mut invalidators = self.inner.invalidators.borrow_mut();

		// Note: Cells that are never written would otherwise keep every
		//       computed that ever read them allocated.
		invalidators.retain(|invalidator| invalidator.strong_count() != 0);
		if !invalidators
			.iter()
			.any(|invalidator| invalidator.as_ptr().addr() == computed_id)
		{
			invalidators.push(Rc::downgrade(computed));
		}
	}

	/// Removes a computed from the caches to invalidate.
	///
	/// Used once a computed stops reading us.
	pub(crate) fn remove_invalidator(&self, computed_id: usize) {
		self.inner
			.invalidators
			.borrow_mut()
			.retain(|invalidator| invalidator.as_ptr().addr() != computed_id);
	}

	/// Invalidates all dependent computed caches.
	///
	/// Computeds register themselves again once re-evaluated, so
	/// the invalidators are cleared.
	pub fn invalidate(&self) {
		let invalidators = mem::take(&mut *self.inner.invalidators.borrow_mut());
		for computed in invalidators.iter().filter_map(Weak::upgrade) {
			computed.invalidate();
		}
	}

	/// Triggers all subscribed effects, in the order they subscribed.
	///
	/// If a batch is active, they are queued onto it instead.
	#[track_caller]
	pub fn trigger(&self) {
		// Note: Effects will unsubscribe and resubscribe while running,
		//       so we can't keep the list borrowed.
		let effects = self.inner.effects.borrow().clone();
		if effects.is_empty() {
			return;
		}

		if batch_stack::is_active() {
			tracing::trace!(
				"Queueing {} effect(s) onto batch\nDependents: {}\nExecution : {}",
				effects.len(),
				self.defined_loc(),
				Loc::caller(),
			);
			for effect in effects {
				batch_stack::push(effect);
			}
			return;
		}

		for effect in effects.iter().filter_map(WeakEffect::upgrade) {
			tracing::trace!(
				"Running effect due to dependents\nEffect    : {}\nDependents: {}\nExecution : {}",
				effect.defined_loc(),
				self.defined_loc(),
				Loc::caller(),
			);
			effect.run();
		}
	}

	/// Invalidates and then triggers all dependents.
	///
	/// For values changed outside of a [`Signal`](crate::Signal), call
	/// [`invalidate`](Self::invalidate) before changing it instead, so that
	/// computeds never observe a stale cache for the new value.
	#[track_caller]
	pub fn notify(&self) {
		self.invalidate();
		self.trigger();
	}

	/// Formats these dependents into `s`
	fn fmt_debug(&self, mut s: fmt::DebugStruct<'_, '_>) -> fmt::Result {
		s.field("id", &self.id());
		s.field("defined_loc", &self.defined_loc());
		match self.inner.effects.try_borrow() {
			Ok(effects) => s.field("effects", &effects.len()).finish(),
			Err(_) => s.finish_non_exhaustive(),
		}
	}
}

impl Default for Dependents {
	#[track_caller]
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for Dependents {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl fmt::Debug for Dependents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.fmt_debug(f.debug_struct("Dependents"))
	}
}

/// Weak dependents
pub struct WeakDependents {
	/// Inner
	inner: Weak<Inner>,
}

impl WeakDependents {
	/// Creates empty weak dependents
	#[must_use]
	pub const fn new() -> Self {
		Self { inner: Weak::new() }
	}

	/// Returns a unique identifier to these dependents.
	///
	/// Upgrading and cloning will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Weak::as_ptr(&self.inner).addr()
	}

	/// Upgrades these weak dependents
	#[must_use]
	pub fn upgrade(&self) -> Option<Dependents> {
		let inner = self.inner.upgrade()?;
		Some(Dependents { inner })
	}
}

impl Default for WeakDependents {
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for WeakDependents {
	fn clone(&self) -> Self {
		Self {
			inner: Weak::clone(&self.inner),
		}
	}
}

impl fmt::Debug for WeakDependents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("WeakDependents");
		match self.upgrade() {
			Some(dependents) => dependents.fmt_debug(s),
			None => s.finish_non_exhaustive(),
		}
	}
}

#[duplicate::duplicate_item(
	T;
	[ Dependents ];
	[ WeakDependents ];
)]
impl PartialEq for T {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

#[duplicate::duplicate_item(
	T;
	[ Dependents ];
	[ WeakDependents ];
)]
impl Eq for T {}

#[duplicate::duplicate_item(
	T;
	[ Dependents ];
	[ WeakDependents ];
)]
impl Hash for T {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {
		super::*,
		crate::{Computed, Effect, Signal, SignalGet, context::untracked},
		core::cell::Cell,
	};

	#[test]
	fn subscribe_once() {
		let dependents = Dependents::new();
		let runs = Rc::new(Cell::new(0_usize));

		let effect = {
			let dependents = dependents.clone();
			let runs = Rc::clone(&runs);
			Effect::new(move || {
				dependents.gather();
				dependents.gather();
				runs.set(runs.get() + 1);
			})
		};

		assert_eq!(dependents.effect_count(), 1, "Effect was subscribed multiple times");

		dependents.trigger();
		assert_eq!(runs.get(), 2, "Effect wasn't triggered");
		assert_eq!(dependents.effect_count(), 1, "Effect subscription wasn't replaced on re-run");

		effect.destroy();
		assert_eq!(dependents.effect_count(), 0, "Effect wasn't unsubscribed on destroy");
	}

	#[test]
	fn untracked_gather() {
		let dependents = Dependents::new();

		let _effect = {
			let dependents = dependents.clone();
			Effect::new(move || untracked(|| dependents.gather()))
		};

		assert_eq!(dependents.effect_count(), 0, "Untracked gather subscribed an effect");
	}

	#[test]
	fn dropped_invalidators_pruned() {
		let signal = Signal::new(1_i32);
		for _ in 0..100 {
			let computed = Computed::new({
				let signal = signal.clone();
				move || signal.get()
			});
			assert_eq!(computed.get(), 1);
		}

		let computed = Computed::new({
			let signal = signal.clone();
			move || signal.get() + 1
		});
		assert_eq!(computed.get(), 2);

		let invalidators = signal.dependents().inner.invalidators.borrow();
		assert_eq!(invalidators.len(), 1, "Dropped computeds were kept as invalidators");
		assert!(invalidators.iter().all(|invalidator| invalidator.strong_count() != 0));
	}

	#[test]
	fn notify_external_value() {
		let value = Rc::new(Cell::new(1_i32));
		let dependents = Dependents::new();
		let computed = Computed::new({
			let (value, dependents) = (Rc::clone(&value), dependents.clone());
			move || {
				dependents.gather();
				value.get() * 2
			}
		});

		let seen = Rc::new(Cell::new(0_i32));
		let _effect = Effect::new({
			let (computed, seen) = (computed.clone(), Rc::clone(&seen));
			move || seen.set(computed.get())
		});
		assert_eq!(seen.get(), 2);

		dependents.invalidate();
		value.set(5);
		dependents.notify();
		assert_eq!(seen.get(), 10, "Effect didn't see the new value");
		assert!(computed.is_cached());
	}

	#[test]
	fn weak_dependents_empty() {
		let dependents = WeakDependents::new();
		assert_eq!(dependents.upgrade(), None);
	}

	#[test]
	fn weak_dependents_debug() {
		let dependents = Dependents::new();
		let weak = dependents.downgrade();
		assert!(format!("{weak:?}").contains("effects"), "Live dependents weren't formatted");

		drop(dependents);
		assert_eq!(format!("{weak:?}"), "WeakDependents { .. }");
	}

	#[test]
	fn dependents_upgrade() {
		let dependents = Dependents::new();
		let weak = dependents.downgrade();

		assert_eq!(Some(dependents), weak.upgrade());
	}
}
