//! Effect
//!
//! An effect is a function that is re-run whenever
//! one of it's dependencies changes.
//!
//! Any signal or computed read while the effect runs becomes a
//! dependency. Before each re-run, all previous subscriptions are
//! torn down and any effects created by the previous run (it's
//! children) are destroyed, so dependencies always reflect the
//! latest run.
//!
//! Effects are reference counted. Signals only keep weak references
//! to them, so once every [`Effect`] handle is dropped (including the
//! one kept by a parent effect), the effect stops running.

// Modules
mod deps_gatherer;
mod weak;

// Exports
pub use self::{deps_gatherer::EffectDepsGatherer, weak::WeakEffect};

// Imports
use {
	crate::{WriteError, context::effect_stack, loc::Loc},
	core::{
		cell::{Cell, RefCell},
		fmt,
		hash::{Hash, Hasher},
		mem,
	},
	std::rc::Rc,
};

/// Effect options
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct EffectOptions {
	/// Whether the effect may write to signals while running
	pub allow_signal_writes: bool,
}

impl EffectOptions {
	/// Creates the default options
	#[must_use]
	pub const fn new() -> Self {
		Self {
			allow_signal_writes: false,
		}
	}

	/// Sets whether the effect may write to signals
	#[must_use]
	pub const fn allow_signal_writes(self, allow_signal_writes: bool) -> Self {
		Self {
			allow_signal_writes,
			..self
		}
	}
}

/// Teardown function
type Teardown = Box<dyn FnOnce()>;

/// Effect inner
#[derive(derive_more::Debug)]
struct Inner {
	/// Effect runner
	#[debug(skip)]
	run: Box<dyn Fn()>,

	/// Options
	options: EffectOptions,

	/// Teardowns for the current run
	#[debug(skip)]
	teardowns: RefCell<Vec<Teardown>>,

	/// Effects created during the current run
	#[debug(skip)]
	children: RefCell<Vec<Effect>>,

	/// Whether this effect was destroyed
	destroyed: Cell<bool>,

	/// Whether this effect is currently running
	running: Cell<bool>,

	/// Whether this effect was triggered while running
	pending: Cell<bool>,

	/// Where this effect was defined
	defined_loc: Loc,
}

impl Drop for Inner {
	fn drop(&mut self) {
		for teardown in mem::take(self.teardowns.get_mut()) {
			teardown();
		}

		for child in mem::take(self.children.get_mut()) {
			child.destroy();
		}
	}
}

/// Effect
pub struct Effect {
	/// Inner
	inner: Rc<Inner>,
}

impl Effect {
	/// Creates a new effect.
	///
	/// Runs the effect once to gather dependencies.
	///
	/// If created while another effect is running, it becomes a
	/// child of that effect, and will be destroyed once the
	/// parent re-runs or is destroyed.
	#[track_caller]
	pub fn new<F>(run: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self::new_with(run, EffectOptions::new())
	}

	/// Creates a new effect with options.
	///
	/// See [`Effect::new`] for details.
	#[track_caller]
	pub fn new_with<F>(run: F, options: EffectOptions) -> Self
	where
		F: Fn() + 'static,
	{
		let inner = Inner {
			run: Box::new(run),
			options,
			teardowns: RefCell::new(vec![]),
			children: RefCell::new(vec![]),
			destroyed: Cell::new(false),
			running: Cell::new(false),
			pending: Cell::new(false),
			defined_loc: Loc::caller(),
		};
		let effect = Self { inner: Rc::new(inner) };

		if let Some(parent) = effect_stack::running() {
			tracing::trace!(
				"Adding child effect\nParent: {}\nChild : {}",
				parent.defined_loc(),
				effect.defined_loc()
			);
			parent.inner.children.borrow_mut().push(effect.clone());
		}

		// And run it once to gather dependencies.
		effect.run();

		effect
	}

	/// Returns the options of this effect
	#[must_use]
	pub fn options(&self) -> EffectOptions {
		self.inner.options
	}

	/// Returns where this effect was defined
	#[must_use]
	pub fn defined_loc(&self) -> Loc {
		self.inner.defined_loc
	}

	/// Downgrades this effect
	#[must_use]
	pub fn downgrade(&self) -> WeakEffect {
		WeakEffect::from_inner(Rc::downgrade(&self.inner))
	}

	/// Returns a unique identifier to this effect.
	///
	/// Downgrading and cloning the effect will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner).addr()
	}

	/// Returns if this effect was destroyed
	#[must_use]
	pub fn is_destroyed(&self) -> bool {
		self.inner.destroyed.get()
	}

	/// Returns if this effect is inert.
	///
	/// An inert effect is one that will never be updated.
	/// In detail, an effect is inert if it was destroyed, or
	/// if no other [`Effect`]s or [`WeakEffect`]s exist that point to it.
	#[must_use]
	pub fn is_inert(&self) -> bool {
		self.is_destroyed() || (Rc::strong_count(&self.inner) == 1 && Rc::weak_count(&self.inner) == 0)
	}

	/// Returns the number of children created during the current run
	#[must_use]
	pub fn child_count(&self) -> usize {
		self.inner.children.borrow().len()
	}

	/// Runs the effect.
	///
	/// Tears down the previous run's subscriptions and children first.
	///
	/// If the effect is already running, it will instead be re-run once
	/// the current run finishes. Destroyed effects aren't run.
	#[track_caller]
	pub fn run(&self) {
		if self.is_destroyed() {
			return;
		}

		if self.inner.running.get() {
			tracing::trace!(
				"Effect triggered while running, deferring\nEffect   : {}\nExecution: {}",
				self.defined_loc(),
				Loc::caller()
			);
			self.inner.pending.set(true);
			return;
		}

		self.inner.pending.set(false);
		loop {
			self.cleanup();

			{
				self.inner.running.set(true);
				let _running = scopeguard::guard(&self.inner.running, |running| running.set(false));
				let _gatherer = EffectDepsGatherer::new(self);
				(self.inner.run)();
			}

			if !self.inner.pending.replace(false) || self.is_destroyed() {
				break;
			}
		}
	}

	/// Destroys this effect.
	///
	/// Unsubscribes it from all dependencies and destroys all of it's
	/// children. A destroyed effect will never run again.
	///
	/// Destroying an effect multiple times is a no-op.
	pub fn destroy(&self) {
		if !self.inner.destroyed.replace(true) {
			tracing::trace!("Destroying effect\nEffect: {}", self.defined_loc());
		}

		self.cleanup();
	}

	/// Adds a teardown to be run before the next run, or on destruction
	pub(crate) fn add_teardown<F>(&self, f: F)
	where
		F: FnOnce() + 'static,
	{
		self.inner.teardowns.borrow_mut().push(Box::new(f));
	}

	/// Runs all teardowns and destroys all children
	fn cleanup(&self) {
		let teardowns = mem::take(&mut *self.inner.teardowns.borrow_mut());
		for teardown in teardowns {
			teardown();
		}

		let children = mem::take(&mut *self.inner.children.borrow_mut());
		for child in children {
			child.destroy();
		}
	}
}

impl PartialEq for Effect {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Effect {}

impl Clone for Effect {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl Hash for Effect {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("id", &self.id())
			.field("inner", &self.inner)
			.finish()
	}
}

/// Returns the innermost running effect
#[must_use]
pub fn running() -> Option<Effect> {
	effect_stack::running()
}

/// Checks whether signals may currently be written to.
///
/// Writes are forbidden while running an effect, unless it
/// was created with [`EffectOptions::allow_signal_writes`].
#[track_caller]
pub fn check_write() -> Result<(), WriteError> {
	match self::running() {
		Some(effect) if !effect.options().allow_signal_writes => Err(WriteError::DuringEffect {
			effect_loc: effect.defined_loc(),
			write_loc:  Loc::caller(),
		}),
		_ => Ok(()),
	}
}
