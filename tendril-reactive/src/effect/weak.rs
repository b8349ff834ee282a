//! Weak effect

use {
	super::{Effect, Inner},
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::Weak,
};

/// Weak effect
///
/// Used to break ownership between a signal and it's subscribers
pub struct WeakEffect {
	/// Inner
	inner: Weak<Inner>,
}

impl WeakEffect {
	/// Creates an empty weak effect
	#[must_use]
	pub const fn new() -> Self {
		Self { inner: Weak::new() }
	}

	/// Creates a weak effect from it's inner
	pub(super) const fn from_inner(inner: Weak<Inner>) -> Self {
		Self { inner }
	}

	/// Upgrades this effect
	#[must_use]
	pub fn upgrade(&self) -> Option<Effect> {
		self.inner.upgrade().map(|inner| Effect { inner })
	}

	/// Returns a unique identifier to this effect.
	///
	/// Upgrading and cloning the effect will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Weak::as_ptr(&self.inner).addr()
	}

	/// Runs this effect, if it exists.
	///
	/// Returns if the effect still existed
	#[track_caller]
	#[expect(
		clippy::must_use_candidate,
		reason = "The user may not care whether we actually ran or not"
	)]
	pub fn try_run(&self) -> bool {
		// Try to upgrade, else return that it was missing
		let Some(effect) = self.upgrade() else {
			return false;
		};

		effect.run();
		true
	}
}

impl Default for WeakEffect {
	fn default() -> Self {
		Self::new()
	}
}

impl PartialEq for WeakEffect {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for WeakEffect {}

impl Clone for WeakEffect {
	fn clone(&self) -> Self {
		Self {
			inner: Weak::clone(&self.inner),
		}
	}
}

impl Hash for WeakEffect {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for WeakEffect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.upgrade() {
			Some(effect) => f.debug_tuple("WeakEffect").field(&effect).finish(),
			None => f.debug_struct("WeakEffect").finish_non_exhaustive(),
		}
	}
}
