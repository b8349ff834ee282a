//! Signal operators
//!
//! Read access to signals and computeds is expressed through
//! [`SignalWith`], with [`SignalGet`] and [`SignalGetCloned`]
//! implemented on top of it for every such type.

// Imports
use crate::context;

/// Signal with
pub trait SignalWith {
	/// Value type
	type Value: ?Sized;

	/// Uses the signal value, gathering the current context as a dependency.
	#[track_caller]
	fn with<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&Self::Value) -> O;

	/// Uses the signal value without gathering dependencies
	#[track_caller]
	fn with_untracked<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&Self::Value) -> O,
	{
		context::untracked(|| self.with(f))
	}
}

/// Signal get
pub trait SignalGet {
	/// Value type
	type Value;

	/// Gets the signal value, by copying it.
	#[track_caller]
	fn get(&self) -> Self::Value;

	/// Gets the signal value, by copying it, without gathering dependencies
	#[track_caller]
	fn get_untracked(&self) -> Self::Value;
}

impl<S> SignalGet for S
where
	S: SignalWith<Value: Copy>,
{
	type Value = S::Value;

	fn get(&self) -> Self::Value {
		self.with(|value| *value)
	}

	fn get_untracked(&self) -> Self::Value {
		self.with_untracked(|value| *value)
	}
}

/// Signal cloned
pub trait SignalGetCloned {
	/// Value type
	type Value;

	/// Gets the signal value, by cloning it.
	#[track_caller]
	fn get_cloned(&self) -> Self::Value;

	/// Gets the signal value, by cloning it, without gathering dependencies
	#[track_caller]
	fn get_cloned_untracked(&self) -> Self::Value;
}

impl<S> SignalGetCloned for S
where
	S: SignalWith<Value: Clone>,
{
	type Value = S::Value;

	fn get_cloned(&self) -> Self::Value {
		self.with(Clone::clone)
	}

	fn get_cloned_untracked(&self) -> Self::Value {
		self.with_untracked(Clone::clone)
	}
}
