//! Context stacks
//!
//! Thread-local stacks that make "who is currently evaluating" and
//! "are we batching" ambient, so any signal read or write can consult
//! them without being passed anything explicitly.
//!
//! All pushes are paired with a guard whose `Drop` pops the entry, so the
//! top of each stack is always the innermost active scope, even when
//! unwinding out of a panicking effect or computed.
//!
//! Tracking can be suspended with [`untracked`], which pushes a barrier
//! onto both the effect and computed stacks.

// Modules
pub mod batch_stack;
pub mod computed_stack;
pub mod effect_stack;

/// Returns if any reads would currently be tracked
#[must_use]
pub fn is_tracking() -> bool {
	effect_stack::tracking().is_some() || computed_stack::is_tracking()
}

/// Runs `f` without gathering any dependencies.
///
/// Effects created inside of `f` still track their own dependencies,
/// and are still owned by the running effect, if any.
pub fn untracked<F, O>(f: F) -> O
where
	F: FnOnce() -> O,
{
	let _barrier = UntrackedBarrier::new();
	f()
}

/// Untracked barrier.
///
/// While alive, reads won't be tracked by any enclosing
/// effects or computeds.
struct UntrackedBarrier(());

impl UntrackedBarrier {
	/// Pushes the barrier onto both stacks
	fn new() -> Self {
		effect_stack::push(None);
		computed_stack::push(None);

		Self(())
	}
}

impl Drop for UntrackedBarrier {
	fn drop(&mut self) {
		computed_stack::pop();
		effect_stack::pop();
	}
}
