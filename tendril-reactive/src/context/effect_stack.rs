//! Effect stack

// Imports
use {crate::Effect, core::cell::RefCell};

thread_local! {
	/// Effect stack
	///
	/// `None` entries are barriers pushed by [`untracked`](super::untracked)
	static EFFECT_STACK: RefCell<Vec<Option<Effect>>> = const { RefCell::new(Vec::new()) };
}

/// Pushes an effect (or a barrier) to the stack.
pub(crate) fn push(effect: Option<Effect>) {
	EFFECT_STACK.with_borrow_mut(|effects| effects.push(effect));
}

/// Pops an effect from the stack
pub(crate) fn pop() {
	// Note: We drop the effect outside of the borrow, in case
	//       we were the last owner and it gets torn down.
	let effect = EFFECT_STACK.with_borrow_mut(Vec::pop).expect("Missing added effect");
	drop(effect);
}

/// Returns the effect that reads should be tracked by.
///
/// This is the top of the stack, unless tracking is suspended.
#[must_use]
pub fn tracking() -> Option<Effect> {
	EFFECT_STACK.with_borrow(|effects| effects.last().cloned().flatten())
}

/// Returns the innermost running effect, regardless of tracking.
#[must_use]
pub fn running() -> Option<Effect> {
	EFFECT_STACK.with_borrow(|effects| effects.iter().rev().find_map(Option::clone))
}

/// Returns the depth of the stack, including barriers
#[must_use]
pub fn depth() -> usize {
	EFFECT_STACK.with_borrow(Vec::len)
}
