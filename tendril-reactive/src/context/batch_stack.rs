//! Batch stack
//!
//! Each open [`Batch`](crate::Batch) pushes a scope onto this stack.
//! While any scope is open, triggered effects are queued into the
//! top scope instead of running.

// Imports
use {
	crate::WeakEffect,
	core::{cell::RefCell, cmp::Reverse},
	priority_queue::PriorityQueue,
};

/// Batch scope
struct Scope {
	/// Queued effects.
	///
	/// Prioritized by the order they were first queued in.
	queue: PriorityQueue<WeakEffect, Reverse<usize>>,
}

/// Inner type for the stack
struct Inner {
	/// Open scopes
	scopes: Vec<Scope>,

	/// Next index
	next: usize,
}

impl Inner {
	fn new() -> Self {
		Self {
			scopes: vec![],
			next:   0,
		}
	}
}

thread_local! {
	/// Batch stack
	static BATCH_STACK: RefCell<Inner> = RefCell::new(Inner::new());
}

/// Opens a new scope on the stack
pub(crate) fn push_scope() {
	BATCH_STACK.with_borrow_mut(|inner| {
		inner.scopes.push(Scope {
			queue: PriorityQueue::new(),
		});
	});
}

/// Closes the top scope of the stack.
///
/// If an enclosing scope exists, all queued effects are moved onto it,
/// keeping the position they were first queued in, and `None` is returned.
///
/// Otherwise, returns all queued effects, in the order they should be run.
pub(crate) fn pop_scope() -> Option<Vec<WeakEffect>> {
	BATCH_STACK.with_borrow_mut(|inner| {
		let scope = inner.scopes.pop().expect("Missing added batch scope");
		match inner.scopes.last_mut() {
			Some(parent) => {
				for (effect, idx) in scope.queue {
					parent.queue.push_increase(effect, idx);
				}
				None
			},
			None => {
				inner.next = 0;
				Some(scope.queue.into_sorted_iter().map(|(effect, _)| effect).collect())
			},
		}
	})
}

/// Queues an effect onto the top scope.
///
/// If the effect was already queued, it keeps it's previous position.
///
/// # Panics
/// Panics if no scope is open.
pub(crate) fn push(effect: WeakEffect) {
	BATCH_STACK.with_borrow_mut(|inner| {
		let idx = Reverse(inner.next);
		inner.next += 1;

		let scope = inner.scopes.last_mut().expect("No batch scope is open");
		scope.queue.push_increase(effect, idx);
	});
}

/// Returns if any batch scope is open
#[must_use]
pub fn is_active() -> bool {
	BATCH_STACK.with_borrow(|inner| !inner.scopes.is_empty())
}

/// Returns the number of open scopes
#[must_use]
pub fn depth() -> usize {
	BATCH_STACK.with_borrow(|inner| inner.scopes.len())
}

/// Returns the number of effects queued in the top scope
#[must_use]
pub fn queued() -> usize {
	BATCH_STACK.with_borrow(|inner| inner.scopes.last().map_or(0, |scope| scope.queue.len()))
}
