//! Batch
//!
//! A batch defers running any triggered effects until it's closed,
//! running each of them at most once, in the order they were first
//! triggered. Computed caches are still invalidated immediately.
//!
//! Batches may be nested. Closing an inner batch hands it's queued
//! effects to the enclosing one, so only the outermost batch runs them.

// Imports
use {
	crate::{WeakEffect, context::batch_stack},
	std::thread,
};

/// Batch.
///
/// While this type is alive, triggered effects are queued instead of run.
///
/// If the outermost batch is dropped while panicking, it's queued effects
/// are discarded without running. Any writes made during the batch still
/// happened, so if the panic is caught, those effects stay stale until
/// they're next triggered.
#[must_use = "The batch is closed, and it's effects run, once this value is dropped"]
pub struct Batch(());

impl Batch {
	/// Opens a new batch
	pub fn new() -> Self {
		batch_stack::push_scope();
		tracing::trace!("Opened batch (depth {})", batch_stack::depth());

		Self(())
	}
}

impl Default for Batch {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Batch {
	fn drop(&mut self) {
		// If we weren't the outermost batch, our effects were handed over
		let Some(effects) = batch_stack::pop_scope() else {
			return;
		};

		// Note: Running effects while unwinding could panic again
		//       and abort, so we just drop them.
		if thread::panicking() {
			tracing::trace!("Discarding {} effect(s) from batch while panicking", effects.len());
			return;
		}

		tracing::trace!("Running {} effect(s) from batch", effects.len());
		for effect in effects.iter().filter_map(WeakEffect::upgrade) {
			effect.run();
		}
	}
}

/// Runs `f` within a batch.
///
/// Once `f` returns, every effect triggered during it is run exactly once,
/// unless another batch was already open.
pub fn run_batched<F, O>(f: F) -> O
where
	F: FnOnce() -> O,
{
	let batch = Batch::new();
	let output = f();
	drop(batch);

	output
}
