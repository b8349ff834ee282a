//! Fine-grained reactivity for `tendril`
//!
//! Provides three primitives, which maintain an implicit dependency
//! graph between each other:
//!
//! - [`Signal`]: A mutable value that notifies it's dependents when changed.
//! - [`Computed`]: A lazily evaluated, cached, function of other signals.
//! - [`Effect`]: A function that is re-run whenever anything it read changes.
//!
//! Dependencies are discovered by tracking which signals are read while a
//! computed or effect runs, using the thread-local [`context`] stacks.
//! Multiple writes may be coalesced with [`run_batched`].
//!
//! Everything here is single-threaded: signals, computeds and effects are
//! neither `Send` nor `Sync`, and each thread has it's own context stacks.

// Modules
pub mod batch;
pub mod computed;
pub mod context;
pub mod dependents;
pub mod effect;
pub mod error;
pub mod loc;
pub mod signal;

// Exports
pub use self::{
	batch::{Batch, run_batched},
	computed::Computed,
	context::untracked,
	dependents::{Dependents, WeakDependents},
	effect::{Effect, EffectOptions, WeakEffect},
	error::WriteError,
	loc::Loc,
	signal::{
		Signal,
		ops::{SignalGet, SignalGetCloned, SignalWith},
	},
};
