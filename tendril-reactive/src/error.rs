//! Errors

// Imports
use crate::loc::Loc;

/// Signal write error
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(thiserror::Error)]
pub enum WriteError {
	/// Written to while running an effect that doesn't allow signal writes
	#[error(
		"Cannot write to a signal while running an effect without `allow_signal_writes`\nEffect : \
		 {effect_loc}\nWritten: {write_loc}"
	)]
	DuringEffect {
		/// Where the running effect was defined
		effect_loc: Loc,

		/// Where the write happened
		write_loc: Loc,
	},
}
