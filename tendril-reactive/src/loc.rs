//! Location

// Imports
use core::fmt;
#[cfg(debug_assertions)]
use core::panic::Location;

/// Location
///
/// Only tracked with `debug_assertions`, otherwise
/// it's a zero-sized type.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct Loc {
	/// Inner location
	#[cfg(debug_assertions)]
	location: &'static Location<'static>,
}

impl Loc {
	/// Gets the caller's location
	#[track_caller]
	#[must_use]
	pub fn caller() -> Self {
		Self {
			#[cfg(debug_assertions)]
			location: Location::caller(),
		}
	}
}

#[duplicate::duplicate_item(
	Trait;
	[ fmt::Display ];
	[ fmt::Debug ];
)]
impl Trait for Loc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		#[cfg(debug_assertions)]
		{
			fmt::Display::fmt(&self.location, f)
		}

		#[cfg(not(debug_assertions))]
		f.pad("<optimized out>")
	}
}
