//! Signal
//!
//! A read-write value that automatically updates
//! any dependents when changed.
//!
//! Writes are gated by an equality function: setting a value equal
//! to the current one doesn't notify anyone. [`Signal::mutate`] changes
//! the value in place, and since the change can't be compared against
//! the previous value, it always notifies.

// Modules
pub mod ops;

// Imports
use {
	crate::{Dependents, SignalWith, WriteError, effect},
	core::{cell::RefCell, fmt},
	std::rc::Rc,
};

/// Equality function
type EqualsFn<T> = Box<dyn Fn(&T, &T) -> bool>;

/// Inner
struct Inner<T> {
	/// Value
	value: RefCell<T>,

	/// Equality function
	equals: EqualsFn<T>,

	/// Dependents
	dependents: Dependents,
}

/// Signal
pub struct Signal<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Signal<T> {
	/// Creates a new signal, compared with [`PartialEq`]
	#[track_caller]
	pub fn new(value: T) -> Self
	where
		T: PartialEq,
	{
		Self::with_equals(value, T::eq)
	}

	/// Creates a new signal with a custom equality function.
	///
	/// `equals` receives the new value first and the current value second.
	#[track_caller]
	pub fn with_equals<E>(value: T, equals: E) -> Self
	where
		E: Fn(&T, &T) -> bool + 'static,
	{
		let inner = Inner {
			value:      RefCell::new(value),
			equals:     Box::new(equals),
			dependents: Dependents::new(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Creates a new signal that notifies on every write
	#[track_caller]
	pub fn never_equal(value: T) -> Self {
		Self::with_equals(value, |_, _| false)
	}

	/// Returns this signal's dependents
	#[must_use]
	pub fn dependents(&self) -> &Dependents {
		&self.inner.dependents
	}

	/// Returns the number of effects depending on this signal
	#[must_use]
	pub fn dependent_count(&self) -> usize {
		self.inner.dependents.effect_count()
	}

	/// Sets the signal value.
	///
	/// # Panics
	/// Panics if called while running an effect that doesn't allow signal writes.
	#[track_caller]
	pub fn set(&self, new_value: T) {
		if let Err(err) = self.try_set(new_value) {
			panic!("{err}");
		}
	}

	/// Sets the signal value.
	///
	/// If the new value is equal to the current one, nothing happens.
	/// Otherwise, all dependent computeds are invalidated and all dependent
	/// effects are run (or queued, if within a batch).
	#[track_caller]
	pub fn try_set(&self, new_value: T) -> Result<(), WriteError> {
		effect::check_write()?;

		let is_same = {
			let value = self
				.inner
				.value
				.try_borrow()
				.expect("Cannot update signal value while using it");
			(self.inner.equals)(&new_value, &value)
		};
		if is_same {
			return Ok(());
		}

		self.inner.dependents.invalidate();
		*self
			.inner
			.value
			.try_borrow_mut()
			.expect("Cannot update signal value while using it") = new_value;
		self.inner.dependents.trigger();

		Ok(())
	}

	/// Updates the signal value from the current one.
	///
	/// # Panics
	/// Panics if called while running an effect that doesn't allow signal writes.
	#[track_caller]
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&T) -> T,
	{
		if let Err(err) = self.try_update(f) {
			panic!("{err}");
		}
	}

	/// Updates the signal value from the current one.
	///
	/// Equivalent to setting the value returned by `f`.
	#[track_caller]
	pub fn try_update<F>(&self, f: F) -> Result<(), WriteError>
	where
		F: FnOnce(&T) -> T,
	{
		effect::check_write()?;

		let new_value = {
			let value = self
				.inner
				.value
				.try_borrow()
				.expect("Cannot update signal value while using it");
			f(&value)
		};
		self.try_set(new_value)
	}

	/// Mutates the signal value in place.
	///
	/// # Panics
	/// Panics if called while running an effect that doesn't allow signal writes.
	#[track_caller]
	pub fn mutate<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
	{
		if let Err(err) = self.try_mutate(f) {
			panic!("{err}");
		}
	}

	/// Mutates the signal value in place.
	///
	/// Dependents are always notified, the equality function isn't used.
	#[track_caller]
	pub fn try_mutate<F>(&self, f: F) -> Result<(), WriteError>
	where
		F: FnOnce(&mut T),
	{
		effect::check_write()?;

		self.inner.dependents.invalidate();
		{
			let mut value = self
				.inner
				.value
				.try_borrow_mut()
				.expect("Cannot update signal value while using it");
			f(&mut value);
		}
		self.inner.dependents.trigger();

		Ok(())
	}
}

impl<T: 'static> SignalWith for Signal<T> {
	type Value = T;

	#[track_caller]
	fn with<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&Self::Value) -> O,
	{
		self.inner.dependents.gather();

		let value = self
			.inner
			.value
			.try_borrow()
			.expect("Cannot use signal value while updating");
		f(&value)
	}
}

impl<T> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Signal");
		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value),
			Err(_) => s.field("value", &"<borrowed>"),
		};
		s.field("dependents", &self.inner.dependents).finish()
	}
}

#[cfg(test)]
mod tests {
	// Imports
	use {
		super::*,
		crate::{Effect, SignalGet, SignalGetCloned},
		core::cell::Cell,
	};

	#[test]
	fn get_set() {
		let signal = Signal::new(5_i32);
		assert_eq!(signal.get(), 5);

		signal.set(6);
		assert_eq!(signal.get(), 6);

		signal.update(|value| value * 2);
		assert_eq!(signal.get(), 12);
	}

	#[test]
	fn custom_equals() {
		// Only compares the length
		let signal = Signal::with_equals(String::from("abc"), |lhs: &String, rhs: &String| lhs.len() == rhs.len());
		let runs = Rc::new(Cell::new(0_usize));
		let _effect = Effect::new({
			let (signal, runs) = (signal.clone(), Rc::clone(&runs));
			move || {
				signal.with(|_| ());
				runs.set(runs.get() + 1);
			}
		});

		signal.set(String::from("xyz"));
		assert_eq!(runs.get(), 1, "Effect ran despite equal values");
		assert_eq!(signal.get_cloned(), "abc", "Equal value was written");

		signal.set(String::from("abcd"));
		assert_eq!(runs.get(), 2, "Effect didn't run for different values");
	}

	#[test]
	fn never_equal() {
		let signal = Signal::never_equal(1_i32);
		let runs = Rc::new(Cell::new(0_usize));
		let _effect = Effect::new({
			let (signal, runs) = (signal.clone(), Rc::clone(&runs));
			move || {
				signal.get();
				runs.set(runs.get() + 1);
			}
		});

		signal.set(1);
		assert_eq!(runs.get(), 2, "Effect didn't run on an equal write");
	}

	#[test]
	fn mutate_always_notifies() {
		let signal = Signal::new(vec![1_i32]);
		let seen = Rc::new(RefCell::new(vec![]));
		let _effect = Effect::new({
			let (signal, seen) = (signal.clone(), Rc::clone(&seen));
			move || seen.borrow_mut().push(signal.get_cloned())
		});

		signal.mutate(|value| value.push(2));
		signal.mutate(|_| ());
		assert_eq!(*seen.borrow(), [vec![1], vec![1, 2], vec![1, 2]]);
	}

	#[test]
	fn write_in_effect() {
		let signal = Signal::new(0_i32);
		let res = Rc::new(Cell::new(None));
		let _effect = Effect::new({
			let (signal, res) = (signal.clone(), Rc::clone(&res));
			move || res.set(Some(signal.try_set(1)))
		});

		assert!(
			matches!(res.get(), Some(Err(WriteError::DuringEffect { .. }))),
			"Write during effect didn't fail"
		);
		assert_eq!(signal.get(), 0, "Failed write changed the value");
	}
}
