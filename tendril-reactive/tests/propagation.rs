//! Propagation tests

// Imports
use {
	core::cell::Cell,
	std::rc::Rc,
	tendril_reactive::{Computed, Effect, Signal, SignalGet, SignalGetCloned, SignalWith},
};

/// Counts the number of times a closure was called
#[derive(Clone, Default)]
struct Counter(Rc<Cell<usize>>);

impl Counter {
	fn inc(&self) {
		self.0.set(self.0.get() + 1);
	}

	fn get(&self) -> usize {
		self.0.get()
	}
}

#[test]
fn chain_runs_once() {
	tendril_logger::init();

	// a -> double -> quad -> effect, with the effect also reading `a` directly
	let a = Signal::new(1_i32);
	let double = Computed::new({
		let a = a.clone();
		move || a.get() * 2
	});
	let quad = Computed::new({
		let double = double.clone();
		move || double.get() * 2
	});

	let runs = Counter::default();
	let seen = Rc::new(Cell::new(0_i32));
	let _effect = Effect::new({
		let (a, quad, runs, seen) = (a.clone(), quad.clone(), runs.clone(), Rc::clone(&seen));
		move || {
			runs.inc();
			seen.set(a.get() + quad.get());
		}
	});
	assert_eq!(seen.get(), 5);

	a.set(2);
	assert_eq!(runs.get(), 2, "Effect should run exactly once per write");
	assert_eq!(seen.get(), 10, "Effect saw a stale computed");
	assert_eq!(a.dependent_count(), 1, "Effect was subscribed more than once");
}

#[test]
fn memoized() {
	let a = Signal::new(1_i32);
	let evals = Counter::default();
	let computed = Computed::new({
		let (a, evals) = (a.clone(), evals.clone());
		move || {
			evals.inc();
			a.get() + 1
		}
	});

	assert_eq!(computed.get(), 2);
	assert_eq!(computed.get(), 2);
	assert_eq!(evals.get(), 1, "Computed was evaluated twice without changes");

	// Invalidation doesn't evaluate eagerly
	a.set(5);
	assert!(!computed.is_cached());
	assert_eq!(evals.get(), 1, "Computed was evaluated before being read");
	assert_eq!(computed.get(), 6);
	assert_eq!(evals.get(), 2);
}

#[test]
fn equal_write_short_circuits() {
	let a = Signal::new(String::from("hello"));
	let evals = Counter::default();
	let computed = Computed::new({
		let (a, evals) = (a.clone(), evals.clone());
		move || {
			evals.inc();
			a.with(String::len)
		}
	});

	let runs = Counter::default();
	let _effect = Effect::new({
		let (computed, runs) = (computed.clone(), runs.clone());
		move || {
			runs.inc();
			computed.get();
		}
	});

	a.set(String::from("hello"));
	assert!(computed.is_cached(), "Equal write invalidated the computed");
	assert_eq!(runs.get(), 1, "Equal write triggered the effect");
	assert_eq!(evals.get(), 1);

	a.set(String::from("world"));
	assert_eq!(runs.get(), 2);
	assert_eq!(a.get_cloned(), "world");
}

#[test]
fn dynamic_dependencies() {
	let cond = Signal::new(true);
	let a = Signal::new(1_i32);
	let b = Signal::new(2_i32);
	let runs = Counter::default();
	let _effect = Effect::new({
		let (cond, a, b, runs) = (cond.clone(), a.clone(), b.clone(), runs.clone());
		move || {
			runs.inc();
			match cond.get() {
				true => a.get(),
				false => b.get(),
			};
		}
	});

	b.set(3);
	assert_eq!(runs.get(), 1, "Effect depended on an unread signal");

	cond.set(false);
	assert_eq!(runs.get(), 2);
	assert_eq!(a.dependent_count(), 0, "Stale dependency was kept");

	a.set(5);
	assert_eq!(runs.get(), 2, "Effect ran for a stale dependency");
	b.set(4);
	assert_eq!(runs.get(), 3);
}

#[test]
fn untracked_reads() {
	let a = Signal::new(1_i32);
	let b = Signal::new(1_i32);
	let runs = Counter::default();
	let _effect = Effect::new({
		let (a, b, runs) = (a.clone(), b.clone(), runs.clone());
		move || {
			runs.inc();
			a.get();
			b.get_untracked();
		}
	});

	b.set(2);
	assert_eq!(runs.get(), 1, "Untracked read was tracked");
	assert_eq!(b.dependent_count(), 0);

	a.set(2);
	assert_eq!(runs.get(), 2);
}

#[test]
fn nested_cleanup_bounded() {
	let outer = Signal::new(0_usize);
	let inner = Signal::new(0_i32);
	let parent = Effect::new({
		let (outer, inner) = (outer.clone(), inner.clone());
		move || {
			outer.get();
			let inner = inner.clone();
			let _child = Effect::new(move || _ = inner.get());
		}
	});

	for value in 1..=100 {
		outer.set(value);
		assert_eq!(inner.dependent_count(), 1, "Child subscriptions accumulated after {value} re-runs");
	}
	assert_eq!(parent.child_count(), 1);

	parent.destroy();
	assert_eq!(inner.dependent_count(), 0, "Child wasn't destroyed with it's parent");
	assert_eq!(outer.dependent_count(), 0);
}
