//! Computed stack

// Imports
use {
	crate::computed::ComputedNode,
	core::cell::RefCell,
	std::rc::Rc,
};

thread_local! {
	/// Computed stack
	///
	/// `None` entries are barriers pushed by [`untracked`](super::untracked)
	static COMPUTED_STACK: RefCell<Vec<Option<Rc<dyn ComputedNode>>>> = const { RefCell::new(Vec::new()) };
}

/// Pushes a computed (or a barrier) to the stack.
pub(crate) fn push(computed: Option<Rc<dyn ComputedNode>>) {
	COMPUTED_STACK.with_borrow_mut(|stack| stack.push(computed));
}

/// Pops a computed from the stack
pub(crate) fn pop() {
	let computed = COMPUTED_STACK.with_borrow_mut(Vec::pop).expect("Missing added computed");
	drop(computed);
}

/// Returns all computeds currently being evaluated that reads should be tracked by.
///
/// These are all entries above the topmost barrier, innermost first.
pub(crate) fn tracking() -> Vec<Rc<dyn ComputedNode>> {
	COMPUTED_STACK.with_borrow(|stack| stack.iter().rev().map_while(Option::clone).collect())
}

/// Returns if any computed would track reads
#[must_use]
pub fn is_tracking() -> bool {
	COMPUTED_STACK.with_borrow(|stack| stack.last().is_some_and(Option::is_some))
}

/// Returns the depth of the stack, including barriers
#[must_use]
pub fn depth() -> usize {
	COMPUTED_STACK.with_borrow(Vec::len)
}
