//! Cooperative cancellation
//!
//! Cancellation is observed by the invoker between handler invocations,
//! never mid-handler: an in-flight handler runs to completion, since
//! terminating a cloud API call half-way risks orphaned remote state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag
///
/// Clones observe the same flag. Setting it is idempotent and sticky for
/// the remainder of the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	cancelled: Arc<AtomicBool>,
}

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	/// Request cancellation. Safe to call from a signal handler thread.
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clones_share_the_flag() {
		let token = CancelToken::new();
		let observer = token.clone();
		assert!(!observer.is_cancelled());

		token.cancel();
		assert!(observer.is_cancelled());
	}
}
