//! Shared service context
//!
//! One [`ServiceContext`] exists per CLI invocation. It owns the mutable
//! service description and the resolved options, and is handed by `Arc` to
//! every plugin constructor and every hook invocation, so every mutation
//! point is visible at the call site.
//!
//! Locking discipline: handlers execute strictly one at a time, so the
//! locks are uncontended by construction. The engine itself never holds a
//! guard across an `.await`; handlers must not either.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cancel::CancelToken;
use crate::options::RunOptions;
use crate::service::ServiceDescription;

/// Shared, in-process state for one CLI invocation
#[derive(Debug, Default)]
pub struct ServiceContext {
	service: RwLock<ServiceDescription>,
	options: RwLock<RunOptions>,
	cancel: CancelToken,
}

impl ServiceContext {
	pub fn new(service: ServiceDescription, options: RunOptions) -> Self {
		Self {
			service: RwLock::new(service),
			options: RwLock::new(options),
			cancel: CancelToken::new(),
		}
	}

	/// Read access to the service description.
	pub fn service(&self) -> RwLockReadGuard<'_, ServiceDescription> {
		self.service.read()
	}

	/// Exclusive access to the service description.
	///
	/// Only the currently executing handler may mutate; do not hold the
	/// guard across an `.await`.
	pub fn service_mut(&self) -> RwLockWriteGuard<'_, ServiceDescription> {
		self.service.write()
	}

	pub fn options(&self) -> RwLockReadGuard<'_, RunOptions> {
		self.options.read()
	}

	pub fn options_mut(&self) -> RwLockWriteGuard<'_, RunOptions> {
		self.options.write()
	}

	/// Name of the active provider, empty when none is configured.
	pub fn provider_name(&self) -> String {
		self.service.read().provider.name.clone()
	}

	pub fn cancel_token(&self) -> &CancelToken {
		&self.cancel
	}
}
