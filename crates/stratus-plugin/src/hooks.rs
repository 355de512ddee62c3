//! Hook handler contract
//!
//! A hook handler is the unit of work the invoker schedules: an async
//! function registered by a plugin against a qualified hook name. The
//! failure cause is opaque to the engine; it travels inside
//! `EngineError::HandlerFailure` unchanged.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use stratus_core::{BoxError, ServiceContext};

/// Opaque failure signaled by a handler
pub type HookError = BoxError;

pub type HookResult = Result<(), HookError>;

/// Sub-lifecycle spawner, implemented by the invoker
///
/// Handlers reach nested lifecycles only through this trait, keeping the
/// engine free of special cases: a spawned command expands and runs like
/// any other, with internal commands allowed.
#[async_trait]
pub trait Spawner: Send + Sync {
	async fn spawn(&self, path: &[String], options: SpawnOptions) -> HookResult;
}

/// Options for [`Spawner::spawn`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnOptions {
	/// After the spawned lifecycle completes, unwind the rest of the
	/// calling command's lifecycle successfully.
	pub terminate_lifecycle_after_execution: bool,
}

/// Control signal that terminates the currently running hook chain
/// successfully, without executing the rest of the lifecycle.
///
/// Propagated by handlers like any other error; the invoker recognizes it
/// and converts it back into success.
#[derive(Debug)]
pub struct ChainTermination {
	path: Vec<String>,
}

impl ChainTermination {
	pub fn new(path: &[String]) -> Self {
		Self {
			path: path.to_vec(),
		}
	}

	pub fn path(&self) -> &[String] {
		&self.path
	}
}

impl fmt::Display for ChainTermination {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Terminating {}", self.path.join(":"))
	}
}

impl std::error::Error for ChainTermination {}

/// Everything a handler may touch during one invocation
///
/// The shared context is passed explicitly at every call site; handlers
/// never capture it implicitly.
#[derive(Clone)]
pub struct HookContext {
	context: Arc<ServiceContext>,
	spawner: Arc<dyn Spawner>,
	hook: String,
}

impl HookContext {
	pub fn new(context: Arc<ServiceContext>, spawner: Arc<dyn Spawner>, hook: String) -> Self {
		Self {
			context,
			spawner,
			hook,
		}
	}

	/// The shared per-invocation state.
	pub fn context(&self) -> &Arc<ServiceContext> {
		&self.context
	}

	/// Qualified name of the hook currently executing.
	pub fn hook_name(&self) -> &str {
		&self.hook
	}

	/// Start a nested sub-lifecycle and wait for it.
	pub async fn spawn(&self, path: &[String]) -> HookResult {
		self.spawner.spawn(path, SpawnOptions::default()).await
	}

	/// Start a nested sub-lifecycle, then terminate the calling chain.
	pub async fn spawn_and_terminate(&self, path: &[String]) -> HookResult {
		self.spawner
			.spawn(
				path,
				SpawnOptions {
					terminate_lifecycle_after_execution: true,
				},
			)
			.await
	}
}

impl fmt::Debug for HookContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookContext")
			.field("hook", &self.hook)
			.finish_non_exhaustive()
	}
}

/// A hook handler registered against a qualified hook name
#[async_trait]
pub trait HookHandler: Send + Sync {
	async fn run(&self, ctx: &HookContext) -> HookResult;
}

/// One `(qualified name, handler)` pair declared by a plugin
#[derive(Clone)]
pub struct HookBinding {
	pub event: String,
	pub handler: Arc<dyn HookHandler>,
}

impl HookBinding {
	pub fn new(event: impl Into<String>, handler: Arc<dyn HookHandler>) -> Self {
		Self {
			event: event.into(),
			handler,
		}
	}
}

impl fmt::Debug for HookBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookBinding")
			.field("event", &self.event)
			.finish_non_exhaustive()
	}
}

/// Adapter turning an async closure into a [`HookHandler`]
///
/// Mostly useful for small hooks and tests; substantial handlers are
/// usually their own types.
pub struct HookFn {
	f: Box<dyn Fn(HookContext) -> BoxFuture<'static, HookResult> + Send + Sync>,
}

impl HookFn {
	pub fn new<F>(f: F) -> Arc<Self>
	where
		F: Fn(HookContext) -> BoxFuture<'static, HookResult> + Send + Sync + 'static,
	{
		Arc::new(Self { f: Box::new(f) })
	}
}

#[async_trait]
impl HookHandler for HookFn {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		(self.f)(ctx.clone()).await
	}
}
