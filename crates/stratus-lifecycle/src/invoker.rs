//! Sequential hook invocation
//!
//! One CLI invocation is a flat, totally ordered sequence of hook
//! executions: exactly one handler runs at a time, each awaited to
//! completion before the next starts, across the whole expanded name
//! list. The first failure aborts the entire run. There is no rollback,
//! no compensation and no retry in the engine; all of that is ordinary
//! hooks registered by provider plugins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use stratus_core::{EngineError, EngineResult, ServiceContext};
use stratus_plugin::{ChainTermination, CommandKind, HookContext, HookResult, SpawnOptions, Spawner};

use crate::expand::expand;
use crate::registry::HookRegistry;
use crate::tree::{CommandNode, CommandTree};

/// Outcome of running the handlers of one qualified name
enum Flow {
	Continue,
	/// A handler signaled chain termination; stop the lifecycle
	/// successfully without running the remaining names.
	Terminate,
}

/// Executes expanded hook sequences against the registry
///
/// Cheap to clone: all state is shared. A clone is handed to every
/// handler (as its [`Spawner`]) so nested lifecycles run through the same
/// tree, registry and context.
#[derive(Clone)]
pub struct Invoker {
	tree: Arc<CommandTree>,
	registry: Arc<HookRegistry>,
	ctx: Arc<ServiceContext>,
}

impl Invoker {
	pub fn new(tree: Arc<CommandTree>, registry: Arc<HookRegistry>, ctx: Arc<ServiceContext>) -> Self {
		Self {
			tree,
			registry,
			ctx,
		}
	}

	pub fn tree(&self) -> &CommandTree {
		&self.tree
	}

	pub fn context(&self) -> &Arc<ServiceContext> {
		&self.ctx
	}

	/// Run a public command: `initialize` hooks, the command lifecycle,
	/// then `finalize` hooks on success or `error` hooks (best-effort)
	/// on failure.
	pub async fn run(&self, path: &[String]) -> EngineResult<()> {
		self.run_hook_chain("initialize").await?;

		match self.invoke(path, false).await {
			Ok(()) => {
				self.run_hook_chain("finalize").await?;
				Ok(())
			}
			Err(EngineError::Cancelled) => Err(EngineError::Cancelled),
			Err(err) => {
				self.run_error_hooks().await;
				Err(err)
			}
		}
	}

	/// Run one command's lifecycle.
	///
	/// Internal commands resolve only when `allow_internal` is set;
	/// container commands list their subcommands and succeed without
	/// running anything.
	pub async fn invoke(&self, path: &[String], allow_internal: bool) -> EngineResult<()> {
		let node = self.tree.get(path, allow_internal)?;
		if node.kind == CommandKind::Container {
			self.render_container(node);
			return Ok(());
		}

		self.normalize_options(node);

		let names = expand(node);
		let registered: usize = names
			.iter()
			.map(|name| self.registry.handlers_for(name).len())
			.sum();
		debug!(
			target: "lifecycle::command::invoke",
			command = %node.key(),
			hooks = registered,
			"invoke"
		);

		for name in &names {
			if self.ctx.cancel_token().is_cancelled() {
				return Err(EngineError::Cancelled);
			}
			if let Flow::Terminate = self.run_hooks(name).await? {
				debug!(target: "lifecycle::command::invoke", command = %node.key(), "terminate");
				return Ok(());
			}
		}
		Ok(())
	}

	/// Run the handlers registered for one qualified name, in
	/// registration order, awaiting each before the next.
	async fn run_hooks(&self, name: &str) -> EngineResult<Flow> {
		for hook in self.registry.handlers_for(name) {
			if self.ctx.cancel_token().is_cancelled() {
				return Err(EngineError::Cancelled);
			}
			let hook_ctx = HookContext::new(
				Arc::clone(&self.ctx),
				Arc::new(self.clone()),
				name.to_string(),
			);
			debug!(target: "lifecycle::hook::invoke", hook = name, plugin = %hook.plugin, "run");
			if let Err(err) = hook.handler.run(&hook_ctx).await {
				if err.downcast_ref::<ChainTermination>().is_some() {
					return Ok(Flow::Terminate);
				}
				// Errors escaping a nested spawn are already annotated;
				// pass them through unchanged.
				return Err(match err.downcast::<EngineError>() {
					Ok(engine) => *engine,
					Err(source) => EngineError::HandlerFailure {
						hook: name.to_string(),
						plugin: hook.plugin.clone(),
						source,
					},
				});
			}
		}
		Ok(Flow::Continue)
	}

	async fn run_hook_chain(&self, name: &str) -> EngineResult<()> {
		self.run_hooks(name).await.map(|_| ())
	}

	/// `error` hooks run after a failed lifecycle so provider plugins can
	/// compensate (for example delete a half-created stack). Their own
	/// failures are logged and never mask the original error.
	async fn run_error_hooks(&self) {
		for hook in self.registry.handlers_for("error") {
			let hook_ctx = HookContext::new(
				Arc::clone(&self.ctx),
				Arc::new(self.clone()),
				"error".to_string(),
			);
			if let Err(err) = hook.handler.run(&hook_ctx).await {
				warn!(
					target: "lifecycle::hook::invoke",
					plugin = %hook.plugin,
					"the \"error\" hook crashed: {err}"
				);
			}
		}
	}

	/// Fold declared option shortcuts into their long names, then assign
	/// declared defaults for options the user did not pass.
	fn normalize_options(&self, node: &CommandNode) {
		let mut options = self.ctx.options_mut();
		for (name, def) in &node.options {
			if let Some(shortcut) = &def.shortcut {
				options.promote_shortcut(shortcut, name);
			}
		}
		for (name, def) in &node.options {
			if let Some(default) = &def.default {
				options.insert_default(name, default);
			}
		}
	}

	fn render_container(&self, node: &CommandNode) {
		info!(
			target: "lifecycle::command::invoke",
			command = %node.display_path(),
			"container command; available subcommands:"
		);
		for sub in node.subcommands.values() {
			if sub.kind != CommandKind::Internal {
				info!(target: "lifecycle::command::invoke", "  {} - {}", sub.display_path(), sub.usage);
			}
		}
	}
}

#[async_trait]
impl Spawner for Invoker {
	async fn spawn(&self, path: &[String], options: SpawnOptions) -> HookResult {
		self.invoke(path, true)
			.await
			.map_err(|err| Box::new(err) as stratus_plugin::HookError)?;
		if options.terminate_lifecycle_after_execution {
			return Err(Box::new(ChainTermination::new(path)));
		}
		Ok(())
	}
}
