//! Built-in plugins
//!
//! The core plugin declares the canonical command surface (`package`,
//! `deploy`, `info`, `remove`) and the glue hooks between them; the AWS
//! common plugin is the provider seam, loaded only when the service file
//! names `aws` as its provider. Everything that actually talks to a
//! cloud API lives in provider plugins, not here.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::info;

use stratus_plugin::{
	CommandDef, HookBinding, HookContext, HookHandler, HookResult, OptionDef, Plugin, PluginLoader,
};

/// Loader preconfigured with the built-in plugin set.
pub fn default_loader() -> PluginLoader {
	let mut loader = PluginLoader::new();
	loader.register_core(|_| Arc::new(CorePlugin) as Arc<dyn Plugin>);
	loader.register_provider(|_| Arc::new(AwsCommonPlugin) as Arc<dyn Plugin>);
	loader
}

// =============================================================================
// Core plugin
// =============================================================================

/// Declares the provider-independent command surface.
pub struct CorePlugin;

impl Plugin for CorePlugin {
	fn name(&self) -> &str {
		"core"
	}

	fn commands(&self) -> IndexMap<String, CommandDef> {
		let stage = OptionDef::new("Stage of the service").with_shortcut("s");
		let region = OptionDef::new("Region of the service").with_shortcut("r");

		let mut commands = IndexMap::new();
		commands.insert(
			"package".to_string(),
			CommandDef::entrypoint("Package the service for deployment")
				.with_lifecycle_events([
					"cleanup",
					"initialize",
					"createDeploymentArtifacts",
					"compileFunctions",
					"compileEvents",
					"finalize",
				])
				.with_option("stage", stage.clone())
				.with_option("region", region.clone())
				.with_option(
					"package-path",
					OptionDef::new("Output path of the deployment package"),
				),
		);
		commands.insert(
			"deploy".to_string(),
			CommandDef::entrypoint("Deploy the service")
				.with_lifecycle_events(["initialize", "package", "deploy", "finalize"])
				.with_option("stage", stage.clone())
				.with_option("region", region.clone())
				.with_option("force", OptionDef::new("Force a full deployment"))
				.with_subcommand(
					"function",
					CommandDef::new("Deploy a single function")
						.with_lifecycle_events(["initialize", "packageFunction", "deploy"])
						.with_option(
							"function",
							OptionDef::new("Name of the function").with_shortcut("f").required(),
						),
				)
				.with_subcommand(
					"list",
					CommandDef::new("List deployed versions of the service")
						.with_lifecycle_events(["log"]),
				),
		);
		commands.insert(
			"info".to_string(),
			CommandDef::entrypoint("Display information about the service")
				.with_lifecycle_events(["info"])
				.with_option("stage", stage.clone())
				.with_option("region", region.clone()),
		);
		commands.insert(
			"remove".to_string(),
			CommandDef::entrypoint("Remove all deployed resources")
				.with_lifecycle_events(["initialize", "remove"])
				.with_option("stage", stage)
				.with_option("region", region),
		);
		commands
	}

	fn hooks(&self) -> Vec<HookBinding> {
		vec![
			HookBinding::new("package:initialize", Arc::new(RequireServiceHook)),
			HookBinding::new("deploy:package", Arc::new(PackageBeforeDeployHook)),
			HookBinding::new("info:info", Arc::new(ServiceInfoHook)),
		]
	}
}

/// Packaging and deployment need an actual service description.
struct RequireServiceHook;

#[async_trait]
impl HookHandler for RequireServiceHook {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		if !ctx.context().service().is_configured() {
			return Err(
				"no service configuration found; run this command in a directory containing a stratus.yml"
					.into(),
			);
		}
		Ok(())
	}
}

/// `deploy` packages the service by spawning the `package` lifecycle.
struct PackageBeforeDeployHook;

#[async_trait]
impl HookHandler for PackageBeforeDeployHook {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		if ctx.context().options().is_set("package-path") {
			// A prebuilt package was supplied; skip packaging.
			return Ok(());
		}
		ctx.spawn(&[String::from("package")]).await
	}
}

struct ServiceInfoHook;

#[async_trait]
impl HookHandler for ServiceInfoHook {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		let service = ctx.context().service();
		info!(target: "stratus::info", "service: {}", service.service);
		info!(target: "stratus::info", "provider: {}", service.provider.name);
		info!(target: "stratus::info", "functions: {}", service.functions.len());
		Ok(())
	}
}

// =============================================================================
// AWS common plugin
// =============================================================================

/// Provider seam: loaded only for services whose provider is `aws`.
///
/// The template compilers and the CloudFormation client hang off these
/// lifecycle events in the full provider plugins; here the plugin only
/// validates provider configuration and reports progress.
pub struct AwsCommonPlugin;

impl Plugin for AwsCommonPlugin {
	fn name(&self) -> &str {
		"aws-common"
	}

	fn provider(&self) -> Option<&str> {
		Some("aws")
	}

	fn hooks(&self) -> Vec<HookBinding> {
		vec![
			HookBinding::new("before:deploy:deploy", Arc::new(ValidateAwsConfigHook)),
			HookBinding::new("deploy:deploy", Arc::new(UpdateStackHook)),
		]
	}
}

struct ValidateAwsConfigHook;

#[async_trait]
impl HookHandler for ValidateAwsConfigHook {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		let context = ctx.context();
		let region = context
			.options()
			.get_str("region")
			.map(str::to_string)
			.or_else(|| {
				context
					.service()
					.provider
					.settings
					.get("region")
					.and_then(|value| value.as_str())
					.map(str::to_string)
			});
		match region {
			Some(region) => {
				info!(target: "stratus::aws", %region, "deploying");
				Ok(())
			}
			None => Err("no AWS region configured; set provider.region or pass --region".into()),
		}
	}
}

struct UpdateStackHook;

#[async_trait]
impl HookHandler for UpdateStackHook {
	async fn run(&self, ctx: &HookContext) -> HookResult {
		let service = ctx.context().service().service.clone();
		info!(target: "stratus::aws", service, "updating CloudFormation stack");
		Ok(())
	}
}
