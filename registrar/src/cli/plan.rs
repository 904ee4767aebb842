//! plan subcommand
//!
//! Validates the configuration and prints what `serve` would register,
//! without contacting Consul.

use crate::config::{self, LoadedConfig};
use anyhow::Context;
use clap::Args;
use llm_consul_common::config::RegistrationSettings;
use llm_consul_common::error::RegistrarResult;
use llm_consul_common::types::{ServiceDescriptor, ServiceRegistration};
use std::path::PathBuf;

/// Arguments for the plan subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Consul settings file
    #[arg(long)]
    pub consul_config: Option<PathBuf>,

    /// Model settings file
    #[arg(long)]
    pub model_config: Option<PathBuf>,
}

/// Registrations `serve` would send, with freshly generated instance ids.
pub fn planned_registrations(
    settings: &RegistrationSettings,
    descriptors: &[ServiceDescriptor],
) -> RegistrarResult<Vec<ServiceRegistration>> {
    // 1件でも不正なら何も出さない（serveと同じ判定）
    let aliases = descriptors
        .iter()
        .enumerate()
        .map(|(index, d)| d.require_alias(index))
        .collect::<RegistrarResult<Vec<_>>>()?;

    Ok(aliases
        .into_iter()
        .zip(descriptors)
        .map(|(alias, descriptor)| ServiceRegistration::derive(alias, descriptor, settings))
        .collect())
}

/// Execute the plan command
pub fn execute(args: &PlanArgs) -> anyhow::Result<()> {
    let consul_path = config::consul_config_path(args.consul_config.as_deref());
    let model_path = config::model_config_path(args.model_config.as_deref());
    let loaded = LoadedConfig::load(&consul_path, &model_path)
        .with_context(|| format!("failed to load {}", consul_path.display()))?;

    let registrations = planned_registrations(&loaded.settings, &loaded.descriptors)?;

    if !loaded.settings.enabled {
        println!("Registration disabled (is_register=false); nothing will be registered");
        return Ok(());
    }

    println!("Registry: {}", loaded.settings.registry_url());
    println!("SERVICE\tTAG\tROUTE\tHEALTH");
    for registration in &registrations {
        println!(
            "{}\t{}\t{}\t{}",
            registration.name,
            registration.tags.first().map(String::as_str).unwrap_or("-"),
            registration.tags.get(1).map(String::as_str).unwrap_or("-"),
            registration.check.http
        );
    }
    Ok(())
}
