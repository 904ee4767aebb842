//! CLI module for llm-consul
//!
//! Provides the command-line interface for the registration server.

pub mod plan;
pub mod serve;

use clap::{Parser, Subcommand};

/// llm-consul - Register model-serving backends with Consul
#[derive(Parser, Debug)]
#[command(name = "llm-consul")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    LLM_CONSUL_HOST                   Bind address (default: 0.0.0.0)
    LLM_CONSUL_PORT                   Listen port (default: bind_service_port)
    LLM_CONSUL_CONFIG_FILE            Consul settings file (legacy: CONSUL_CONFIG_FILE)
    LLM_CONSUL_MODEL_CONFIG_FILE      Model settings file (legacy: CONFIG_FILE)
    LLM_CONSUL_<KEY>                  Override a Consul settings key (e.g. LLM_CONSUL_IS_REGISTER)
    LLM_CONSUL_REGISTRY_TIMEOUT_SECS  Consul API timeout (default: 10)
    LLM_CONSUL_LOG_LEVEL              Log filter (default: info)
    LLM_CONSUL_LOG_FORMAT             text | json (default: text)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the configured models and serve the health endpoint
    Serve(serve::ServeArgs),
    /// Validate configuration and show what would be registered
    Plan(plan::PlanArgs),
}
