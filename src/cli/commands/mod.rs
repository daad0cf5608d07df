//! CLI command handlers extracted from main.rs.
//!
//! Each submodule handles a top-level command variant from [`Commands`]. The
//! request commands play the part of a list or detail view: they build a
//! descriptor (through a filter controller for lists), bind it, and render
//! whatever state the binding settles in.

// These modules contain CLI command handlers, not public library API.
#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod fetch;
#[allow(clippy::missing_errors_doc)]
pub mod submit;

use super::{render, Cli, Commands, OutputFormat};
use crate::api::{self, EndpointInfo};
use crate::binding::{BackoffPolicy, BindingOptions, Phase, RequestState};
use crate::config::manager::ConfigManager;
use crate::config::models::GlobalConfig;
use crate::config::url_resolver::BaseUrlResolver;
use crate::context::RequestContext;
use crate::error::Error;
use crate::fs::OsFileSystem;
use crate::request::transport::{create_client, TimeoutConfig};
use crate::request::{RequestDescriptor, ResponseBody, Transport};
use serde_json::Value;
use tracing::warn;

/// Everything a request command needs, resolved once per invocation
pub struct Session {
    pub transport: Transport,
    pub config: GlobalConfig,
    pub format: OutputFormat,
}

impl Session {
    /// Resolves base URLs, the session context and the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the language is invalid or the client cannot be built.
    pub fn new(cli: &Cli, config: GlobalConfig) -> Result<Self, Error> {
        let bases = BaseUrlResolver::new()
            .with_global_config(&config)
            .resolve_all(cli.go_url.as_deref(), cli.risk_url.as_deref());
        let mut context = RequestContext::from_config(&config)?;
        if let Some(language) = &cli.language {
            context = context.with_language(language.parse()?);
        }
        let client = create_client(&TimeoutConfig::from_secs(config.default_timeout_secs))?;
        Ok(Self {
            transport: Transport::new(client, bases, context),
            config,
            format: cli.format,
        })
    }
}

/// Dispatches a parsed command line.
///
/// # Errors
///
/// Returns whatever the selected command fails with.
pub async fn run(cli: Cli, manager: &ConfigManager<OsFileSystem>) -> Result<(), Error> {
    match &cli.command {
        Commands::Endpoints => {
            println!("{}", render::render_endpoints(api::ENDPOINTS, cli.format)?);
            Ok(())
        }
        Commands::Config { command } => config::execute(command, manager, cli.format),
        Commands::List(args) => {
            let session = Session::new(&cli, manager.load_global_config()?)?;
            fetch::list(args, &session).await
        }
        Commands::Get(args) => {
            let session = Session::new(&cli, manager.load_global_config()?)?;
            fetch::get(args, &session).await
        }
        Commands::Submit(args) => {
            let session = Session::new(&cli, manager.load_global_config()?)?;
            submit::submit(args, &session).await
        }
    }
}

/// Splits `name=value`.
///
/// # Errors
///
/// Returns an error naming `what` if there is no `=` or the name is empty.
pub fn parse_pair(raw: &str, what: &str) -> Result<(String, String), Error> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::invalid_setting(what, raw, "expected NAME=VALUE")),
    }
}

/// Command-line values are JSON when they parse as JSON, strings otherwise.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Fills path variables from `--var` pairs.
///
/// A placeholder with no value puts the descriptor on skip, so nothing is
/// sent until the caller supplies it.
///
/// # Errors
///
/// Returns an error if a `--var` is malformed.
pub fn with_path_variables(
    mut descriptor: RequestDescriptor,
    info: &EndpointInfo,
    vars: &[String],
) -> Result<RequestDescriptor, Error> {
    for raw in vars {
        let (name, value) = parse_pair(raw, "var")?;
        descriptor = descriptor.with_path_variable(name, value);
    }
    let missing = missing_variables(&descriptor, info);
    if !missing.is_empty() {
        warn!("holding request to {}: missing path variables {missing:?}", info.path);
        descriptor = descriptor.skip(true);
    }
    Ok(descriptor)
}

fn missing_variables(descriptor: &RequestDescriptor, info: &EndpointInfo) -> Vec<&'static str> {
    info.placeholders()
        .into_iter()
        .filter(|name| !descriptor.path_variables.contains_key(*name))
        .collect()
}

/// Retry policy for `--retries N`: up to N extra attempts with backoff.
#[must_use]
pub fn binding_options<T: ResponseBody>(retries: u32) -> BindingOptions<T> {
    let options = BindingOptions::default();
    if retries == 0 {
        return options;
    }
    options.with_retry(
        BackoffPolicy::default()
            .with_max_attempts(retries.saturating_add(1))
            .into_strategy(),
    )
}

/// Turns a settled state into the response or the error to report.
///
/// # Errors
///
/// - the normalized request error on failure
/// - a login redirect error if the server asked for authentication
/// - a configuration error if the request never ran because it was skipped
pub fn into_response<T>(
    state: RequestState<T>,
    info: &EndpointInfo,
    descriptor: &RequestDescriptor,
) -> Result<T, Error> {
    match state.phase {
        Phase::Success => state
            .response
            .ok_or_else(|| Error::config("request succeeded without a response")),
        Phase::Failure => Err(state
            .error
            .map_or_else(|| Error::config("request failed without an error"), Error::from)),
        Phase::LoginRequired { url } => Err(Error::LoginRedirect { url }),
        Phase::Idle | Phase::Pending => Err(Error::config(format!(
            "'{}' needs path variables {:?}; pass them with --var NAME=VALUE",
            info.name,
            missing_variables(descriptor, info)
        ))),
    }
}
