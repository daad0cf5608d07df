use clap::Parser;
use godesk_cli::cli::commands;
use godesk_cli::cli::errors::print_error_with_json;
use godesk_cli::cli::tracing_init::init_tracing;
use godesk_cli::cli::Cli;
use godesk_cli::config::manager::ConfigManager;

#[tokio::main]
async fn main() {
    // reqwest is built without a default TLS provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            print_error_with_json(&e, cli.json_errors);
            std::process::exit(1);
        }
    };

    // A broken config file must not hide the flag's own preference.
    let json_errors = cli.json_errors
        || manager
            .load_global_config()
            .is_ok_and(|config| config.agent_defaults.json_errors);

    if let Err(e) = commands::run(cli, &manager).await {
        print_error_with_json(&e, json_errors);
        std::process::exit(1);
    }
}
