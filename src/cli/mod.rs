pub mod commands;
pub mod errors;
pub mod render;
pub mod tracing_init;

use crate::duration::parse_duration_arg;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Output as JSON (default)
    Json,
    /// Output as YAML
    Yaml,
    /// Output as formatted table
    Table,
}

/// Content negotiation choices for `get`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptArg {
    Json,
    Csv,
    /// Spreadsheet (xlsx)
    Xlsx,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "godesk: browse and submit IFRC GO data from the command line",
    long_about = "godesk lists, fetches and submits records against the IFRC GO API and the\n\
                  GO risk API, with filtering, pagination, sorting, polling and retries.\n\n\
                  Examples:\n  \
                  godesk endpoints\n  \
                  godesk list appeal --filter atype=1 --page 2 --sort=-start_date\n  \
                  godesk get dref --var id=42\n  \
                  godesk submit field-report-create --data @report.json\n  \
                  godesk config set api_urls.go https://goadmin-stage.ifrc.org"
)]
pub struct Cli {
    /// Output all errors as structured JSON to stderr
    #[arg(long, global = true, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v for debug, -vv for trace)"
    )]
    pub verbosity: u8,

    /// Output format for response data
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "json",
        help = "Output format for response data"
    )]
    pub format: OutputFormat,

    /// Override the GO API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub go_url: Option<String>,

    /// Override the risk API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub risk_url: Option<String>,

    /// Override the configured UI language (ISO 639-1)
    #[arg(long, global = true, value_name = "CODE")]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the endpoints godesk knows about
    Endpoints,
    /// Fetch one page of a list endpoint
    List(ListArgs),
    /// Fetch a single resource or a non-paginated endpoint
    Get(GetArgs),
    /// Send a body to an endpoint with POST, PUT, PATCH or DELETE
    Submit(SubmitArgs),
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Flags shared by every command that issues a request
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Path variable for `{name}` placeholders, as name=value (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Retry retryable failures up to N more times with exponential backoff
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub retries: u32,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Endpoint short name (see `godesk endpoints`)
    pub endpoint: String,

    /// Filter field as name=value; JSON values such as 1, true or [5,6] are typed (repeatable)
    #[arg(long = "filter", short = 'f', value_name = "NAME=VALUE")]
    pub filters: Vec<String>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Rows per page (defaults to the `page_size` setting)
    #[arg(long, value_name = "N")]
    pub page_size: Option<u64>,

    /// Sort column: `name`, `-name`, `name:asc` or `name:desc`
    #[arg(long, value_name = "COLUMN", allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Keep refreshing at this interval (e.g. 30s, 5m)
    #[arg(long, value_name = "INTERVAL", value_parser = parse_duration_arg)]
    pub poll: Option<Duration>,

    /// Stop polling after this many results
    #[arg(long, value_name = "N", default_value_t = 1, requires = "poll")]
    pub poll_count: u32,

    /// Ask for English content even when another language is configured
    #[arg(long)]
    pub english: bool,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Endpoint short name (see `godesk endpoints`)
    pub endpoint: String,

    /// Query parameter as name=value (repeatable)
    #[arg(long = "query", short = 'q', value_name = "NAME=VALUE")]
    pub query: Vec<String>,

    /// Response content type to ask for
    #[arg(long, value_enum, default_value = "json")]
    pub accept: AcceptArg,

    /// Write the response body to this file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Ask for English content even when another language is configured
    #[arg(long)]
    pub english: bool,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Endpoint short name (see `godesk endpoints`)
    pub endpoint: String,

    /// HTTP method, defaults to the endpoint's own method
    #[arg(long, short = 'X', value_name = "METHOD")]
    pub method: Option<String>,

    /// JSON body, inline or as @path
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: Option<String>,

    /// Attach a file as name=path; implies --form (repeatable)
    #[arg(long = "file", value_name = "NAME=PATH")]
    pub files: Vec<String>,

    /// Send the body as multipart/form-data
    #[arg(long)]
    pub form: bool,

    /// Send the configured UI language instead of English
    #[arg(long)]
    pub current_language: bool,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the whole configuration
    Show,
    /// Print one setting
    Get {
        /// Setting key in dot-notation (see `config settings`)
        key: String,
    },
    /// Change one setting
    Set {
        key: String,
        value: String,
    },
    /// List every setting with its type, current value and default
    Settings,
}
