//! AnySet CLI - validate, compile and run dataset queries
//!
//! Usage:
//!   anyset [--config <anyset.toml>] list
//!   anyset compile <dataset-key> <request.json|-> [--dialect <dialect>] [--output <format>]
//!   anyset validate <dataset-key> <request.json|->
//!   anyset query <dataset-key> <request.json|->
//!   anyset filter-options <dataset-key>
//!
//! Examples:
//!   anyset list
//!   anyset compile sales/v1 request.json --dialect duckdb
//!   echo '{"table_name": "orders"}' | anyset query sales/v1 -

use anyset::config::Settings;
use anyset::query::QueryRequestWire;
use anyset::registry::DatasetRegistry;
use anyset::service::QueryService;
use anyset::sql::Dialect;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "anyset")]
#[command(about = "AnySet - schema-checked queries over pluggable dataset backends")]
#[command(version)]
struct Cli {
    /// Config file (defaults: $ANYSET_CONFIG, ./anyset.toml, user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a request to SQL without executing it
    Compile {
        /// Dataset key, e.g. sales/v1
        dataset: String,

        /// Path to the JSON request, or - for stdin
        request: String,

        /// SQL dialect to generate (defaults to the adapter's own)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Validate a request against its dataset
    Validate {
        /// Dataset key, e.g. sales/v1
        dataset: String,

        /// Path to the JSON request, or - for stdin
        request: String,
    },

    /// Execute a request and print the result set as JSON
    Query {
        /// Dataset key, e.g. sales/v1
        dataset: String,

        /// Path to the JSON request, or - for stdin
        request: String,
    },

    /// Print the filter options of a dataset as JSON
    FilterOptions {
        /// Dataset key, e.g. sales/v1
        dataset: String,
    },

    /// List configured datasets
    List,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
    Snowflake,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Snowflake => Dialect::Snowflake,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with comments listing the bound parameters
    Verbose,
    /// Output SQL and parameters as JSON
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    anyset::logging::init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dialect_override = match &cli.command {
        Commands::Compile { dialect, .. } => dialect.clone().map(Dialect::from),
        _ => None,
    };

    let registry = match DatasetRegistry::from_settings(&settings) {
        Ok(r) => match dialect_override {
            Some(d) => r.with_dialect_override(d),
            None => r,
        },
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let service = QueryService::new(Arc::new(registry));

    match cli.command {
        Commands::Compile {
            dataset,
            request,
            output,
            ..
        } => cmd_compile(&service, &dataset, &request, output),
        Commands::Validate { dataset, request } => cmd_validate(&service, &dataset, &request),
        Commands::Query { dataset, request } => cmd_query(&service, &dataset, &request).await,
        Commands::FilterOptions { dataset } => cmd_filter_options(&service, &dataset).await,
        Commands::List => cmd_list(&service),
    }
}

fn read_request(source: &str) -> Result<QueryRequestWire, String> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Error reading stdin: {}", e))?;
        buf
    } else {
        fs::read_to_string(source).map_err(|e| format!("Error reading file '{}': {}", source, e))?
    };
    serde_json::from_str(&text).map_err(|e| format!("Malformed request: {}", e))
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_compile(service: &QueryService, dataset: &str, request: &str, output: OutputFormat) -> ExitCode {
    let wire = match read_request(request) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let compiled = match service.compile(dataset, wire) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        OutputFormat::Verbose => {
            println!("-- AnySet Compiled SQL");
            println!("-- Dataset: {}", compiled.dataset_key);
            println!("-- Dialect: {}", compiled.dialect);
            for param in compiled.params.iter() {
                println!("-- {} = {}", param.name, serde_json::json!(param.value));
            }
            println!();
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "dataset": compiled.dataset_key,
            "dialect": compiled.dialect,
            "sql": compiled.sql,
            "params": compiled.params,
        })),
    }
}

fn cmd_validate(service: &QueryService, dataset: &str, request: &str) -> ExitCode {
    let wire = match read_request(request) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match service.validate(dataset, wire) {
        Ok(req) => {
            println!("✓ Request is valid");
            println!("  Table: {}", req.table_name());
            println!("  Group by: {}", req.group_by().join(", "));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_query(service: &QueryService, dataset: &str, request: &str) -> ExitCode {
    let wire = match read_request(request) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match service.execute(dataset, wire).await {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("Query error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_filter_options(service: &QueryService, dataset: &str) -> ExitCode {
    match service.filter_options(dataset).await {
        Ok(options) => print_json(&options),
        Err(e) => {
            eprintln!("Filter options error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_list(service: &QueryService) -> ExitCode {
    let datasets = service.list();
    if datasets.is_empty() {
        println!("No datasets configured.");
        return ExitCode::SUCCESS;
    }

    println!("Datasets ({}):", datasets.len());
    for d in &datasets {
        println!("  - {} ({}, {} → {})", d.key, d.name, d.adapter, d.dialect);
        for table in &d.tables {
            println!("      {}", table);
        }
    }
    ExitCode::SUCCESS
}
