//! bizcode - inspect business codes and the code registry
//!
//! The `bizcode` binary answers the questions that come up when a formatted
//! error such as `#500:076233020#connection refused` shows up in a log:
//! - which package, function and line produced this code (`lookup`, `decode`)
//! - what codes the registry knows about (`list`)
//! - what code a given location would get (`code`)
//! - where the current settings come from (`config`)

use bc_common::{parse_wire, BusinessCode, RegistryEntry};
use bc_config::{resolve_config, ConfigError, ConfigOptions, ResolvedConfig};
use bc_core::codegen::{business_code, split_qualified};
use bc_core::exit_codes::ExitCode;
use bc_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use bc_core::{RegistryError, RegistryStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// Inspect call-site business codes and the code registry
#[derive(Parser)]
#[command(name = "bizcode")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Registry file (JSON)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Separator used in formatted strings
    #[arg(long, global = true)]
    separator: Option<char>,

    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest used to discover the owning package
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Log format on stderr (human, json)
    #[arg(long, global = true, default_value = "human")]
    log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Human,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the location registered for a business code
    Lookup(LookupArgs),

    /// List every registered business code
    List,

    /// Split a formatted error string and locate its code
    Decode(DecodeArgs),

    /// Compute the business code for a function and line
    Code(CodeArgs),

    /// Show the resolved configuration and where each value came from
    Config,
}

#[derive(Args, Debug)]
struct LookupArgs {
    /// Business code, e.g. 076233020
    code: String,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Formatted string, e.g. '#500:076233020#connection refused'
    formatted: String,
}

#[derive(Args, Debug)]
struct CodeArgs {
    /// Qualified function name, e.g. my_app::db::load_user
    qualified_name: String,

    /// Source line
    line: u32,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        format: cli.global.log_format,
        level: LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
    });

    let exit_code = match &cli.command {
        Commands::Code(args) => run_code(&cli.global, args),
        command => match load_config(&cli.global) {
            Ok(resolved) => dispatch(&cli.global, &resolved, command),
            Err(e) => output_config_error(&cli.global, &e),
        },
    };

    exit_code.into()
}

fn dispatch(global: &GlobalOpts, resolved: &ResolvedConfig, command: &Commands) -> ExitCode {
    match command {
        Commands::Lookup(args) => run_lookup(global, resolved, args),
        Commands::List => run_list(global, resolved),
        Commands::Decode(args) => run_decode(global, resolved, args),
        Commands::Code(args) => run_code(global, args),
        Commands::Config => run_config(global, resolved),
    }
}

fn load_config(global: &GlobalOpts) -> Result<ResolvedConfig, ConfigError> {
    let options = ConfigOptions {
        config_file: global.config.clone(),
        registry: global.registry.clone(),
        separator: global.separator,
        manifest: global.manifest.clone(),
        ..ConfigOptions::default()
    };
    let resolved = resolve_config(&options)?;
    tracing::debug!(
        registry = ?resolved.config.destination,
        separator = %resolved.config.separator,
        "configuration resolved"
    );
    Ok(resolved)
}

// ============================================================================
// Commands
// ============================================================================

fn run_lookup(global: &GlobalOpts, resolved: &ResolvedConfig, args: &LookupArgs) -> ExitCode {
    let Some(store) = open_store(global, resolved) else {
        return ExitCode::ArgsError;
    };
    let code = BusinessCode::from_raw(args.code.trim());
    match store.lookup(&code) {
        Ok(Some(entry)) => {
            match global.format {
                OutputFormat::Json => print_json(&entry),
                OutputFormat::Human => print_entry(&entry),
            }
            ExitCode::Clean
        }
        Ok(None) => {
            match global.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "businessCode": code,
                    "found": false,
                })),
                OutputFormat::Human => eprintln!("{code}: not registered"),
            }
            ExitCode::NotFound
        }
        Err(e) => output_registry_error(global, &e),
    }
}

fn run_list(global: &GlobalOpts, resolved: &ResolvedConfig) -> ExitCode {
    let Some(store) = open_store(global, resolved) else {
        return ExitCode::ArgsError;
    };
    let map = match store.load() {
        Ok(map) => map,
        Err(e) => return output_registry_error(global, &e),
    };
    match global.format {
        OutputFormat::Json => print_json(&map),
        OutputFormat::Human => {
            if map.is_empty() {
                eprintln!("registry {} is empty", store.path().display());
            }
            for entry in map.values() {
                println!(
                    "{:<12} {}::{} (line {})",
                    entry.business_code, entry.package, entry.function_name, entry.line
                );
            }
        }
    }
    ExitCode::Clean
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodeReport {
    status: u16,
    business_code: BusinessCode,
    payload: String,
    location: Option<RegistryEntry>,
}

fn run_decode(global: &GlobalOpts, resolved: &ResolvedConfig, args: &DecodeArgs) -> ExitCode {
    let separator = resolved.config.separator;
    let parsed = match parse_wire(&args.formatted, separator) {
        Ok(parsed) => parsed,
        Err(e) => {
            match global.format {
                OutputFormat::Json => print_error_json(e.code(), &e.to_string()),
                OutputFormat::Human => {
                    eprintln!("error: {}", e);
                    eprintln!("hint: {}", e.remediation());
                }
            }
            return ExitCode::ParseError;
        }
    };

    let location = match &resolved.config.destination {
        Some(path) => match RegistryStore::new(path).lookup(&parsed.code) {
            Ok(entry) => entry,
            Err(e) => return output_registry_error(global, &e),
        },
        None => None,
    };

    let report = DecodeReport {
        status: parsed.status,
        business_code: parsed.code,
        payload: parsed.payload,
        location,
    };
    match global.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Human => {
            println!("status:   {}", report.status);
            println!("code:     {}", report.business_code);
            println!("payload:  {}", report.payload);
            match &report.location {
                Some(entry) => println!(
                    "location: {}::{} (line {})",
                    entry.package, entry.function_name, entry.line
                ),
                None => println!("location: unknown"),
            }
        }
    }
    ExitCode::Clean
}

fn run_code(global: &GlobalOpts, args: &CodeArgs) -> ExitCode {
    let (package, function) = split_qualified(&args.qualified_name);
    let code = business_code(package, function, args.line);
    tracing::debug!(package, function, line = args.line, code = %code, "computed business code");
    match global.format {
        OutputFormat::Json => print_json(&RegistryEntry::new(code, package, function, args.line)),
        OutputFormat::Human => println!("{code}"),
    }
    ExitCode::Clean
}

fn run_config(global: &GlobalOpts, resolved: &ResolvedConfig) -> ExitCode {
    match global.format {
        OutputFormat::Json => print_json(resolved),
        OutputFormat::Human => {
            let config = &resolved.config;
            let sources = &resolved.sources;
            let registry = config
                .destination
                .as_ref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
            let package = config.package_name.as_deref().unwrap_or("(none)");
            println!("registry:        {registry} [{}]", sources.registry);
            println!("separator:       {} [{}]", config.separator, sources.separator);
            println!(
                "call chain:      {} [{}]",
                config.with_call_chain, sources.with_call_chain
            );
            println!("skip:            {} [{}]", config.skip, sources.skip);
            println!("package:         {package} [{}]", sources.package);
            println!(
                "queue capacity:  {} [{}]",
                config.queue_capacity, sources.queue_capacity
            );
            if let Some(path) = &resolved.config_file {
                println!("config file:     {}", path.display());
            }
            if let Some(path) = &resolved.manifest {
                println!("manifest:        {}", path.display());
            }
        }
    }
    ExitCode::Clean
}

// ============================================================================
// Output helpers
// ============================================================================

fn open_store(global: &GlobalOpts, resolved: &ResolvedConfig) -> Option<RegistryStore> {
    match &resolved.config.destination {
        Some(path) => Some(RegistryStore::new(path)),
        None => {
            let message = "no registry configured (use --registry or BIZCODE_REGISTRY)";
            match global.format {
                OutputFormat::Json => print_error_json(10, message),
                OutputFormat::Human => eprintln!("error: {message}"),
            }
            None
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize output"),
    }
}

fn print_entry(entry: &RegistryEntry) {
    println!("code:     {}", entry.business_code);
    println!("package:  {}", entry.package);
    println!("function: {}", entry.function_name);
    println!("line:     {}", entry.line);
}

fn print_error_json(code: u32, message: &str) {
    let response = serde_json::json!({
        "status": "error",
        "error": {
            "code": code,
            "message": message,
        }
    });
    eprintln!("{response}");
}

fn output_registry_error(global: &GlobalOpts, error: &RegistryError) -> ExitCode {
    match global.format {
        OutputFormat::Json => print_error_json(error.code(), &error.to_string()),
        OutputFormat::Human => eprintln!("error: {error}"),
    }
    ExitCode::IoError
}

/// Output a config error in the appropriate format.
fn output_config_error(global: &GlobalOpts, error: &ConfigError) -> ExitCode {
    let exit_code = match error {
        ConfigError::Io { .. } => ExitCode::IoError,
        _ => ExitCode::ArgsError,
    };
    match global.format {
        OutputFormat::Json => print_error_json(error.code(), &error.to_string()),
        OutputFormat::Human => eprintln!("config error: {error}"),
    }
    exit_code
}
