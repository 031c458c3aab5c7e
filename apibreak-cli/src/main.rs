use anyhow::Context;
use apibreak_cli::config::{self, CliOverrides, ConfigMerger};
use apibreak_cli::explain;
use apibreak_core::adapters::{FsProfileSource, FsWritePort};
use apibreak_core::settings::BreakingSettings;
use apibreak_core::{
    BreakingEngine, EngineError, RecordedResponse, RouteFailure, RouteOutcome, RouteSuccess,
    ToolInfo, run_route, write_activation_artifacts,
};
use apibreak_render::render_category_md;
use apibreak_types::CATEGORY_TABLE;
use camino::Utf8PathBuf;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use fs_err as fs;
use serde_json::Value;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "apibreak",
    version,
    about = "Controlled breaking-change simulation for a mock API."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the active breaking categories and write activation.json / activation.md.
    Activate(ActivateArgs),
    /// Run one request through an endpoint's breaking pipeline and print the response.
    Simulate(SimulateArgs),
    /// Explain what a breaking category does and how to declare it.
    Explain(ExplainArgs),
    /// List all breaking categories.
    ListCategories(ListCategoriesArgs),
}

#[derive(Debug, clap::Args)]
struct EngineArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Directory of profile declarations (default: <repo_root>/profiles).
    #[arg(long)]
    profiles_dir: Option<Utf8PathBuf>,

    /// Route table to validate profiles against.
    #[arg(long)]
    routes: Option<Utf8PathBuf>,

    /// Turn breaking changes on or off.
    #[arg(
        long,
        env = "APIBREAK_ENABLED",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    enabled: Option<bool>,

    /// Activate every available category instead of a seeded subset.
    #[arg(
        long,
        env = "APIBREAK_ALL_MODE",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    all_mode: Option<bool>,

    /// Seed for normal-mode selection.
    #[arg(long, env = "APIBREAK_SEED")]
    seed: Option<String>,
}

#[derive(Debug, Parser)]
struct ActivateArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Output directory (default: <repo_root>/artifacts/apibreak).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct SimulateArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// HTTP method of the endpoint.
    #[arg(long, default_value = "GET")]
    method: String,

    /// Route path, in `:id` or `{id}` notation.
    #[arg(long)]
    path: String,

    /// Request body as JSON, or `@file` to read it from a file.
    #[arg(long, default_value = "{}")]
    body: String,

    /// Business-logic result as JSON, or `@file`.
    #[arg(long, default_value = "null")]
    data: String,

    /// Status the business logic returns.
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Make the business logic fail with this message (uses --status).
    #[arg(long)]
    route_error: Option<String>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Category to explain (e.g. "FIELD_RENAME", "status-code").
    category: String,

    /// Output format (text, md).
    #[arg(long, value_enum, default_value = "text")]
    format: ExplainFormat,
}

#[derive(Debug, Parser)]
struct ListCategoriesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ExplainFormat {
    Text,
    Md,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        if let Some(engine_err) = e.downcast_ref::<EngineError>() {
            return ExitCode::from(engine_err.exit_code());
        }
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Activate(args) => cmd_activate(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::Explain(args) => cmd_explain(args),
        Command::ListCategories(args) => cmd_list_categories(args),
    }
}

fn resolve_settings(args: EngineArgs) -> anyhow::Result<BreakingSettings> {
    let file_config =
        config::load_or_default(&args.repo_root).context("load apibreak.toml config")?;
    let settings = ConfigMerger::new(file_config).merge(
        &args.repo_root,
        CliOverrides {
            enabled: args.enabled,
            all_mode: args.all_mode,
            seed: args.seed,
            profiles_dir: args.profiles_dir,
            routes_file: args.routes,
        },
    );
    debug!(
        "merged config: mode={}, seed={}, profiles_dir={}, routes={:?}",
        settings.mode().as_str(),
        settings.seed,
        settings.profiles_dir,
        settings.routes_file
    );
    Ok(settings)
}

fn build_engine(settings: &BreakingSettings) -> anyhow::Result<BreakingEngine> {
    let mut source = FsProfileSource::new(settings.profiles_dir.clone());
    if let Some(routes) = &settings.routes_file {
        source = source.with_routes(routes.clone());
    }
    let engine = BreakingEngine::from_source(settings, &source)?;
    Ok(engine)
}

fn cmd_activate(args: ActivateArgs) -> anyhow::Result<()> {
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.engine.repo_root.join("artifacts").join("apibreak"));
    let settings = resolve_settings(args.engine)?;
    let engine = build_engine(&settings)?;

    let report = engine.activation_report(tool_info());
    write_activation_artifacts(&report, &out_dir, &FsWritePort)?;

    println!(
        "mode={} endpoints={} active_categories={} snapshot={}",
        report.mode.as_str(),
        report.summary.endpoints_total,
        report.summary.categories_active,
        report.snapshot_id
    );
    info!("wrote activation to {}", out_dir);
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let raw = read_json_arg(&args.body).context("parse --body")?;
    let data = read_json_arg(&args.data).context("parse --data")?;
    let settings = resolve_settings(args.engine)?;
    let engine = build_engine(&settings)?;

    let handler = engine
        .handler_for_route(&args.method, &args.path)
        .with_context(|| format!("endpoint {} {}", args.method, args.path))?;

    let status = args.status;
    let route_error = args.route_error;
    let mut sink = RecordedResponse::new();
    let outcome = run_route(handler, raw, &mut sink, |_body| match route_error {
        Some(message) => Err(RouteFailure::new(status, message)),
        None => Ok(RouteSuccess::with_status(data, status)),
    });
    debug!("route outcome: {:?}", outcome);

    let printed = serde_json::json!({
        "status": sink.status,
        "body": sink.body,
        "outcome": match outcome {
            RouteOutcome::Violation(_) => "violation",
            RouteOutcome::Failed(_) => "failed",
            RouteOutcome::Sent(_) => "sent",
        },
    });
    println!("{}", serde_json::to_string_pretty(&printed)?);
    Ok(())
}

/// Inline JSON, or `@path` to read JSON from a file.
fn read_json_arg(arg: &str) -> anyhow::Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("invalid JSON")
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "apibreak".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{format_implemented, list_category_keys, lookup_category};

    let Some(entry) = lookup_category(&args.category) else {
        let available = list_category_keys().join(", ");
        anyhow::bail!(
            "Unknown category: '{}'\n\nAvailable categories: {}",
            args.category,
            available
        );
    };
    let info = entry.info();

    if let ExplainFormat::Md = args.format {
        print!("{}", render_category_md(info));
        return Ok(());
    }

    println!("================================================================================");
    println!("CATEGORY: {}", info.title);
    println!("================================================================================");
    println!();
    println!("Key:     {}", info.category);
    println!("Status:  {}", format_implemented(info.implemented));
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", info.description);
    println!();

    println!("REQUEST");
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.request_effect);
    println!();

    println!("RESPONSE");
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.response_effect);
    println!();

    println!("PROFILE DEFINITION");
    println!("--------------------------------------------------------------------------------");
    println!("    {}", entry.example);
    println!();

    Ok(())
}

fn cmd_list_categories(args: ListCategoriesArgs) -> anyhow::Result<()> {
    use explain::format_implemented;

    match args.format {
        OutputFormat::Text => {
            println!("Breaking categories:\n");
            println!("  {:<20} {:<10} TITLE", "KEY", "STATUS");
            println!("  {:<20} {:<10} -----", "---", "------");
            for info in CATEGORY_TABLE.iter() {
                println!(
                    "  {:<20} {:<10} {}",
                    info.category.as_str(),
                    format_implemented(info.implemented),
                    info.title
                );
            }
            println!();
            println!("Use 'apibreak explain <key>' for details.");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&CATEGORY_TABLE)?);
        }
    }
    Ok(())
}
