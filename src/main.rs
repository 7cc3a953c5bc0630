use anyhow::Result;
use clap::Parser;
use componentry::{ComponentCatalog, ComponentManager, ManagerConfig};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "componentry")]
#[command(about = "Process-wide component lifecycle manager")]
#[command(version)]
#[command(long_about = "Discovers the configured components, drives them through \
init, start and shutdown exactly once each, and publishes their management \
attributes for introspection while the process runs.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "componentry.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting components")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - initialize but don't start components
    #[arg(long, help = "Initialize components, list what was registered, and exit")]
    dry_run: bool,

    /// Print the management snapshot as JSON once started, then shut down
    #[arg(long, help = "Start components, print all management attributes as JSON, and exit")]
    dump_management: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        println!("# Componentry configuration file");
        println!("{}", ManagerConfig::default().to_toml()?);
        return Ok(());
    }

    // Load configuration before logging so the file can pick the format
    let config = ManagerConfig::load_from_file(&args.config)?;
    let log_guard = init_logging(&args, &config)?;

    info!("Starting componentry v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }
    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let source = ComponentCatalog::builtin().source(config).map_err(|e| {
        error!("Failed to bind component catalog: {}", e);
        e
    })?;
    let manager = ComponentManager::new(source);

    let report = manager.initialize().map_err(|e| {
        error!("Failed to initialize components: {}", e);
        e
    })?;
    for failure in &report.publish_failures {
        warn!(
            "Component {} has unpublished management objects: {}",
            failure.component, failure.reason
        );
    }

    if args.dry_run {
        println!("✓ Dry run completed - components initialized:");
        for name in manager.component_names()? {
            println!("  component {}", name);
        }
        for name in manager.query_names("*:*")? {
            println!("  object    {}", name);
        }
        return Ok(());
    }

    if let Err(e) = manager.start() {
        error!("Failed to start components: {}", e);
        let report = manager.shutdown()?;
        info!("Shutdown after failed start completed with {} failures", report.failures.len());
        return Err(e.into());
    }

    let report = if args.dump_management {
        let snapshot = manager.snapshot()?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        manager.shutdown()?
    } else {
        manager.run().await?
    };

    let exit_code = report.exit_code();
    info!("Componentry exited with code: {}", exit_code);
    // process::exit skips destructors; flush the file writer first
    drop(log_guard);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args, config: &ManagerConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags, falling back to the configured level
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("componentry={}", log_level)));

    let format = args
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());

    let fmt_layer = match format {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        other => {
            eprintln!("Warning: Unknown log format '{}', using default", other);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    // Optional daily rolling file output
    let (file_layer, guard) = match &config.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "componentry.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}
