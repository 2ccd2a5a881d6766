use clap::{Parser, Subcommand};
use memolite::cache::EvictionPolicy;
use memolite::cli::{self as prog_cli, AppConfig, Command};
use memolite::logger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memolite", version, about = "Bounded memoization cache toolkit", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, global = true, help = "Path to a config file (TOML). If omitted, memolite.toml is searched.")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Output format: human|plain|json")]
    format: Option<String>,
    #[arg(long, global = true, help = "Log level: off|error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Default)]
struct CacheArgs {
    #[arg(long, help = "Eviction policy: insertion (fifo) or access (lru)")]
    policy: Option<EvictionPolicy>,
    #[arg(long, help = "Maximum number of entries")]
    capacity: Option<usize>,
    #[arg(long, help = "Sizing hint: initial table size")]
    initial_capacity: Option<usize>,
    #[arg(long, help = "Sizing hint: load factor before the table grows")]
    load_factor: Option<f32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(name = "replay", about = "Replay an operation trace and report the final cache")]
    Replay {
        #[arg(help = "Trace file: put <k> <v> | get <k> | remove <k> | clear, one per line")]
        trace: PathBuf,
        #[command(flatten)]
        cache: CacheArgs,
    },
    #[command(name = "check-config", about = "Validate configuration and print the effective values")]
    CheckConfig {
        #[arg(help = "Config file to check (same as --config)")]
        file: Option<PathBuf>,
        #[command(flatten)]
        cache: CacheArgs,
    },
}

fn cli_layer(args: &CacheArgs, log_level: Option<String>) -> AppConfig {
    AppConfig {
        capacity: args.capacity,
        policy: args.policy,
        initial_capacity: args.initial_capacity,
        load_factor: args.load_factor,
        log_dir: None,
        log_level,
    }
}

fn main() {
    let cli = Cli::parse();
    let mode = prog_cli::parse_output_mode(cli.format.as_deref());

    let (args, explicit, trace) = match &cli.command {
        Commands::Replay { trace, cache } => (cache, cli.config.clone(), Some(trace.clone())),
        Commands::CheckConfig { file, cache } => (cache, file.clone().or_else(|| cli.config.clone()), None),
    };
    let app = match prog_cli::load_layered(cli_layer(args, cli.log_level.clone()), explicit.as_deref()) {
        Ok(a) => a,
        Err(e) => { eprintln!("error: {e}"); std::process::exit(1); }
    };
    let dev6 = logger::dev6_from_env();
    if app.log_dir.is_some() || app.log_level.is_some() || dev6 {
        if let Err(e) = logger::configure_logging(
            app.log_dir.as_deref(),
            app.log_level.as_deref(),
            logger::retention_from_env(),
            dev6,
        ) {
            eprintln!("warning: logging disabled: {e}");
        }
    }
    let config = match app.resolve() {
        Ok(c) => c,
        Err(e) => { eprintln!("error: {e}"); std::process::exit(1); }
    };

    let cmd = match trace {
        Some(trace) => Command::Replay { trace, config },
        None => Command::CheckConfig { config },
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = prog_cli::run_with_format(cmd, mode, &mut out) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
