//! Tumble CLI - Command-line tools for animation catalogs and timelines

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{simulate, validate};

#[derive(Parser)]
#[command(name = "tumble")]
#[command(about = "Validate animation catalogs and replay action timelines", long_about = None)]
#[command(version)]
struct Cli {
    /// Log transitions and catalog loading (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog file and list its bound actions
    Validate {
        /// Path to a .anims.toml catalog
        catalog: String,

        /// Level index for level-gated clips
        #[arg(long)]
        level: Option<u32>,
    },

    /// Replay a scripted action sequence through one actor's timeline
    Simulate {
        /// Path to a .anims.toml catalog
        catalog: String,

        /// Path to the tick script
        script: String,

        /// Level index for level-gated clips (defaults to the config's level)
        #[arg(long)]
        level: Option<u32>,

        /// Session config supplying extra catalogs, remaps, crouch pairs and pause
        #[arg(long)]
        config: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,

        /// Action that maps crouch progress when entered
        #[arg(long, requires = "stand_up")]
        crouch_down: Option<u16>,

        /// Action that maps inverse crouch progress when entered
        #[arg(long, requires = "crouch_down")]
        stand_up: Option<u16>,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Validate { catalog, level } => validate::run(&catalog, level),
        Commands::Simulate {
            catalog,
            script,
            level,
            config,
            format,
            crouch_down,
            stand_up,
        } => simulate::run(simulate::SimulateArgs {
            catalog,
            script,
            level,
            config,
            format,
            crouch_down,
            stand_up,
        }),
    }
}
