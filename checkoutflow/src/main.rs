//! Checkoutflow CLI - Main Entry Point
//!
//! Runs the checkout pipeline, or a single step of it, from a TOML
//! configuration file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, warn};

use checkoutflow::config::CheckoutConfig;
use checkoutflow::core::StepId;
use checkoutflow::pipeline::{CheckoutPipeline, PipelineOutcome};
use checkoutflow::session::{format_cookies_toml, load_cookie_file, missing_important_cookies};

/// Exit status for a run stopped by a failed step.
const EXIT_PIPELINE_FAILED: u8 = 1;
/// Exit status for unusable configuration.
const EXIT_INVALID_CONFIG: u8 = 2;

/// Checkoutflow - automated retailer checkout
#[derive(Parser)]
#[command(name = "checkoutflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all six steps
    Run(RunArgs),

    /// Run one step by index (1-6) or name
    Step {
        /// Step to run
        step: StepId,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List the checkout steps
    Steps,

    /// Extract cookies from a "Copy as cURL" capture and print them as TOML
    Cookies {
        /// File holding the curl command
        file: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file
    #[arg(short, long, env = "CHECKOUTFLOW_CONFIG", default_value = "checkout.toml")]
    config: PathBuf,

    /// Cookie file merged over the configured cookies
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Step log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fail the run when the refreshed cart has no shipping address
    #[arg(long)]
    strict_cart_refresh: bool,
}

impl RunArgs {
    fn load(&self) -> anyhow::Result<CheckoutConfig> {
        let mut config = CheckoutConfig::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        if let Some(ref cookies) = self.cookies {
            config
                .merge_cookie_file(cookies)
                .with_context(|| format!("failed to read cookies from {}", cookies.display()))?;
        }
        if let Some(ref log_file) = self.log_file {
            config.pipeline.log_file.clone_from(log_file);
        }
        if self.strict_cart_refresh {
            config = config.with_strict_cart_refresh(true);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run(args) => run(&args, None).await,
        Commands::Step { step, run: args } => run(&args, Some(step)).await,
        Commands::Steps => {
            for step in StepId::ALL {
                println!("{}  {:<22} {}", step.index(), step.name(), step.description());
            }
            ExitCode::SUCCESS
        }
        Commands::Cookies { file } => match print_cookies(&file) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                ExitCode::from(EXIT_INVALID_CONFIG)
            }
        },
    }
}

async fn run(args: &RunArgs, step: Option<StepId>) -> ExitCode {
    let prepared = args.load().and_then(|config| {
        let pipeline = CheckoutPipeline::from_config(&config)
            .context("failed to set up the pipeline")?;
        Ok((config, pipeline))
    });
    let (config, pipeline) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(EXIT_INVALID_CONFIG);
        }
    };

    let mut session = config.session();
    let inputs = config.inputs();
    let outcome = match step {
        Some(step) => pipeline.run_step(step, &mut session, &inputs).await,
        None => pipeline.complete_order_flow(&mut session, &inputs).await,
    };
    report(&outcome)
}

fn report(outcome: &PipelineOutcome) -> ExitCode {
    for line in outcome.summary_lines() {
        println!("{line}");
    }
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else if outcome.is_configuration_failure() {
        ExitCode::from(EXIT_INVALID_CONFIG)
    } else {
        ExitCode::from(EXIT_PIPELINE_FAILED)
    }
}

fn print_cookies(file: &Path) -> anyhow::Result<()> {
    let cookies = load_cookie_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    anyhow::ensure!(!cookies.is_empty(), "no cookies found in {}", file.display());
    for name in missing_important_cookies(&cookies) {
        warn!(cookie = name, "capture is missing an important cookie");
    }
    print!("{}", format_cookies_toml(&cookies)?);
    Ok(())
}
