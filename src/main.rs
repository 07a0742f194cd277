//! roster-migrate CLI
//!
//! Runs the normalization pipeline over the stored character, artifact and force-card
//! collections.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use roster_migrate::{
  JsonDirStore, MigrationConfig, MigrationDriver, MigrationReport, Pipeline, StepSelection,
};

#[derive(Parser)]
#[command(name = "roster-migrate")]
#[command(about = "Normalize stored game entity records", long_about = None)]
struct Cli {
  /// Configuration file (defaults to migrate.config.json in the current directory)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Directory holding <collection>.json files (overrides the configuration)
  #[arg(short, long, global = true)]
  data_dir: Option<PathBuf>,

  /// Log every planned record update
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Arguments shared by commands that touch stored records.
#[derive(Args, Clone)]
struct RunArgs {
  /// Show planned updates without writing them
  #[arg(short = 'n', long)]
  dry_run: bool,

  /// Only run these steps (e.g. classify_rows,filter_keys)
  #[arg(short, long, value_delimiter = ',')]
  step: Vec<String>,

  /// Only visit these collections
  #[arg(long, value_delimiter = ',')]
  collections: Option<Vec<String>>,

  /// Print the report as JSON
  #[arg(long)]
  json: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the normalization pipeline
  Run {
    #[command(flatten)]
    args: RunArgs,
  },

  /// Move canonical CDN URLs back to the legacy /assets/ root
  RevertCdn {
    #[command(flatten)]
    args: RunArgs,
  },

  /// List the steps of the configured pipeline
  Steps,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let config = load_config(cli.config.as_deref())?;
  match &cli.command {
    Commands::Run { args } => {
      let pipeline = Pipeline::from_config(&config);
      run(&cli, &config, &pipeline, args)
    }
    Commands::RevertCdn { args } => {
      let pipeline = Pipeline::revert_cdn(&config);
      run(&cli, &config, &pipeline, args)
    }
    Commands::Steps => {
      for step in Pipeline::from_config(&config).steps() {
        let scope: Vec<&str> = config
          .collections
          .iter()
          .map(String::as_str)
          .filter(|collection| step.applies_to(collection))
          .collect();
        println!("{:<18} {}", step.name(), scope.join(", "));
      }
      Ok(())
    }
  }
}

fn init_logging(verbose: bool) {
  let level = if verbose { "debug" } else { "info" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(explicit: Option<&Path>) -> Result<MigrationConfig> {
  let config = match explicit {
    Some(path) => MigrationConfig::from_path(path)?,
    None => {
      let cwd = std::env::current_dir().context("failed to resolve current directory")?;
      MigrationConfig::discover(&cwd)
    }
  };
  Ok(config.with_env_overrides())
}

fn run(cli: &Cli, config: &MigrationConfig, pipeline: &Pipeline, args: &RunArgs) -> Result<()> {
  let known: Vec<&str> = pipeline.steps().map(|step| step.name()).collect();
  if let Some(unknown) = args.step.iter().find(|name| !known.contains(&name.as_str())) {
    bail!("unknown step `{unknown}`; available: {}", known.join(", "));
  }

  let collections = args
    .collections
    .clone()
    .unwrap_or_else(|| config.collections.clone());

  let mut exclude = config.exclude.clone();
  if !args.step.is_empty() {
    for step in known.iter().copied().filter(|name| !args.step.iter().any(|wanted| wanted == name)) {
      exclude.extend(collections.iter().map(|collection| format!("{collection}/{step}")));
    }
  }
  let rule_count = config.include.len() + exclude.len();
  let selection = StepSelection::new(config.include.clone(), exclude);
  if !selection.is_unfiltered() {
    log::info!("applying {rule_count} step selection rules");
  }

  let data_dir = match &cli.data_dir {
    Some(dir) => dir.clone(),
    None => PathBuf::from(&config.data_dir),
  };
  log::info!(
    "normalizing {} in {} (CDN {})",
    collections.join(", "),
    data_dir.display(),
    config.cdn_base
  );

  let mut store = JsonDirStore::new(data_dir);
  let report = MigrationDriver::new(&mut store, pipeline)
    .dry_run(args.dry_run)
    .run(&collections, &selection)?;

  print_report(&report, args.json)
}

fn print_report(report: &MigrationReport, json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
  } else {
    println!("{report}");
  }
  Ok(())
}
