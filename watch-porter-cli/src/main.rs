//! watch-porter CLI
//!
//! Command-line interface for resolving watch model numbers into Wix
//! product import files.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::cli_types::{CatalogAction, Cli, Commands, ConfigAction};
use crate::commands::AppContext;
pub(crate) use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = AppContext::new(cli.mapping, cli.catalog, cli.quiet);

    match cli.command {
        Commands::Resolve { models } => commands::resolve::run_resolve(&ctx, &models),
        Commands::Export {
            models,
            input,
            output,
            log: log_path,
        } => commands::export::run_export(&ctx, models, input, output, log_path),
        Commands::Generate { input, output } => {
            commands::generate::run_generate(&input, output)
        }
        Commands::Template { output } => commands::template::run_template(&ctx, output),
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::run_catalog_list(&ctx),
            CatalogAction::Show { model } => commands::catalog::run_catalog_show(&ctx, &model),
            CatalogAction::Path => commands::catalog::run_catalog_path(&ctx),
        },
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => commands::config::run_config_show(),
                ConfigAction::Path => commands::config::run_config_path(&ctx),
            }
            Ok(())
        }
    }
}

/// Install the console logger. `RUST_LOG` takes precedence over the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .filter_module("html5ever", LevelFilter::Warn)
        .filter_module("selectors", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Info);
    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Info | log::Level::Debug | log::Level::Trace => {
                writeln!(buf, "{}", record.args())
            }
            level => writeln!(buf, "{level}: {}", record.args()),
        });
    }
    builder.parse_default_env();
    builder.init();
}
