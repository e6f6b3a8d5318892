use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use watch_porter_core::ModelNumber;

use super::AppContext;
use crate::CliError;

/// List stored models with their name and unknown-group count.
pub(crate) fn run_catalog_list(ctx: &AppContext) -> Result<(), CliError> {
    let catalog = ctx.open_catalog()?;
    if catalog.is_empty() {
        log::info!("Catalog is empty");
        return Ok(());
    }

    for (key, entry) in catalog.iter() {
        let unknown = entry.unknown_count();
        let status = if unknown == 0 {
            format!("{}", "complete".if_supports_color(Stdout, |t| t.green()))
        } else {
            format!(
                "{}",
                format!("{unknown} unknown").if_supports_color(Stdout, |t| t.yellow())
            )
        };
        log::info!(
            "  {:<20} {} {}",
            key.if_supports_color(Stdout, |t| t.cyan()),
            entry.name,
            status,
        );
    }
    log::info!("");
    log::info!("{} model(s)", catalog.len());
    Ok(())
}

/// Print the entry stored for a model.
pub(crate) fn run_catalog_show(ctx: &AppContext, model: &str) -> Result<(), CliError> {
    let catalog = ctx.open_catalog()?;
    let number = ModelNumber::new(model);
    let hit = catalog
        .lookup(&number)
        .ok_or_else(|| CliError::input(format!("{} is not in the catalog", model.trim())))?;

    log::info!(
        "{} {}",
        "Catalog key:".if_supports_color(Stdout, |t| t.bold()),
        hit.key.if_supports_color(Stdout, |t| t.cyan()),
    );
    println!("{}", serde_json::to_string_pretty(&hit.entry)?);
    Ok(())
}

pub(crate) fn run_catalog_path(ctx: &AppContext) -> Result<(), CliError> {
    let path = ctx.catalog_path()?;
    let status = if path.exists() { "(exists)" } else { "(not found)" };
    log::info!(
        "{} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        status.if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}
