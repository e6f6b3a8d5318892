use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use watch_porter_scraper::{Credentials, Resolver, WebClient};

use super::AppContext;
use crate::CliError;

/// Resolve each model and print its attribute bag as JSON.
pub(crate) fn run_resolve(ctx: &AppContext, models: &[String]) -> Result<(), CliError> {
    let http = WebClient::new()?;
    let creds = Credentials::load();
    let mut catalog = ctx.open_catalog()?;
    let mut resolver = Resolver::new(&http, &ctx.mapping, &mut catalog, &creds);

    for model in models {
        let resolution = resolver.resolve_traced(model);
        println!("{}", serde_json::to_string_pretty(&resolution.bag)?);

        let origin = format!("({})", resolution.bag.origin);
        log::info!(
            "{} {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            model.trim().if_supports_color(Stdout, |t| t.bold()),
            origin.if_supports_color(Stdout, |t| t.dimmed()),
        );
        for warning in &resolution.warnings {
            log::debug!("  skipped {warning}");
        }
    }
    Ok(())
}
