use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use watch_porter_scraper::{CredentialSource, Credentials};

use super::AppContext;

fn mask_value(s: &str) -> String {
    match s.char_indices().nth(2) {
        Some((idx, _)) => format!("{}****", &s[..idx]),
        None => "****".to_string(),
    }
}

fn log_path_status(label: &str, path: Option<&Path>) {
    match path {
        Some(p) if p.exists() => {
            log::info!(
                "  {} {} {}",
                label,
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  {} {} {}",
                label,
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  {} {}",
                label,
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
}

/// Show current credentials and their sources.
pub(crate) fn run_config_show() {
    let path = watch_porter_scraper::config_path();
    let sources = watch_porter_scraper::credential_sources();
    let creds = Credentials::load();

    log::info!(
        "{}",
        "Search & Classifier Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");
    log_path_status("Config file:", path.as_deref());
    log::info!("");

    let value = |source: &CredentialSource, v: Option<&str>, is_secret: bool| match source {
        CredentialSource::Missing => None,
        _ => v.map(|v| if is_secret { mask_value(v) } else { v.to_string() }),
    };
    let provider = creds.provider.to_string();

    let fields: [(&str, &CredentialSource, Option<String>); 6] = [
        (
            "google_cse_api_key",
            &sources.google_cse_key,
            value(&sources.google_cse_key, creds.google_cse_key.as_deref(), true),
        ),
        (
            "google_cse_cx",
            &sources.google_cse_cx,
            value(&sources.google_cse_cx, creds.google_cse_cx.as_deref(), false),
        ),
        (
            "serpapi_key",
            &sources.serpapi_key,
            value(&sources.serpapi_key, creds.serpapi_key.as_deref(), true),
        ),
        (
            "classifier_api_key",
            &sources.classifier_key,
            value(&sources.classifier_key, creds.classifier_key.as_deref(), true),
        ),
        (
            "classifier_provider",
            &sources.classifier_provider,
            value(&sources.classifier_provider, Some(provider.as_str()), false),
        ),
        (
            "classifier_model",
            &sources.classifier_model,
            value(&sources.classifier_model, Some(creds.classifier_model()), false),
        ),
    ];

    for (name, source, value) in fields {
        let source_str = format!("({})", source);
        let label = format!("{}:", name);
        match value {
            Some(v) => {
                log::info!(
                    "  {} {} {}",
                    label.if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {} {} {}",
                    label.if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    if !creds.has_google_cse() && creds.serpapi_key.is_none() {
        log::info!("");
        log::info!(
            "  {} No image search keys: only Flickr and Wikimedia will be searched",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
        );
    }
}

/// Print the credentials, mapping and catalog paths.
pub(crate) fn run_config_path(ctx: &AppContext) {
    log_path_status("Credentials:", watch_porter_scraper::config_path().as_deref());
    log_path_status("Mapping:    ", ctx.mapping_path());
    log_path_status("Catalog:    ", ctx.catalog_path().ok().as_deref());
}
