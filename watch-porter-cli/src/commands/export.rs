use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use watch_porter_export::{PriceOrigin, RowBuilder, write_csv_file};
use watch_porter_scraper::{Credentials, LogEntry, ResolveEvent, ResolveLog, Resolver, WebClient};

use super::{AppContext, timestamped_output};
use crate::CliError;

/// Model numbers from the arguments followed by the lines of `input`.
/// Values are trimmed and blanks dropped; at least one must remain.
pub(crate) fn collect_models(
    args: Vec<String>,
    input: Option<&Path>,
) -> Result<Vec<String>, CliError> {
    let mut models: Vec<String> = args
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();

    if let Some(path) = input {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::input(format!("Could not read {}: {e}", path.display()))
        })?;
        models.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    if models.is_empty() {
        return Err(CliError::input("No model numbers given"));
    }
    Ok(models)
}

/// Resolve every model, then write the CSV and (optionally) the log.
pub(crate) fn run_export(
    ctx: &AppContext,
    models: Vec<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    log_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let models = collect_models(models, input.as_deref())?;
    let output = output.unwrap_or_else(|| timestamped_output("wix_watches"));

    let http = WebClient::new()?;
    let creds = Credentials::load();
    let mut catalog = ctx.open_catalog()?;
    let mut resolver = Resolver::new(&http, &ctx.mapping, &mut catalog, &creds);

    log::info!(
        "{}",
        format!("Resolving {} model(s)", models.len()).if_supports_color(Stdout, |t| t.bold()),
    );
    let pb = ctx.progress_bar(models.len() as u64);
    let resolutions = resolver.resolve_batch(&models, &|event| match event {
        ResolveEvent::Started { model, .. } => pb.set_message(model),
        ResolveEvent::Completed { .. } => pb.inc(1),
        ResolveEvent::Done => pb.finish_and_clear(),
    });

    let builder = RowBuilder::new(&ctx.mapping, resolver.images());
    let rows = builder.build_rows(resolutions.iter().map(|r| (r.model.as_str(), &r.bag)));
    write_csv_file(&output, &rows)?;

    let mut resolve_log = ResolveLog::new();
    for resolution in &resolutions {
        resolve_log.add(LogEntry::from(resolution));
    }
    let summary = resolve_log.summary();

    log::info!("");
    log::info!(
        "  {} {} resolved (catalog: {}, priority: {}, marketplace: {}, search: {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.total_resolved,
        summary.by_catalog,
        summary.by_priority,
        summary.by_marketplace,
        summary.by_search,
    );
    if summary.total_fallback > 0 {
        log::info!(
            "  {} {} built from the model number alone",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            summary.total_fallback,
        );
    }
    let estimated = rows
        .iter()
        .filter(|r| r.price_origin == PriceOrigin::Estimated)
        .count();
    if estimated > 0 {
        log::info!(
            "  {} {} price(s) estimated",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            estimated,
        );
    }

    if let Some(path) = log_path {
        resolve_log.write_to_file(&path)?;
        log::info!(
            "  Log written to {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn models_are_trimmed_and_blanks_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("models.txt");
        fs::write(&path, "  SKX007 \n\n\t\nGA-2100-1A\r\n").unwrap();

        let models = collect_models(vec![" SRPD51".into(), "  ".into()], Some(&path)).unwrap();
        assert_eq!(models, ["SRPD51", "SKX007", "GA-2100-1A"]);
    }

    #[test]
    fn at_least_one_model_is_required() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blank.txt");
        fs::write(&path, "\n  \n").unwrap();

        assert!(matches!(
            collect_models(vec![], Some(&path)),
            Err(CliError::Input(_))
        ));
        assert!(matches!(collect_models(vec![], None), Err(CliError::Input(_))));
    }

    #[test]
    fn missing_input_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = collect_models(vec!["SKX007".into()], Some(&tmp.path().join("nope.txt")));
        assert!(matches!(err, Err(CliError::Input(_))));
    }
}
