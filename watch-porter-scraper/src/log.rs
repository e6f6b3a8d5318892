use std::path::Path;

use watch_porter_core::ResolutionOrigin;

use crate::resolve::Resolution;

/// A single entry in the resolution log.
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// A source (or the catalog) described the model.
    Resolved {
        model: String,
        name: String,
        origin: ResolutionOrigin,
        warnings: Vec<String>,
    },
    /// Every source failed and a synthetic record was built.
    Fallback {
        model: String,
        errors: Vec<String>,
    },
}

impl From<&Resolution> for LogEntry {
    fn from(r: &Resolution) -> Self {
        if r.bag.origin == ResolutionOrigin::Synthetic {
            Self::Fallback {
                model: r.model.clone(),
                errors: r.warnings.clone(),
            }
        } else {
            Self::Resolved {
                model: r.model.clone(),
                name: r.bag.name.clone(),
                origin: r.bag.origin,
                warnings: r.warnings.clone(),
            }
        }
    }
}

/// Collects resolution outcomes and writes a log file.
#[derive(Debug, Default)]
pub struct ResolveLog {
    entries: Vec<LogEntry>,
}

impl ResolveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary::default();
        for entry in &self.entries {
            match entry {
                LogEntry::Resolved { origin, .. } => match origin {
                    ResolutionOrigin::Catalog => summary.by_catalog += 1,
                    ResolutionOrigin::PrioritySource => summary.by_priority += 1,
                    ResolutionOrigin::Chrono24 | ResolutionOrigin::Ebay => {
                        summary.by_marketplace += 1
                    }
                    ResolutionOrigin::GeneralSearch => summary.by_search += 1,
                    ResolutionOrigin::Synthetic => summary.total_fallback += 1,
                },
                LogEntry::Fallback { .. } => summary.total_fallback += 1,
            }
        }
        summary.total_resolved = self.entries.len() - summary.total_fallback;
        summary
    }

    /// Write the log to a file.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)?;
        let summary = self.summary();

        writeln!(file, "=== Resolve Log ===")?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(
            file,
            "Resolved: {} (catalog: {}, priority: {}, marketplace: {}, search: {})",
            summary.total_resolved,
            summary.by_catalog,
            summary.by_priority,
            summary.by_marketplace,
            summary.by_search
        )?;
        writeln!(file, "Fallback: {}", summary.total_fallback)?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                LogEntry::Resolved {
                    model,
                    name,
                    origin,
                    warnings,
                } => {
                    writeln!(file, "[OK] {} -> \"{}\" (from {})", model, name, origin)?;
                    for w in warnings {
                        writeln!(file, "     Skipped: {}", w)?;
                    }
                }
                LogEntry::Fallback { model, errors } => {
                    writeln!(file, "[FALLBACK] {}", model)?;
                    for e in errors {
                        writeln!(file, "     Error: {}", e)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogSummary {
    pub total_resolved: usize,
    pub total_fallback: usize,
    pub by_catalog: usize,
    pub by_priority: usize,
    pub by_marketplace: usize,
    pub by_search: usize,
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use watch_porter_core::AttributeBag;

    use super::*;

    #[test]
    fn summary_and_file() {
        let mut catalog_bag = AttributeBag::synthetic("SKX007");
        catalog_bag.origin = ResolutionOrigin::Catalog;
        catalog_bag.name = "Seiko SKX007".into();

        let mut log = ResolveLog::new();
        log.add(LogEntry::from(&Resolution {
            model: "SKX007".into(),
            bag: catalog_bag,
            warnings: Vec::new(),
        }));
        log.add(LogEntry::from(&Resolution {
            model: "ZZ1".into(),
            bag: AttributeBag::synthetic("ZZ1"),
            warnings: vec!["eBay: Nothing found: no eBay listing for ZZ1".into()],
        }));

        let summary = log.summary();
        assert_eq!(summary.total_resolved, 1);
        assert_eq!(summary.by_catalog, 1);
        assert_eq!(summary.total_fallback, 1);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resolve.log");
        log.write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("=== Resolve Log ==="));
        assert!(text.contains("[OK] SKX007 -> \"Seiko SKX007\" (from catalog)"));
        assert!(text.contains("[FALLBACK] ZZ1"));
        assert!(text.contains("     Error: eBay: Nothing found"));
    }
}
