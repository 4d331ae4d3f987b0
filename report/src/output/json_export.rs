//! JSON export of a complete suite run

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use sweep_bench_core::SuiteResults;

/// Writes a suite run as one JSON document
pub struct JsonExporter;

impl JsonExporter {
    /// Build the document: configuration, timestamps, every table and the
    /// best-configuration comparison
    pub fn to_value(results: &SuiteResults) -> Result<serde_json::Value> {
        let comparison = results.comparison()?;
        let elapsed = results.finished_at - results.started_at;
        Ok(json!({
            "suite": results.config.name,
            "started_at": results.started_at,
            "finished_at": results.finished_at,
            "elapsed_secs": elapsed.num_milliseconds() as f64 / 1000.0,
            "config": results.config,
            "sweeps": results.sweeps,
            "comparison": comparison,
        }))
    }

    /// Write the document to `path`
    pub fn export(results: &SuiteResults, path: &Path) -> Result<()> {
        let value = Self::to_value(results)?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &value)?;
        writer.flush()?;

        tracing::info!(path = %path.display(), "JSON export complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sweep_bench_core::suite::SizedOutcome;
    use sweep_bench_core::{
        Aggregate, Domain, MetricKind, SuiteConfig, SweepOutcome, SweepResults, SweepSpec, XScale,
    };
    use tempfile::TempDir;

    fn results() -> SuiteResults {
        let spec = SweepSpec {
            id: "sequential".into(),
            strategy: "Sequential".into(),
            command: "./seq.sh".into(),
            domain: Domain::Fixed,
            metric: MetricKind::Time,
            sizes: vec![],
            x_scale: XScale::Linear,
            compare: true,
        };
        let mut config = SuiteConfig::matrix();
        config.sweeps = vec![spec.clone()];

        SuiteResults {
            config,
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 30).unwrap(),
            sweeps: vec![SweepResults {
                spec,
                runs: vec![SizedOutcome {
                    size: None,
                    outcome: SweepOutcome::Fixed(Aggregate {
                        mean: 2000.0,
                        stddev: 12.0,
                        samples: 50,
                        tasks: None,
                    }),
                }],
            }],
        }
    }

    #[test]
    fn test_document_layout() {
        let value = JsonExporter::to_value(&results()).unwrap();

        assert_eq!(value["suite"], "matrix");
        assert_eq!(value["elapsed_secs"], 90.0);
        assert_eq!(value["sweeps"][0]["runs"][0]["outcome"]["type"], "fixed");
        assert_eq!(value["sweeps"][0]["runs"][0]["outcome"]["results"]["mean"], 2000.0);
        assert_eq!(value["comparison"][0]["label"], "Sequential");
    }

    #[test]
    fn test_export_writes_parseable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        JsonExporter::export(&results(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["config"]["repeats"], 50);
        assert!(parsed["started_at"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }
}
