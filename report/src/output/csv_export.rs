//! CSV export of result tables

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use sweep_bench_core::{Aggregate, ComparisonEntry, SuiteResults, SweepOutcome, SweepResults};

/// Writes one CSV file per result table
pub struct CsvExporter;

fn stats_columns(agg: &Aggregate, with_tasks: bool) -> Vec<String> {
    let mut row = vec![
        format!("{:.3}", agg.mean),
        format!("{:.3}", agg.stddev),
        agg.samples.to_string(),
    ];
    if with_tasks {
        match agg.tasks {
            Some(t) => {
                row.push(format!("{:.3}", t.mean));
                row.push(format!("{:.3}", t.stddev));
            }
            None => row.extend([String::new(), String::new()]),
        }
    }
    row
}

impl CsvExporter {
    /// Write `outcome` to `path`
    ///
    /// Key columns depend on the sweep shape: none for a fixed point,
    /// `value` for one parameter, `workers,threshold` for a grid. Task
    /// columns are present when any row carries task counts.
    pub fn export_outcome(outcome: &SweepOutcome, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut wtr = Writer::from_writer(file);

        let stats_header = ["mean_ms", "stddev_ms", "samples"];
        let tasks_header = ["tasks_mean", "tasks_stddev"];

        match outcome {
            SweepOutcome::Fixed(agg) => {
                let with_tasks = agg.tasks.is_some();
                let mut header: Vec<&str> = stats_header.to_vec();
                if with_tasks {
                    header.extend(tasks_header);
                }
                wtr.write_record(&header)?;
                wtr.write_record(stats_columns(agg, with_tasks))?;
            }
            SweepOutcome::Linear(table) => {
                let with_tasks = table.iter().any(|(_, a)| a.tasks.is_some());
                let mut header = vec!["value"];
                header.extend(stats_header);
                if with_tasks {
                    header.extend(tasks_header);
                }
                wtr.write_record(&header)?;
                for (key, agg) in table.iter() {
                    let mut row = vec![key.to_string()];
                    row.extend(stats_columns(agg, with_tasks));
                    wtr.write_record(&row)?;
                }
            }
            SweepOutcome::Grid(table) => {
                let with_tasks = table.iter().any(|(_, a)| a.tasks.is_some());
                let mut header = vec!["workers", "threshold"];
                header.extend(stats_header);
                if with_tasks {
                    header.extend(tasks_header);
                }
                wtr.write_record(&header)?;
                for (key, agg) in table.iter() {
                    let mut row = vec![key.workers.to_string(), key.threshold.to_string()];
                    row.extend(stats_columns(agg, with_tasks));
                    wtr.write_record(&row)?;
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write every run of `sweep` into `dir`, returning the written paths
    pub fn export_sweep(sweep: &SweepResults, dir: &Path) -> Result<Vec<PathBuf>> {
        let multi = sweep.runs.len() > 1;
        sweep
            .runs
            .iter()
            .map(|run| {
                let name = match run.size {
                    Some(n) if multi => format!("{}_n{n}.csv", sweep.spec.id),
                    _ => format!("{}.csv", sweep.spec.id),
                };
                let path = dir.join(name);
                Self::export_outcome(&run.outcome, &path)?;
                Ok(path)
            })
            .collect()
    }

    /// Write the best-configuration comparison
    pub fn export_comparison(entries: &[ComparisonEntry], path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut wtr = Writer::from_writer(file);

        wtr.write_record(["strategy", "configuration", "mean_ms", "stddev_ms"])?;
        for entry in entries {
            wtr.write_record([
                entry.strategy.clone(),
                entry.label.clone(),
                format!("{:.3}", entry.mean),
                format!("{:.3}", entry.stddev),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write every table of a suite run plus the comparison, if any
    pub fn export(results: &SuiteResults, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for sweep in &results.sweeps {
            paths.extend(Self::export_sweep(sweep, dir)?);
        }

        let comparison = results.comparison()?;
        if !comparison.is_empty() {
            let path = dir.join("final_comparison.csv");
            Self::export_comparison(&comparison, &path)?;
            paths.push(path);
        }

        tracing::info!(files = paths.len(), dir = %dir.display(), "CSV export complete");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_bench_core::stats::Summary;
    use sweep_bench_core::{GridKey, ResultTable};
    use tempfile::TempDir;

    fn agg(mean: f64, tasks: Option<f64>) -> Aggregate {
        Aggregate {
            mean,
            stddev: 1.5,
            samples: 10,
            tasks: tasks.map(|t| Summary {
                mean: t,
                stddev: 0.0,
            }),
        }
    }

    fn read(path: &Path) -> Vec<Vec<String>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        rdr.records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_grid_table_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forkjoin.csv");
        let table: ResultTable<GridKey> = [
            (GridKey::new(2, 16), agg(210.0, None)),
            (GridKey::new(1, 16), agg(400.0, None)),
        ]
        .into_iter()
        .collect();

        CsvExporter::export_outcome(&SweepOutcome::Grid(table), &path).unwrap();

        let rows = read(&path);
        assert_eq!(
            rows[0],
            vec!["workers", "threshold", "mean_ms", "stddev_ms", "samples"]
        );
        assert_eq!(rows[1], vec!["1", "16", "400.000", "1.500", "10"]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_task_columns_present_for_task_sweeps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("virtual.csv");
        let table: ResultTable<u32> = [(1, agg(90.0, Some(15.0))), (2, agg(80.0, Some(120.0)))]
            .into_iter()
            .collect();

        CsvExporter::export_outcome(&SweepOutcome::Linear(table), &path).unwrap();

        let rows = read(&path);
        assert_eq!(rows[0].last().unwrap(), "tasks_stddev");
        assert_eq!(rows[2][4], "120.000");
    }

    #[test]
    fn test_comparison_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("final_comparison.csv");
        let entries = vec![ComparisonEntry {
            label: "ForkJoin (8, th=32)".into(),
            strategy: "ForkJoin".into(),
            mean: 61.25,
            stddev: 2.0,
        }];

        CsvExporter::export_comparison(&entries, &path).unwrap();

        let rows = read(&path);
        assert_eq!(rows[1], vec!["ForkJoin", "ForkJoin (8, th=32)", "61.250", "2.000"]);
    }
}
