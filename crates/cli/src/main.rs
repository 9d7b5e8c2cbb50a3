//! Cache hierarchy simulator CLI.
//!
//! This binary runs one simulated test per configuration file. It
//! performs:
//! 1. **Single runs:** Load a configuration, drive its trace, print the
//!    report.
//! 2. **Comparisons:** Run every configuration and tabulate the metrics
//!    side-by-side (`--compare`), optionally persisted as CSV (`--csv`).
//!
//! Exit code 0 on success, 1 when any configuration or trace fails. In
//! comparison mode a failing test is reported and skipped so the
//! remaining tests still run.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::error::SimError;
use cachesim_core::metrics::SimReport;
use cachesim_core::{SimConfig, Simulator, Trace};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    version,
    about = "Trace-driven cache hierarchy simulator",
    long_about = "Run one or more cache hierarchy configurations against their traces.\n\n\
        Each configuration file describes a full test: the cache tower, the\n\
        main-memory latency, and the trace to drive through it.\n\n\
        Examples:\n  \
        cachesim configs/l1-only.json\n  \
        cachesim --compare configs/*.json\n  \
        cachesim --compare --csv results.csv configs/*.json"
)]
struct Cli {
    /// Configuration files, one test each.
    #[arg(required = true)]
    configs: Vec<PathBuf>,

    /// Run every configuration and print a side-by-side comparison.
    #[arg(long)]
    compare: bool,

    /// Write the comparison table as CSV to this path.
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let tabulate = cli.compare || cli.csv.is_some();
    let mut reports = Vec::new();
    let mut failed = false;

    for path in &cli.configs {
        match run_test(path) {
            Ok(report) => {
                tracing::debug!(test = %report.test_name, amat = report.amat, "test complete");
                if !tabulate {
                    report.print();
                }
                reports.push(report);
            }
            Err(err) => {
                eprintln!("error: {}: {}", path.display(), render(&err));
                failed = true;
                if !tabulate {
                    process::exit(1);
                }
            }
        }
    }

    if tabulate && !reports.is_empty() {
        let (header, rows) = build_rows(&reports);
        print_table(&header, &rows);
        if let Some(csv_path) = &cli.csv {
            if let Err(err) = write_csv(csv_path, &header, &rows) {
                eprintln!("error: failed to write {}: {err}", csv_path.display());
                failed = true;
            }
        }
    }

    process::exit(i32::from(failed));
}

/// Loads one configuration and runs its trace to completion.
fn run_test(path: &PathBuf) -> Result<SimReport, SimError> {
    let config = SimConfig::from_file(path)?;
    let mut simulator = Simulator::from_config(&config)?;
    let mut trace = Trace::from_spec(&config.trace)?;
    Ok(simulator.run(&mut trace)?)
}

/// Renders an error with its source chain.
fn render(err: &SimError) -> String {
    use std::error::Error;
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Builds the comparison header and rows: `Metric`, one column per test,
/// then the unit (which also carries string-valued metric labels).
fn build_rows(reports: &[SimReport]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = vec!["Metric".to_owned()];
    header.extend(reports.iter().map(|r| r.test_name.clone()));
    header.push("Unit".to_owned());

    let max_levels = reports.iter().map(|r| r.levels.len()).max().unwrap_or(0);
    let mut rows = Vec::new();

    // One closure per row keeps the per-test "missing level" handling in
    // a single place.
    let mut push = |metric: String, unit: &str, value: &dyn Fn(&SimReport) -> String| {
        let mut row = vec![metric];
        row.extend(reports.iter().map(|r| value(r)));
        row.push(unit.to_owned());
        rows.push(row);
    };

    for i in 0..max_levels {
        let label = format!("L{}", i + 1);
        push(format!("{label} hits"), "count", &move |r: &SimReport| {
            r.levels.get(i).map_or_else(|| "-".into(), |l| l.hits.to_string())
        });
        push(format!("{label} misses"), "count", &move |r: &SimReport| {
            r.levels.get(i).map_or_else(|| "-".into(), |l| l.misses.to_string())
        });
        push(format!("{label} hit rate"), "%", &move |r: &SimReport| {
            r.levels
                .get(i)
                .map_or_else(|| "-".into(), |l| format!("{:.2}", l.hit_rate * 100.0))
        });
        push(
            format!("{label} AMAT contribution"),
            "cycles",
            &move |r: &SimReport| {
                r.levels
                    .get(i)
                    .map_or_else(|| "-".into(), |l| format!("{:.4}", l.amat_contribution))
            },
        );
        if i > 0 {
            push(
                format!("{label} inclusion policy"),
                "label",
                &move |r: &SimReport| {
                    r.levels
                        .get(i)
                        .map_or_else(|| "-".into(), |l| l.inclusion.to_string())
                },
            );
        }
    }

    push("AMAT".into(), "cycles", &|r: &SimReport| format!("{:.4}", r.amat));
    push("Memory reads".into(), "count", &|r: &SimReport| {
        r.memory_reads.to_string()
    });
    push("Memory writes".into(), "count", &|r: &SimReport| {
        r.memory_writes.to_string()
    });
    push("Total accesses".into(), "count", &|r: &SimReport| {
        r.total_accesses.to_string()
    });
    push("Simulated cycles".into(), "cycles", &|r: &SimReport| {
        r.sim_cycles.to_string()
    });
    push("Execution time".into(), "s", &|r: &SimReport| {
        format!("{:.4}", r.elapsed.as_secs_f64())
    });

    (header, rows)
}

/// Prints the comparison as an aligned table.
fn print_table(header: &[String], rows: &[Vec<String>]) {
    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let print_row = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.join("  "));
    };

    println!();
    print_row(header);
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in rows {
        print_row(row);
    }
}

/// Writes the comparison table as CSV.
fn write_csv(path: &PathBuf, header: &[String], rows: &[Vec<String>]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
