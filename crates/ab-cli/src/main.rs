//! Advanced Blocking CLI
//!
//! CLI tool for inspecting rule lists and querying page data.

mod bench;
mod rules;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use ab_compiler::{CompileOptions, DiagnosticKind, Strictness};
use ab_core::ScanOutcome;

#[derive(Parser)]
#[command(name = "ab-cli")]
#[command(about = "Advanced Blocking rule list tools")]
struct Cli {
    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page data selected for one or more URLs
    Match {
        /// JSON rule list
        #[arg(short, long)]
        rules: PathBuf,

        /// Page URL (repeatable)
        #[arg(short, long, required = true)]
        url: Vec<String>,

        /// Reject the whole list on the first invalid entry
        #[arg(long)]
        strict: bool,

        /// Compile every url-filter up front
        #[arg(long)]
        eager: bool,

        /// Also print which rules contributed and how the scan ended
        #[arg(long)]
        explain: bool,
    },

    /// Compile a rule list and print load diagnostics and index statistics
    Info {
        /// JSON rule list
        #[arg(short, long)]
        rules: PathBuf,

        /// Reject the whole list on the first invalid entry
        #[arg(long)]
        strict: bool,

        /// Shingle length used for the shortcut index
        #[arg(long, default_value_t = ab_core::DEFAULT_SHORTCUT_LENGTH)]
        shortcut_length: usize,
    },

    /// Measure get_data latency
    Bench {
        /// JSON rule list
        #[arg(short, long)]
        rules: PathBuf,

        /// Page URL (repeatable)
        #[arg(short, long)]
        url: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        urls: Option<PathBuf>,

        /// Passes over the URL set
        #[arg(long, default_value_t = 100)]
        iterations: usize,

        /// Synthetic URLs generated when no URL is given
        #[arg(long, default_value_t = 1000)]
        synthetic: usize,

        /// Seed for synthetic URLs
        #[arg(long, default_value_t = bench::DEFAULT_SEED)]
        seed: u32,

        /// Compile every url-filter up front
        #[arg(long)]
        eager: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Match {
            rules,
            url,
            strict,
            eager,
            explain,
        } => cmd_match(&rules, &url, compile_options(strict, eager), explain),
        Commands::Info {
            rules,
            strict,
            shortcut_length,
        } => {
            let options = CompileOptions {
                shortcut_length,
                ..compile_options(strict, false)
            };
            cmd_info(&rules, &options)
        }
        Commands::Bench {
            rules,
            url,
            urls,
            iterations,
            synthetic,
            seed,
            eager,
        } => bench::run(bench::BenchOptions {
            rules_path: rules,
            urls_path: urls,
            urls: url,
            compile: compile_options(false, eager),
            iterations,
            synthetic,
            seed,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn compile_options(strict: bool, eager: bool) -> CompileOptions {
    CompileOptions {
        strictness: if strict { Strictness::Strict } else { Strictness::Lenient },
        eager_patterns: eager,
        ..CompileOptions::default()
    }
}

fn cmd_match(path: &Path, urls: &[String], options: CompileOptions, explain: bool) -> Result<(), String> {
    let (rule_set, report, _) = rules::compile_file(path, &options)?;
    if report.skipped() > 0 {
        log::warn!("{} invalid entries skipped", report.skipped());
    }

    for url in urls {
        let outcome = rule_set.get_data_detailed(url);

        if !explain {
            println!("{}", outcome.data.to_json());
            continue;
        }

        let ended = match outcome.outcome {
            ScanOutcome::Done => "done".to_string(),
            ScanOutcome::Cancelled { rule_idx } => format!("cancelled by rule {}", rule_idx),
        };
        let explained = serde_json::json!({
            "url": url,
            "candidates": outcome.candidates,
            "contributed": outcome.contributed,
            "scan": ended,
            "data": outcome.data,
        });
        println!("{}", explained);
    }

    Ok(())
}

fn cmd_info(path: &Path, options: &CompileOptions) -> Result<(), String> {
    let (rule_set, report, stats) = rules::compile_file(path, options)?;

    println!("Rule list: {}", path.display());
    println!("  Size:        {} bytes ({:.1} KB)", stats.bytes, stats.bytes as f64 / 1024.0);
    println!("  Rules:       {}", report.rules);
    println!("  Skipped:     {}", report.skipped());
    println!("  Unsupported: {}", report.unsupported());
    println!(
        "  Time:        {:.1}ms (read: {:.1}ms, compile: {:.1}ms)",
        stats.read_ms + stats.compile_ms,
        stats.read_ms,
        stats.compile_ms,
    );
    println!();

    let index = rule_set.stats();
    println!("Index (shingle length {}):", rule_set.index().shortcut_length());
    println!("  Shortcut:    {} rules in {} buckets", index.shortcut_rules, index.shortcut_buckets);
    println!("  Domain:      {} entries in {} buckets", index.domain_entries, index.domain_buckets);
    println!("  Fallback:    {} rules", index.fallback_rules);
    println!("  Largest:     {} rules in one bucket", index.largest_bucket);

    if !report.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diagnostic in &report.diagnostics {
            let kind = match diagnostic.kind {
                DiagnosticKind::Skipped => "skipped",
                DiagnosticKind::Unsupported => "unsupported",
            };
            println!("  [{}] {}: {}", diagnostic.index, kind, diagnostic.message);
        }
    }

    Ok(())
}
