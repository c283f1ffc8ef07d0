use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Instant;

use ab_compiler::CompileOptions;
use ab_core::RuleSet;

use crate::rules;

pub const DEFAULT_SEED: u32 = 0xc0ffee;

pub struct BenchOptions {
    pub rules_path: PathBuf,
    pub urls_path: Option<PathBuf>,
    pub urls: Vec<String>,
    pub compile: CompileOptions,
    pub iterations: usize,
    pub synthetic: usize,
    pub seed: u32,
}

struct BenchResult {
    queries: usize,
    matched: usize,
    total_ms: f64,
    avg_us: f64,
    p50_us: f64,
    p95_us: f64,
    p99_us: f64,
    ops_per_sec: u64,
}

pub fn run(opts: BenchOptions) -> Result<(), String> {
    let (rule_set, report, stats) = rules::compile_file(&opts.rules_path, &opts.compile)?;
    println!(
        "Compiled '{}': {} rules ({} skipped, {} unsupported) in {:.1}ms (read {:.1}ms, {} bytes)",
        opts.rules_path.display(),
        report.rules,
        report.skipped(),
        report.unsupported(),
        stats.compile_ms,
        stats.read_ms,
        stats.bytes,
    );

    let mut urls = opts.urls;
    if let Some(path) = &opts.urls_path {
        urls.extend(rules::read_url_list(path)?);
    }
    if urls.is_empty() {
        urls = generate_urls(opts.synthetic.max(1), opts.seed);
        println!("Generated {} synthetic URLs (seed {:#x})", urls.len(), opts.seed);
    }

    warmup(&rule_set, &urls);
    let result = run_batched(&rule_set, &urls, opts.iterations.max(1));
    println!("{}", format_result(&result));

    Ok(())
}

fn warmup(rule_set: &RuleSet, urls: &[String]) {
    for _ in 0..10 {
        for url in urls {
            let _ = rule_set.get_data(url);
        }
    }
}

fn run_batched(rule_set: &RuleSet, urls: &[String], iterations: usize) -> BenchResult {
    let mut latencies = Vec::with_capacity(urls.len() * iterations);
    let mut matched = 0usize;

    for _ in 0..iterations {
        for url in urls {
            let start = Instant::now();
            let data = rule_set.get_data(url);
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
            if !data.is_empty() {
                matched += 1;
            }
        }
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let queries = latencies.len();
    let total_us: f64 = latencies.iter().sum();
    let total_ms = total_us / 1000.0;

    BenchResult {
        queries,
        matched,
        total_ms,
        avg_us: if queries == 0 { 0.0 } else { total_us / queries as f64 },
        p50_us: percentile(&latencies, 0.50),
        p95_us: percentile(&latencies, 0.95),
        p99_us: percentile(&latencies, 0.99),
        ops_per_sec: if total_ms > 0.0 { (queries as f64 / (total_ms / 1000.0)) as u64 } else { 0 },
    }
}

fn format_result(result: &BenchResult) -> String {
    format!(
        "get_data:\n  Queries:     {} ({} with output)\n  Total time:  {:.2}ms\n  Avg latency: {:.2}μs\n  P50 latency: {:.2}μs\n  P95 latency: {:.2}μs\n  P99 latency: {:.2}μs\n  Throughput:  {} ops/sec",
        result.queries,
        result.matched,
        result.total_ms,
        result.avg_us,
        result.p50_us,
        result.p95_us,
        result.p99_us,
        result.ops_per_sec,
    )
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

fn create_rng(seed: u32) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state as f64) / (u32::MAX as f64)
    }
}

fn pick<'a>(items: &[&'a str], rand: &mut impl FnMut() -> f64) -> &'a str {
    let idx = (rand() * items.len() as f64).floor() as usize;
    items[idx.min(items.len() - 1)]
}

/// Page URLs over a mix of popular and long-tail hosts.
fn generate_urls(count: usize, seed: u32) -> Vec<String> {
    const HOSTS: &[&str] = &[
        "example.com",
        "www.example.com",
        "news.example.org",
        "video.example.net",
        "shop.example.co.uk",
        "blog.webkit.org",
        "m.social.example",
        "cdn.static.example.com",
    ];
    const PATHS: &[&str] = &[
        "/",
        "/index.html",
        "/article/2024/10/some-long-headline-here",
        "/watch?v=dQw4w9WgXcQ",
        "/search?q=content+blocker",
        "/ads/banner-728x90.html",
        "/product/12345?ref=homepage&utm_source=newsletter",
    ];

    let mut rand = create_rng(seed);
    (0..count)
        .map(|_| {
            let scheme = if rand() < 0.9 { "https" } else { "http" };
            format!("{}://{}{}", scheme, pick(HOSTS, &mut rand), pick(PATHS, &mut rand))
        })
        .collect()
}
