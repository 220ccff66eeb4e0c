use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docketcrawl_core::{config::parse_category, CrawlConfig};
use docketcrawl_local::{crawl, entities, LocalFetcher};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser, Debug)]
#[command(name = "docketcrawl")]
#[command(about = "Crawl a public case registry into structured case records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan every category, fetch each case's detail page, and write the records.
    Crawl(CrawlCmd),
    /// Run entity extraction over a single title (json).
    Analyze(AnalyzeCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug, Default)]
struct CrawlCmd {
    /// JSON config file; flags and env vars override its fields.
    #[arg(long, env = "DOCKETCRAWL_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "DOCKETCRAWL_BASE_URL")]
    base_url: Option<String>,
    /// `key=label`, repeatable. Replaces the configured category set.
    #[arg(long = "category", value_name = "KEY=LABEL")]
    categories: Vec<String>,
    /// Listing pages to scan per category at most.
    #[arg(long, env = "DOCKETCRAWL_MAX_PAGES")]
    max_pages: Option<u32>,
    /// Detail fetches in flight at once.
    #[arg(long, env = "DOCKETCRAWL_CONCURRENCY")]
    concurrency: Option<usize>,
    #[arg(long, env = "DOCKETCRAWL_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    #[arg(long, env = "DOCKETCRAWL_MAX_BYTES")]
    max_bytes: Option<u64>,
    #[arg(long, env = "DOCKETCRAWL_USER_AGENT")]
    user_agent: Option<String>,
    /// Write the records as a JSON array.
    #[arg(long)]
    out_json: Option<PathBuf>,
    /// Write the records as a JS assignment (`const <var> = [...];`).
    #[arg(long)]
    out_js: Option<PathBuf>,
    #[arg(long, default_value = output::DEFAULT_JS_VAR)]
    js_var: String,
}

#[derive(clap::Args, Debug)]
struct AnalyzeCmd {
    #[arg(long)]
    title: String,
    /// Fallback action when no action keyword is present.
    #[arg(long, default_value = "")]
    category_label: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

/// Defaults, then the config file, then flags/env.
fn build_config(args: &CrawlCmd) -> Result<CrawlConfig> {
    let mut cfg = match &args.config {
        Some(p) => {
            let txt = std::fs::read_to_string(p)
                .with_context(|| format!("read config {}", p.display()))?;
            serde_json::from_str::<CrawlConfig>(&txt)
                .with_context(|| format!("parse config {}", p.display()))?
        }
        None => CrawlConfig::default(),
    };
    if let Some(v) = &args.base_url {
        cfg.base_url = v.clone();
    }
    if !args.categories.is_empty() {
        cfg.categories = args
            .categories
            .iter()
            .map(|s| parse_category(s))
            .collect::<docketcrawl_core::Result<_>>()?;
    }
    if let Some(v) = args.max_pages {
        cfg.max_pages = v;
    }
    if let Some(v) = args.concurrency {
        cfg.concurrency = v;
    }
    if let Some(v) = args.timeout_ms {
        cfg.timeout_ms = v;
    }
    if let Some(v) = args.max_bytes {
        cfg.max_bytes = Some(v);
    }
    if let Some(v) = &args.user_agent {
        cfg.user_agent = v.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

async fn run_crawl(args: CrawlCmd) -> Result<()> {
    let cfg = build_config(&args)?;
    let fetcher = LocalFetcher::new(&cfg.user_agent)?;
    let report = crawl(&fetcher, &cfg).await?;

    for f in &report.page_failures {
        tracing::debug!(category = %f.category_key, page = f.page, error = %f.error, "page failure");
    }
    tracing::info!(
        records = report.records.len(),
        listed = report.listed,
        unique = report.unique,
        page_failures = report.page_failures.len(),
        task_failures = report.task_failures.len(),
        "done"
    );

    if args.out_json.is_none() && args.out_js.is_none() {
        println!("{}", output::render_json(&report.records)?);
        return Ok(());
    }
    if let Some(p) = &args.out_json {
        output::write_file(p, &output::render_json(&report.records)?)?;
    }
    if let Some(p) = &args.out_js {
        output::write_file(p, &output::render_js(&report.records, &args.js_var)?)?;
    }
    let summary = serde_json::json!({
        "schema_version": 1,
        "kind": "crawl",
        "ok": true,
        "records": report.records.len(),
        "listed": report.listed,
        "unique": report.unique,
        "page_failures": report.page_failures.len(),
        "task_failures": report.task_failures.len(),
        "out_json": args.out_json,
        "out_js": args.out_js,
    });
    println!("{summary}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Crawl(args) => run_crawl(args).await?,
        Commands::Analyze(args) => {
            let ex = entities::extract(&args.title, &args.category_label);
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "analyze",
                "title": args.title,
                "strategy": ex.strategy.map(|s| format!("{s:?}")),
                "mentions": ex.mentions,
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "docketcrawl",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("docketcrawl {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_config_file_over_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"base_url": "https://mirror.example", "max_pages": 3, "concurrency": 4}}"#
        )
        .unwrap();
        let args = CrawlCmd {
            config: Some(f.path().to_path_buf()),
            concurrency: Some(6),
            js_var: output::DEFAULT_JS_VAR.to_string(),
            ..CrawlCmd::default()
        };
        let cfg = build_config(&args).unwrap();
        assert_eq!(cfg.base_url, "https://mirror.example");
        assert_eq!(cfg.max_pages, 3);
        assert_eq!(cfg.concurrency, 6);
        assert_eq!(cfg.timeout_ms, CrawlConfig::default().timeout_ms);
        assert_eq!(cfg.categories.len(), 4);
    }

    #[test]
    fn category_flags_replace_the_set() {
        let args = CrawlCmd {
            categories: vec!["meetings=委員會議".to_string()],
            ..CrawlCmd::default()
        };
        let cfg = build_config(&args).unwrap();
        assert_eq!(cfg.categories.len(), 1);
        assert_eq!(cfg.categories[0].key, "meetings");
        assert_eq!(cfg.categories[0].label, "委員會議");
    }

    #[test]
    fn invalid_values_fail_before_any_fetch() {
        let args = CrawlCmd {
            max_pages: Some(0),
            ..CrawlCmd::default()
        };
        assert!(build_config(&args).is_err());

        let args = CrawlCmd {
            categories: vec!["no-label".to_string()],
            ..CrawlCmd::default()
        };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn cli_parses_repeated_categories() {
        let cli = Cli::try_parse_from([
            "docketcrawl",
            "crawl",
            "--category",
            "hearings=聽證程序",
            "--category",
            "litigations=相關訴訟",
        ])
        .unwrap();
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(args.categories.len(), 2);
        assert_eq!(args.js_var, "cipasFullData");
    }
}
