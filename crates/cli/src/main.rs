use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use feedeck_column::{CacheBag, Column, ColumnHost, MemoryTagResolver};
use feedeck_core::catalog;
use feedeck_core::config::ColumnConfig;
use feedeck_core::items::{ClipItem, FeedItem, LiveItem, VideoItem};
use feedeck_core::settings::{ColumnSettings, GlobalSettings};
use feedeck_core::ContentKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "feedeckctl", version, about = "Filter, sort and summarize feed columns")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

/// Settings sources shared by the column commands.
#[derive(Args, Debug)]
struct ColumnArgs {
    /// Content kind: live, clip or video
    #[arg(long = "kind", value_parser = parse_kind)]
    kind: ContentKind,
    /// Column settings JSON file
    #[arg(long = "settings", env = "FEEDECK_SETTINGS")]
    settings: Option<PathBuf>,
    /// Global settings JSON file
    #[arg(long = "global", env = "FEEDECK_GLOBAL")]
    global: Option<PathBuf>,
    /// Known tag descriptors (JSON array)
    #[arg(long = "tags", env = "FEEDECK_TAGS")]
    tags: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter (and, for live columns, sort) a JSON array of items
    Filter {
        #[command(flatten)]
        column: ColumnArgs,
        /// Items JSON file (array)
        items: PathBuf,
        /// Keep feed order even when the sort option has a comparator
        #[arg(long = "no-sort", action = ArgAction::SetTrue)]
        no_sort: bool,
        /// Report how many items survived each stage
        #[arg(long = "explain", action = ArgAction::SetTrue)]
        explain: bool,
    },
    /// Print the normalized column config
    Config {
        #[command(flatten)]
        column: ColumnArgs,
    },
    /// Print the column subtitles
    Subtitles {
        #[command(flatten)]
        column: ColumnArgs,
    },
    /// List sort options (and clip periods) for a kind
    Sorts {
        #[arg(value_parser = parse_kind)]
        kind: ContentKind,
    },
}

fn parse_kind(s: &str) -> Result<ContentKind, String> {
    ContentKind::from_str(s).map_err(|e| e.to_string())
}

fn init_tracing() {
    let env = std::env::var("FEEDECK_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("FEEDECK_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid FEEDECK_METRICS_ADDR; expected host:port");
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
}

fn read_record<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    match path {
        None => Ok(None),
        Some(p) => {
            let v = read_json(p)?;
            if v.is_null() {
                return Ok(None);
            }
            let rec = serde_json::from_value(v).with_context(|| format!("decoding {}", p.display()))?;
            Ok(Some(rec))
        }
    }
}

/// Items that fail to decode are skipped, not fatal; a non-array file
/// yields no items.
fn read_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let serde_json::Value::Array(raw) = read_json(path)? else {
        warn!(path = %path.display(), "items file is not a JSON array; treating as empty");
        return Ok(Vec::new());
    };
    let total = raw.len();
    let items: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed item");
                None
            }
        })
        .collect();
    debug!(total, decoded = items.len(), "items loaded");
    Ok(items)
}

/// Host for one-shot runs: nothing to persist, redraws are just logged.
struct CliHost;

impl ColumnHost for CliHost {
    fn save_cache(&self, cache: &CacheBag) {
        debug!(keys = cache.len(), "cache save requested");
    }

    fn refresh(&self) {
        debug!("refresh requested");
    }
}

fn build_column(args: &ColumnArgs) -> Result<(Column<CliHost>, Arc<MemoryTagResolver>)> {
    let settings: Option<ColumnSettings> = read_record(args.settings.as_deref())?;
    let global: Option<GlobalSettings> = read_record(args.global.as_deref())?;
    let resolver = Arc::new(MemoryTagResolver::new());
    if let Some(p) = args.tags.as_deref() {
        let n = resolver.load_json(read_json(p)?).with_context(|| format!("decoding tags in {}", p.display()))?;
        info!(tags = n, "tag descriptors loaded");
    }
    if resolver.is_empty() {
        debug!("no tag descriptors known; tag labels and language matches stay unresolved");
    }
    let column = Column::new(args.kind, settings, global, Arc::new(CliHost), resolver.clone());
    Ok((column, resolver))
}

fn print_json<T: Serialize + ?Sized>(v: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

fn run_filter<T>(column: &Column<CliHost>, items_path: &Path, no_sort: bool, explain: bool, output: Output) -> Result<()>
where
    T: FeedItem + Serialize + DeserializeOwned,
{
    let items: Vec<T> = read_items(items_path)?;
    column.memorize_tags(&items);
    let (mut visible, report) = column.filter_items_with_report(items);
    if !no_sort && column.kind().client_sorts() {
        visible = column.sort_items(visible)?;
    }
    info!(total = report.total, kept = report.kept(), "filter done");

    match output {
        Output::Human => {
            if explain {
                println!(
                    "total={} structure={} reruns={} types={} categories={} tags={}",
                    report.total,
                    report.after_structure,
                    report.after_reruns,
                    report.after_broadcast_types,
                    report.after_categories,
                    report.after_tags
                );
            }
            println!("{:<14} {:>8}  {:<24} CREATED", "ID", "VIEWERS", "CATEGORY");
            for item in &visible {
                let game = item.game().and_then(|g| g.name.as_deref()).unwrap_or("-");
                println!("{:<14} {:>8}  {:<24} {}", item.id(), item.viewers(), game, item.created_at().unwrap_or("-"));
            }
        }
        Output::Json => {
            if explain {
                print_json(&serde_json::json!({ "items": visible, "explain": report }))?;
            } else {
                print_json(&visible)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Filter { column, items, no_sort, explain } => {
            info!(kind = %column.kind, items = %items.display(), "filter invoked");
            let (col, _resolver) = build_column(&column)?;
            if !col.can_run() {
                warn!(kind = %column.kind, "column settings exclude every item");
            }
            match column.kind {
                ContentKind::Live => run_filter::<LiveItem>(&col, &items, no_sort, explain, cli.output)?,
                ContentKind::Clip => run_filter::<ClipItem>(&col, &items, no_sort, explain, cli.output)?,
                ContentKind::Video => run_filter::<VideoItem>(&col, &items, no_sort, explain, cli.output)?,
            }
        }
        Commands::Config { column } => {
            let (col, _resolver) = build_column(&column)?;
            let config: Arc<ColumnConfig> = col.config();
            print_json(config.as_ref())?;
        }
        Commands::Subtitles { column } => {
            let (col, resolver) = build_column(&column)?;
            let subs = col.subtitles().unwrap_or_default();
            match cli.output {
                Output::Human => {
                    for s in &subs {
                        match &s.tip {
                            Some(tip) => println!("[{}] {}  ({})", s.icon, s.text, tip),
                            None => println!("[{}] {}", s.icon, s.text),
                        }
                    }
                }
                Output::Json => print_json(&subs)?,
            }
            let missing = resolver.wanted();
            if !missing.is_empty() {
                warn!(missing = ?missing, "some tags are unresolved; labels omitted");
            }
        }
        Commands::Sorts { kind } => match cli.output {
            Output::Human => {
                for d in catalog::sort_options(kind) {
                    let local = if d.client_sort.is_some() { "client" } else { "feed" };
                    println!("{:<18} {:<24} {}", d.key, d.title, local);
                }
                for p in catalog::periods(kind) {
                    println!("period {:<11} {}", p.key, p.title);
                }
            }
            Output::Json => print_json(&serde_json::json!({
                "sorts": catalog::sort_options(kind),
                "periods": catalog::periods(kind),
            }))?,
        },
    }
    Ok(())
}
