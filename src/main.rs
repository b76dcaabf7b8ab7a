use clap::Parser;
use news_atlas::geocode::{BatchGeocoder, LocationBatch, NominatimOracle};
use news_atlas::server;
use std::io::Read;

/// News Atlas — resolve extracted place names to map coordinates.
///
/// Reads a batch of location mentions (the six-array JSON document the
/// extraction step produces) and resolves each row to a coordinate and a
/// display label via OpenStreetMap Nominatim.
///
/// Examples:
///   atlas batch.json
///   atlas --input batch.json --lang fr
///   cat batch.json | atlas --stdin
///   atlas --serve --port 8080
#[derive(Parser)]
#[command(name = "atlas", version, about, long_about = None)]
struct Cli {
    /// Batch file (positional). Example: atlas batch.json
    #[arg(index = 1)]
    input_positional: Option<String>,

    /// Batch file (named). Example: --input batch.json
    #[arg(long)]
    input: Option<String>,

    /// Read the batch document from stdin.
    #[arg(long)]
    stdin: bool,

    /// Oracle locale for display names (accept-language).
    #[arg(long, default_value = "en")]
    lang: String,

    /// User-Agent sent to Nominatim (its usage policy requires one).
    #[arg(long, default_value = "NewsAtlas/0.3 (article-location-mapper)")]
    user_agent: String,

    /// Bypass the on-disk response cache: every query goes to the wire.
    #[arg(long)]
    no_cache: bool,

    /// Start the HTTP API instead of processing a batch.
    #[arg(long)]
    serve: bool,

    /// Bind host for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port for --serve.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();

    // ── Build the geocoder ──────────────────────────────────────

    let oracle = if cli.no_cache {
        NominatimOracle::without_cache(&cli.user_agent)
    } else {
        NominatimOracle::new(&cli.user_agent)
    };
    let geocoder = BatchGeocoder::new(oracle).with_language(&cli.lang);

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, cli.port, geocoder));
        return;
    }

    // ── Batch mode ──────────────────────────────────────────────

    let raw = read_batch_input(&cli);

    let batch: LocationBatch = serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("Error: Invalid batch document: {}", e);
        std::process::exit(1);
    });

    let table = geocoder.resolve_batch(&batch).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let located = table.iter().filter(|r| r.lat.is_some()).count();
    eprintln!("  Resolved {} of {} mentions.", located, table.len());

    // JSON table to stdout
    println!("{}", serde_json::to_string_pretty(&table).unwrap());
}

fn read_batch_input(cli: &Cli) -> String {
    // Priority: --input > positional file > --stdin > error

    if let Some(ref path) = cli.input {
        return std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error: Cannot read '{}': {}", path, e);
            std::process::exit(1);
        });
    }

    if let Some(ref path) = cli.input_positional {
        return std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error: Cannot read '{}': {}", path, e);
            std::process::exit(1);
        });
    }

    if cli.stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
            eprintln!("Error: Cannot read stdin: {}", e);
            std::process::exit(1);
        });
        return buf;
    }

    eprintln!("Error: No input specified.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  atlas batch.json");
    eprintln!("  atlas --input batch.json");
    eprintln!("  cat batch.json | atlas --stdin");
    eprintln!("  atlas --serve --port 8080");
    std::process::exit(1);
}
