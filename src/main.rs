use std::time::Duration;

use tracing::{debug, error, info, warn};
use volume_levels::api::binance::validate_interval;
use volume_levels::api::{BinanceKlinesClient, CsvCandleSource};
use volume_levels::config::{AppConfig, ConfigError, SourceKind};
use volume_levels::logging::{cleanup_old_logs, init_dual_logging, init_simple_logging, log_system_info};
use volume_levels::output::render;
use volume_levels::pipeline::load_and_profile;
use volume_levels::AppError;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Pre-load configuration to get logging settings
    let config = match AppConfig::from_toml(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("⚠️ {} not found, using default configuration", config_path);
            AppConfig::default()
        }
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let _logging_guard = match init_dual_logging(config.logging_config.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("❌ Failed to initialize logging system: {}", e);
            if let Err(e) = init_simple_logging() {
                eprintln!("❌ Console logging unavailable: {}", e);
            }
            warn!("⚠️ Using fallback console-only logging");
            None
        }
    };

    if let Err(e) = cleanup_old_logs(&config.logging_config.log_dir, config.log_cleanup_days) {
        warn!("⚠️ Failed to clean up old log files: {}", e);
    }

    log_system_info();

    info!(
        source = ?config.source.kind,
        symbol = %config.source.symbol,
        timeframe = %config.source.timeframe,
        limit = config.source.limit,
        bin_count = config.profile.bin_count,
        strict = config.profile.strict,
        output = ?config.output.format,
        log_dir = %config.logging_config.log_dir,
        "🔧 Configuration loaded"
    );

    if let Err(e) = run(config).await {
        error!("💥 {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let mut request = config.klines_request();

    let report = match config.source.kind {
        SourceKind::Binance => {
            let mut client = BinanceKlinesClient::new(config.source.base_url.clone())?;
            client.set_min_request_interval(Duration::from_millis(config.source.min_request_interval_ms));

            validate_interval(&request.interval)?;
            let symbol = client.resolve_symbol(&request.symbol).await?;
            if symbol != request.symbol {
                info!("Resolved symbol '{}' to {}", request.symbol, symbol);
            }
            request.symbol = symbol;

            let report = load_and_profile(&mut client, &request, &config.profile).await;
            log_api_usage(&client);
            report?
        }
        SourceKind::Csv => {
            // validate() guarantees the path for csv sources
            let path = config.source.csv_path.clone().unwrap_or_default();
            let mut source = CsvCandleSource::new(path);
            load_and_profile(&mut source, &request, &config.profile).await?
        }
    };

    match report.profile.strongest_level() {
        Some(level) => info!(
            "✅ {} significant levels, strongest at {} (score {})",
            report.profile.levels.len(),
            level.midpoint,
            level.score
        ),
        None => warn!("No significant levels: every bin scored zero"),
    }

    println!("{}", render(&report, config.output.format)?);
    Ok(())
}

fn log_api_usage(client: &BinanceKlinesClient) {
    let stats = client.stats();
    info!(
        requests = stats.requests_made,
        failed = stats.requests_failed,
        rate_limit_hits = stats.rate_limit_hits,
        candles = stats.total_candles_fetched,
        success_rate = stats.success_rate(),
        "📊 Binance API usage"
    );
    if let Some(limit) = client.rate_limit() {
        debug!("Request weight {}/{} per minute", limit.requests_used, limit.requests_limit);
    }
}
