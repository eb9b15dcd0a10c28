use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use market_dashboard::services::ohlcv_fetcher::{FetchParams, FetchState, OhlcvFetcher};
use market_dashboard::services::sentiment_service::SentimentClient;
use market_dashboard::utils::config::UpstreamConfig;
use market_dashboard::utils::logging;
use market_dashboard::utils::upstream::UpstreamClient;

/// 从后端拉取一只股票的 K 线并打印，可选附带盘前情绪
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base url
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    backend_url: String,

    /// Company code or compound ticker, e.g. NETWEB or NSE:NETWEB-EQ
    #[arg(long)]
    company: String,

    #[arg(long, default_value = "NSE")]
    exchange: String,

    /// 1m, 5m, 15m, 30m, 1h or 1d
    #[arg(long, default_value = "1m")]
    interval: String,

    /// Start date or timestamp; omit both bounds to fetch everything
    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,

    /// Comma separated, e.g. sma_20,ema_9,rsi_14
    #[arg(long, value_delimiter = ',')]
    indicators: Vec<String>,

    /// Also look up premarket sentiment at this base url
    #[arg(long)]
    sentiment_url: Option<String>,

    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init_logging();
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    let backend = UpstreamClient::new("backend", &UpstreamConfig::new(&cli.backend_url, timeout))
        .context("Failed to build backend client")?;
    let fetcher = OhlcvFetcher::new(backend, FetchParams::default());

    let mut rx = fetcher.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                FetchState::Idle => tracing::info!("idle"),
                FetchState::Loading => tracing::info!("loading"),
                FetchState::Success(rows) => tracing::info!("received {} rows", rows.len()),
                FetchState::Error { message } => tracing::warn!("fetch failed: {}", message),
            }
        }
    });

    let company = market_dashboard::utils::ticker::extract_symbol(&cli.company);
    let params = FetchParams {
        company_code: Some(company.clone()),
        exchange: cli.exchange.clone(),
        start: cli.start.clone(),
        end: cli.end.clone(),
        interval: cli.interval.clone(),
        indicators: cli.indicators.clone(),
    };

    let outcome = fetcher.set_params(params).await;
    match outcome {
        Some(FetchState::Success(rows)) => {
            for bar in &rows {
                let indicators: Vec<String> = bar
                    .indicators
                    .iter()
                    .map(|(name, v)| match v {
                        Some(v) => format!("{}={:.2}", name, v),
                        None => format!("{}=-", name),
                    })
                    .collect();
                println!(
                    "{} O={} H={} L={} C={} V={} {}",
                    bar.interval_start,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    indicators.join(" ")
                );
            }
        }
        Some(FetchState::Error { message }) => anyhow::bail!("failed to fetch {}: {}", company, message),
        _ => anyhow::bail!("no result for {}", company),
    }

    if let Some(url) = &cli.sentiment_url {
        let client = UpstreamClient::new("sentiment", &UpstreamConfig::new(url, timeout))
            .context("Failed to build sentiment client")?;
        let sentiment = SentimentClient::new(client).fetch_sentiment(&cli.company).await;
        println!("sentiment: {}", sentiment);
    }

    drop(fetcher);
    let _ = watcher.await;
    Ok(())
}
