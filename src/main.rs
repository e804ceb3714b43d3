use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use forecast_core::Config;
use forecast_icons::{CachedImage, HttpImageFetcher, ImageCacheLoader, MemoryImageCache};
use forecast_screen::{ForecastScreen, ScreenAction};
use forecast_weather::{IconUrlBuilder, OfflineForecastSource};

const PUMP_TIMEOUT: Duration = Duration::from_secs(30);

fn describe_icon(icon: &Option<CachedImage>) -> String {
    match icon {
        Some(image) => format!("[{}x{}]", image.width(), image.height()),
        None => "[no icon]".to_string(),
    }
}

fn main() -> Result<()> {
    forecast_core::init()?;

    let config = Config::load_validated().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("{} ({})", e.user_message(), e)
    })?;

    let snapshot_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.forecast.snapshot_path.clone())
        .context("No forecast snapshot given; pass a path or set forecast.snapshot_path")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let fetcher = HttpImageFetcher::from_config(&config.icons)
        .context("Failed to build HTTP client for icons")?;
    let cache = MemoryImageCache::with_max_entries(config.icons.max_entries);
    let loader = ImageCacheLoader::new(
        Arc::new(cache),
        Arc::new(fetcher),
        runtime.handle().clone(),
    );
    let icon_urls = IconUrlBuilder::new(&config.icons.base_url)
        .with_context(|| format!("Invalid icon base URL {}", config.icons.base_url))?;
    let source = OfflineForecastSource::new(snapshot_path);

    let mut screen = ForecastScreen::new(
        Arc::new(source),
        loader,
        icon_urls,
        runtime.handle().clone(),
    )
    .with_date_format(config.forecast.date_format.clone());

    tracing::info!("Forecast started");

    screen.dispatch(ScreenAction::Refresh);
    if !screen.pump_until_idle(PUMP_TIMEOUT) {
        anyhow::bail!("Timed out loading the forecast");
    }

    if let Some(prompt) = screen.prompt() {
        println!("{}: {}", prompt.title(), prompt.message());
        return Ok(());
    }
    if let Some(message) = screen.last_error() {
        anyhow::bail!("{}", message);
    }

    // first pass starts the icon downloads
    let _ = screen.header();
    for index in 0..screen.row_count() {
        let _ = screen.row(index);
    }
    if !screen.pump_until_idle(PUMP_TIMEOUT) {
        tracing::warn!("Some icons are still downloading");
    }

    if let Some(header) = screen.header() {
        println!("{}", header.address);
        println!(
            "  {}  {}  {}",
            header.temperature,
            header.temperature_range,
            describe_icon(&header.icon)
        );
    }
    for index in 0..screen.row_count() {
        if let Some(row) = screen.row(index) {
            println!(
                "{}  {:>7}  {}",
                row.date,
                row.temperature,
                describe_icon(&row.icon)
            );
        }
    }

    Ok(())
}
