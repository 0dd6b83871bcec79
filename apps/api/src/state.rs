use std::sync::Arc;

use crate::analytics::source::JobRecordSource;
use crate::config::Config;
use crate::market::MarketIntelClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable record source. Default: PgJobSource over the `jobs` table.
    pub records: Arc<dyn JobRecordSource>,
    /// `None` when no API key is configured; the endpoint then answers 503.
    pub market_intel: Option<MarketIntelClient>,
}
