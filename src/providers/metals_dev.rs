//! metals.dev timeseries adapter (provider A, default).
//!
//! One GET per fetch: epoch-second time range, API key in the `x-api-key`
//! header, response is a JSON array of OHLC bars in epoch seconds.

use crate::config::PriceConfig;
use crate::error::{CoreError, Result};
use crate::http::HttpFetch;
use crate::models::{Candle, Interval, PriceFeed, Symbol};
use crate::providers::PriceProvider;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const PROVIDER_NAME: &str = "metals.dev";
const DEFAULT_BASE: &str = "https://api.metals.dev/v1";

const SUB_HOUR_LOOKBACK_SECS: i64 = 30 * 24 * 60 * 60;
const DAILY_LOOKBACK_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    #[serde(default)]
    data: Vec<Bar>,
}

#[derive(Debug, Deserialize)]
struct Bar {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

pub struct MetalsDevProvider {
    config: PriceConfig,
    http: Arc<dyn HttpFetch>,
}

impl MetalsDevProvider {
    pub fn new(config: PriceConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self { config, http }
    }

    fn query_url(&self, symbol: Symbol, interval: Interval, now_secs: i64) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE);
        let lookback = if interval.is_sub_hour() {
            SUB_HOUR_LOOKBACK_SECS
        } else {
            DAILY_LOOKBACK_SECS
        };
        let start = now_secs - lookback;
        format!(
            "{base}/timeseries?symbol={}&interval={}&start_date={start}&end_date={now_secs}",
            symbol.code(),
            interval.code()
        )
    }
}

#[async_trait]
impl PriceProvider for MetalsDevProvider {
    async fn fetch(&self, symbol: Symbol, interval: Interval) -> Result<PriceFeed> {
        let url = self.query_url(symbol, interval, Utc::now().timestamp());
        let response = self
            .http
            .get(&url, &[("x-api-key", &self.config.api_key)])
            .await?;

        if !response.is_success() {
            return Err(CoreError::upstream(
                PROVIDER_NAME,
                Some(response.status),
                format!("timeseries request for {symbol}/{interval} rejected"),
            ));
        }

        let parsed: TimeseriesResponse = serde_json::from_str(&response.body).map_err(|e| {
            CoreError::upstream(PROVIDER_NAME, None, format!("malformed timeseries body: {e}"))
        })?;

        let candles: Vec<Candle> = parsed
            .data
            .into_iter()
            .map(|bar| Candle {
                timestamp_ms: bar.t * 1000,
                open: bar.o,
                high: bar.h,
                low: bar.l,
                close: bar.c,
            })
            .collect();

        debug!(%symbol, %interval, bars = candles.len(), "metals.dev timeseries fetched");
        Ok(PriceFeed::from_candles(symbol, interval, candles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::ProviderKind;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct CannedHttp {
        responses: Mutex<Vec<HttpResponse>>,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl CannedHttp {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpFetch for CannedHttp {
        async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
            self.seen.lock().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            Ok(self.responses.lock().remove(0))
        }
    }

    fn config() -> PriceConfig {
        PriceConfig {
            provider: ProviderKind::MetalsDev,
            api_key: "test-key".into(),
            base_url: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn parses_epoch_second_bars_into_ms_candles() {
        let body = r#"{"data":[{"t":60,"o":10.5,"h":12.0,"l":10.0,"c":11.8},{"t":0,"o":10.0,"h":11.0,"l":9.0,"c":10.5}]}"#;
        let http = Arc::new(CannedHttp::new(vec![HttpResponse {
            status: 200,
            body: body.into(),
        }]));
        let provider = MetalsDevProvider::new(config(), http.clone());

        let feed = provider.fetch(Symbol::Silver, Interval::M1).await.unwrap();
        assert_eq!(feed.candles.len(), 2);
        // Newest-first input gets normalized.
        assert_eq!(feed.candles[0].timestamp_ms, 0);
        assert_eq!(feed.candles[1].timestamp_ms, 60_000);
        assert_eq!(feed.last, 11.8);
        assert_eq!(feed.prev_close, 10.5);

        let seen = http.seen.lock();
        let (url, headers) = &seen[0];
        assert!(url.starts_with("https://api.metals.dev/v1/timeseries?symbol=XAGUSD&interval=1m"));
        assert_eq!(headers[0], ("x-api-key".to_string(), "test-key".to_string()));
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error_with_payload() {
        let http = Arc::new(CannedHttp::new(vec![HttpResponse {
            status: 429,
            body: "slow down".into(),
        }]));
        let provider = MetalsDevProvider::new(config(), http);

        let err = provider.fetch(Symbol::Gold, Interval::D1).await.unwrap_err();
        match err {
            CoreError::Upstream { status, .. } => assert_eq!(status, Some(429)),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_upstream_error() {
        let http = Arc::new(CannedHttp::new(vec![HttpResponse {
            status: 200,
            body: "not json".into(),
        }]));
        let provider = MetalsDevProvider::new(config(), http);

        let err = provider.fetch(Symbol::Gold, Interval::H1).await.unwrap_err();
        assert!(matches!(err, CoreError::Upstream { status: None, .. }));
    }

    #[test]
    fn lookback_depends_on_granularity() {
        let http = Arc::new(CannedHttp::new(vec![]));
        let provider = MetalsDevProvider::new(config(), http);
        let now = 1_700_000_000;

        let short = provider.query_url(Symbol::Silver, Interval::M5, now);
        let long = provider.query_url(Symbol::Silver, Interval::W1, now);
        assert!(short.contains(&format!("start_date={}", now - SUB_HOUR_LOOKBACK_SECS)));
        assert!(long.contains(&format!("start_date={}", now - DAILY_LOOKBACK_SECS)));
    }
}
