//! metals-api.com adapter (provider B, alternate).
//!
//! Daily-resolution rates only: the response maps ISO dates to
//! `{metal: rate}`, so each entry becomes a degenerate candle with
//! open=high=low=close=rate. The API key travels as a query parameter.

use crate::config::PriceConfig;
use crate::error::{CoreError, Result};
use crate::http::HttpFetch;
use crate::models::{Candle, Interval, PriceFeed, Symbol};
use crate::providers::PriceProvider;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const PROVIDER_NAME: &str = "metals-api";
const DEFAULT_BASE: &str = "https://metals-api.com";

const LOOKBACK_DAYS: i64 = 400;

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    #[serde(default)]
    rates: HashMap<String, HashMap<String, f64>>,
}

pub struct MetalsApiProvider {
    config: PriceConfig,
    http: Arc<dyn HttpFetch>,
}

impl MetalsApiProvider {
    pub fn new(config: PriceConfig, http: Arc<dyn HttpFetch>) -> Self {
        Self { config, http }
    }
}

fn iso_date_to_ms(iso: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

#[async_trait]
impl PriceProvider for MetalsApiProvider {
    async fn fetch(&self, symbol: Symbol, interval: Interval) -> Result<PriceFeed> {
        let base = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE);
        let now = Utc::now();
        let start = (now - ChronoDuration::days(LOOKBACK_DAYS)).format("%Y-%m-%d");
        let end = now.format("%Y-%m-%d");
        let metal = symbol.metal();
        let url = format!(
            "{base}/api/timeseries?base=USD&symbols={metal}&start_date={start}&end_date={end}&apikey={}",
            self.config.api_key
        );

        let response = self.http.get(&url, &[]).await?;
        if !response.is_success() {
            return Err(CoreError::upstream(
                PROVIDER_NAME,
                Some(response.status),
                format!("timeseries request for {symbol} rejected"),
            ));
        }

        let parsed: TimeseriesResponse = serde_json::from_str(&response.body).map_err(|e| {
            CoreError::upstream(PROVIDER_NAME, None, format!("malformed rates body: {e}"))
        })?;

        let candles: Vec<Candle> = parsed
            .rates
            .iter()
            .filter_map(|(iso, rates)| {
                let rate = *rates.get(metal)?;
                let timestamp_ms = iso_date_to_ms(iso)?;
                Some(Candle {
                    timestamp_ms,
                    open: rate,
                    high: rate,
                    low: rate,
                    close: rate,
                })
            })
            .collect();

        debug!(%symbol, %interval, days = candles.len(), "metals-api rates fetched");
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
        response: HttpResponse,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpFetch for CannedHttp {
        async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse> {
            self.seen.lock().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    fn config() -> PriceConfig {
        PriceConfig {
            provider: ProviderKind::MetalsApi,
            api_key: "qk".into(),
            base_url: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn maps_daily_rates_to_sorted_degenerate_candles() {
        let body = r#"{"rates":{"2024-01-03":{"XAG":23.4},"2024-01-01":{"XAG":22.9},"2024-01-02":{"XAG":23.1,"XAU":2050.0}}}"#;
        let http = Arc::new(CannedHttp {
            response: HttpResponse {
                status: 200,
                body: body.into(),
            },
            seen: Mutex::new(Vec::new()),
        });
        let provider = MetalsApiProvider::new(config(), http.clone());

        let feed = provider.fetch(Symbol::Silver, Interval::D1).await.unwrap();
        assert_eq!(feed.candles.len(), 3);
        let ts: Vec<i64> = feed.candles.iter().map(|c| c.timestamp_ms).collect();
        let mut sorted = ts.clone();
        sorted.sort_unstable();
        assert_eq!(ts, sorted);
        assert_eq!(feed.last, 23.4);
        assert_eq!(feed.prev_close, 23.1);
        let first = &feed.candles[0];
        assert_eq!(first.open, first.close);
        assert_eq!(first.high, first.low);

        let url = http.seen.lock()[0].clone();
        assert!(url.contains("symbols=XAG"));
        assert!(url.contains("apikey=qk"));
    }

    #[tokio::test]
    async fn non_success_status_carries_the_code() {
        let http = Arc::new(CannedHttp {
            response: HttpResponse {
                status: 502,
                body: "bad gateway".into(),
            },
            seen: Mutex::new(Vec::new()),
        });
        let provider = MetalsApiProvider::new(config(), http);

        let err = provider.fetch(Symbol::Gold, Interval::D1).await.unwrap_err();
        assert!(matches!(err, CoreError::Upstream { status: Some(502), .. }));
    }

    #[test]
    fn iso_dates_parse_to_midnight_utc() {
        assert_eq!(iso_date_to_ms("1970-01-02"), Some(86_400_000));
        assert_eq!(iso_date_to_ms("not-a-date"), None);
    }
}
