use crate::model::{EarningsQuote, ProviderError, RawBar};
use crate::provider::{MarketData, Timeframe};
use crate::utils::from_unix_seconds;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Hands out the session cookie the crumb is bound to.
const SESSION_URL: &str = "https://fc.yahoo.com";

pub struct YahooProvider {
    client: Client,
    base_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            crumb: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn chart_url(
        &self,
        symbol: &str,
        interval: Timeframe,
        period_start: DateTime<Utc>,
    ) -> Result<Url, ProviderError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        url.query_pairs_mut()
            .append_pair("period1", &period_start.timestamp().to_string())
            .append_pair("period2", &Utc::now().timestamp().to_string())
            .append_pair("interval", interval.interval_code());
        Ok(url)
    }

    fn quote_url(&self, symbols: &[String], crumb: &str) -> Result<Url, ProviderError> {
        let mut url = self.endpoint(&["v7", "finance", "quote"])?;
        url.query_pairs_mut()
            .append_pair("symbols", &symbols.join(","))
            .append_pair("crumb", crumb);
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, ProviderError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(err) = parse_finance_error(&body) {
                return Err(err);
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(ProviderError::Unauthorized(status.to_string()));
            }
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Cached crumb, or a fresh cookie + crumb handshake when none is held.
    async fn crumb(&self) -> Result<String, ProviderError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the cookie matters here, the page itself answers 404.
        self.client.get(SESSION_URL).send().await?;
        let body = self.get_text(self.endpoint(&["v1", "test", "getcrumb"])?).await?;
        let crumb = parse_crumb(&body)?;
        info!("Quote session established");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }
}

#[async_trait::async_trait]
impl MarketData for YahooProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Timeframe,
        period_start: DateTime<Utc>,
    ) -> Result<Vec<RawBar>, ProviderError> {
        let body = self.get_text(self.chart_url(symbol, interval, period_start)?).await?;
        parse_chart(symbol, &body)
    }

    async fn fetch_quote_batch(&self, symbols: &[String]) -> Result<Vec<EarningsQuote>, ProviderError> {
        let crumb = self.crumb().await?;
        let result = match self.get_text(self.quote_url(symbols, &crumb)?).await {
            Ok(body) => parse_quotes(&body),
            Err(e) => Err(e),
        };
        if let Err(ProviderError::Unauthorized(_)) = &result {
            // Expired session: the next batch performs a new handshake.
            *self.crumb.lock().await = None;
        }
        result
    }
}

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Deserialize, Default)]
struct QuoteColumns {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct FinanceEnvelope {
    finance: FinanceBody,
}

#[derive(Deserialize)]
struct FinanceBody {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteBody,
}

#[derive(Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteItem>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteItem {
    symbol: String,
    earnings_timestamp: Option<i64>,
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Error carried in a `{"finance": {"error": ...}}` body, if that is what `body` is.
pub fn parse_finance_error(body: &str) -> Option<ProviderError> {
    let err = serde_json::from_str::<FinanceEnvelope>(body).ok()?.finance.error?;
    if err.code.eq_ignore_ascii_case("unauthorized") {
        Some(ProviderError::Unauthorized(err.description))
    } else {
        Some(ProviderError::Malformed(format!("{}: {}", err.code, err.description)))
    }
}

/// A crumb is a single opaque token; anything else means no session was granted.
pub fn parse_crumb(body: &str) -> Result<String, ProviderError> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains(|c: char| c.is_whitespace() || c == '<' || c == '{') {
        return Err(ProviderError::Unauthorized(format!("no crumb issued: {:.40}", crumb)));
    }
    Ok(crumb.to_string())
}

/// Parses a v8 chart response into bars, oldest first.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<RawBar>, ProviderError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::NoData(format!("{} ({}: {})", symbol, err.code, err.description)));
    }
    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();
    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &secs) in result.timestamp.iter().enumerate() {
        let Some(timestamp) = from_unix_seconds(secs) else {
            return Err(ProviderError::Malformed(format!("bad timestamp {}", secs)));
        };
        bars.push(RawBar {
            timestamp,
            high: column(&columns.high, i),
            low: column(&columns.low, i),
            close: column(&columns.close, i),
            volume: column(&columns.volume, i),
        });
    }
    Ok(bars)
}

/// Parses a v7 quote response into earnings metadata.
pub fn parse_quotes(body: &str) -> Result<Vec<EarningsQuote>, ProviderError> {
    if let Some(err) = parse_finance_error(body) {
        return Err(err);
    }
    let envelope: QuoteEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(err) = envelope.quote_response.error {
        return Err(ProviderError::Malformed(format!("{}: {}", err.code, err.description)));
    }
    Ok(envelope
        .quote_response
        .result
        .into_iter()
        .map(|q| EarningsQuote {
            symbol: q.symbol,
            earnings_at: q.earnings_timestamp.and_then(from_unix_seconds),
        })
        .collect())
}
