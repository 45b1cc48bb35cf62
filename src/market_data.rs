//! Market data gateway for Binance USDⓈ-M futures
//!
//! Translates provider responses into [`SeriesSnapshot`]s. Per-symbol fetches
//! never surface transport or payload errors to the scan loop: anything that
//! goes wrong degrades to a neutral-empty snapshot, logged at `warn!`, and the
//! cycle moves on. Symbol discovery is the one call that propagates errors,
//! since an unreachable universe provider is fatal at startup.

use crate::config::ScannerConfig;
use crate::error::{Result, ScannerError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Public REST endpoint for Binance USDⓈ-M futures.
pub const BINANCE_FUTURES_BASE: &str = "https://fapi.binance.com";

/// One symbol's recent time series for a single scan cycle.
///
/// `closes` and `volumes` are ordered oldest to newest. `prev_oi`/`curr_oi`
/// are the two most recent open-interest readings; zero means unavailable,
/// which the rule treats as "never fires" rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSnapshot {
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
    pub prev_oi: f64,
    pub curr_oi: f64,
}

impl SeriesSnapshot {
    /// Neutral value returned when a symbol's data could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is not enough data to evaluate the symbol this cycle.
    pub fn is_empty(&self) -> bool {
        self.closes.len() < 2 || self.volumes.len() < 2
    }
}

/// Capability consumed by the scan loop to reach a market-data provider.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Tradable symbol universe for the configured quote asset.
    async fn list_symbols(&self) -> Result<Vec<String>>;

    /// Recent series for one symbol. Never errors: degraded fetches return
    /// [`SeriesSnapshot::empty`].
    async fn fetch_series(&self, symbol: &str) -> SeriesSnapshot;
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    quote_asset: String,
    #[serde(default)]
    contract_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenInterestPoint {
    sum_open_interest: String,
}

/// REST gateway against Binance futures endpoints.
pub struct BinanceGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    quote_asset: String,
    kline_interval: String,
    kline_limit: usize,
    oi_period: String,
}

impl BinanceGateway {
    pub fn new(config: &ScannerConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: BINANCE_FUTURES_BASE.to_string(),
            api_key,
            quote_asset: config.quote_asset.clone(),
            kline_interval: config.kline_interval.clone(),
            kline_limit: config.kline_limit,
            oi_period: config.oi_period.clone(),
        })
    }

    /// Point the gateway at a different host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.header("X-MBX-APIKEY", key),
            None => request,
        }
    }

    async fn fetch_klines(&self, symbol: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let rows: Vec<Vec<Value>> = self
            .get("/fapi/v1/klines")
            .query(&[
                ("symbol", symbol),
                ("interval", self.kline_interval.as_str()),
                ("limit", &self.kline_limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut closes = Vec::with_capacity(rows.len());
        let mut volumes = Vec::with_capacity(rows.len());
        for row in &rows {
            // Kline rows: [open_time, open, high, low, close, volume,
            // close_time, quote_volume, ...]. Volume comparisons use the
            // quote-asset volume so the floor is denominated in quote units.
            let close = kline_field(row, 4).ok_or_else(|| ScannerError::Payload {
                message: format!("{}: kline row missing close price", symbol),
            })?;
            let volume = kline_field(row, 7).ok_or_else(|| ScannerError::Payload {
                message: format!("{}: kline row missing quote volume", symbol),
            })?;
            closes.push(close);
            volumes.push(volume);
        }

        Ok((closes, volumes))
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<(f64, f64)> {
        let points: Vec<OpenInterestPoint> = self
            .get("/futures/data/openInterestHist")
            .query(&[
                ("symbol", symbol),
                ("period", self.oi_period.as_str()),
                ("limit", "2"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if points.len() < 2 {
            return Err(ScannerError::Payload {
                message: format!(
                    "{}: open interest history returned {} points, need 2",
                    symbol,
                    points.len()
                ),
            });
        }

        let prev = parse_numeric(&points[0].sum_open_interest, symbol, "open interest")?;
        let curr = parse_numeric(&points[1].sum_open_interest, symbol, "open interest")?;
        Ok((prev, curr))
    }
}

#[async_trait]
impl MarketData for BinanceGateway {
    async fn list_symbols(&self) -> Result<Vec<String>> {
        let info: ExchangeInfo = self
            .get("/fapi/v1/exchangeInfo")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let symbols = info
            .symbols
            .into_iter()
            .filter(|s| {
                s.status == "TRADING"
                    && s.quote_asset == self.quote_asset
                    && s.contract_type == "PERPETUAL"
                    && !is_leveraged_token(&s.symbol, &self.quote_asset)
            })
            .map(|s| s.symbol)
            .collect();

        Ok(symbols)
    }

    async fn fetch_series(&self, symbol: &str) -> SeriesSnapshot {
        let (closes, volumes) = match self.fetch_klines(symbol).await {
            Ok(series) => series,
            Err(e) => {
                warn!("{}: kline fetch degraded to empty snapshot: {}", symbol, e);
                return SeriesSnapshot::empty();
            }
        };

        // Open-interest failure only disables the OI condition for this
        // symbol (zero previous OI never fires); the rest of the snapshot
        // stays usable.
        let (prev_oi, curr_oi) = match self.fetch_open_interest(symbol).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("{}: open interest unavailable this cycle: {}", symbol, e);
                (0.0, 0.0)
            }
        };

        SeriesSnapshot {
            closes,
            volumes,
            prev_oi,
            curr_oi,
        }
    }
}

/// Leveraged-token variants (BTCUPUSDT, ETHBULLUSDT, ...) track multiples of
/// the underlying and would alert on pure leverage noise.
fn is_leveraged_token(symbol: &str, quote_asset: &str) -> bool {
    let base = symbol.strip_suffix(quote_asset).unwrap_or(symbol);
    ["UP", "DOWN", "BULL", "BEAR"]
        .iter()
        .any(|suffix| base.ends_with(suffix))
}

/// Binance encodes kline numerics as JSON strings; accept plain numbers too.
fn kline_field(row: &[Value], index: usize) -> Option<f64> {
    let value = row.get(index)?;
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

fn parse_numeric(raw: &str, symbol: &str, field: &str) -> Result<f64> {
    let parsed: f64 = raw.parse().map_err(|_| ScannerError::Payload {
        message: format!("{}: unparseable {} value {:?}", symbol, field, raw),
    })?;
    if !parsed.is_finite() {
        return Err(ScannerError::Payload {
            message: format!("{}: non-finite {} value", symbol, field),
        });
    }
    Ok(parsed)
}
