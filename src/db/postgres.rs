//! Postgres persistence for the live signal table.

use crate::config::RetryConfig;
use crate::error::StoreError;
use crate::models::{SignalKind, SignalRecord};
use async_trait::async_trait;
use backon::Retryable;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls};
use tracing::{error, info, warn};

/// Sink for evaluated signals. One live row per symbol.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn upsert(&self, record: &SignalRecord) -> Result<(), StoreError>;
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS trading_signals (
    symbol TEXT PRIMARY KEY,
    signal_type TEXT NOT NULL,
    strength DOUBLE PRECISION NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    rsi DOUBLE PRECISION NOT NULL,
    macd_value DOUBLE PRECISION NOT NULL,
    macd_signal DOUBLE PRECISION NOT NULL,
    macd_hist DOUBLE PRECISION NOT NULL,
    ema9 DOUBLE PRECISION NOT NULL,
    ema21 DOUBLE PRECISION NOT NULL,
    adx DOUBLE PRECISION NOT NULL,
    plus_di DOUBLE PRECISION NOT NULL,
    minus_di DOUBLE PRECISION NOT NULL,
    stochrsi_k DOUBLE PRECISION NOT NULL,
    stochrsi_d DOUBLE PRECISION NOT NULL,
    bb_upper DOUBLE PRECISION NOT NULL,
    bb_middle DOUBLE PRECISION NOT NULL,
    bb_lower DOUBLE PRECISION NOT NULL,
    volume DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

// The update list leaves created_at untouched; it marks first insertion.
const UPSERT_SIGNAL: &str = "INSERT INTO trading_signals (
    symbol, signal_type, strength, price, rsi,
    macd_value, macd_signal, macd_hist, ema9, ema21,
    adx, plus_di, minus_di, stochrsi_k, stochrsi_d,
    bb_upper, bb_middle, bb_lower, volume, created_at, updated_at
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
)
ON CONFLICT (symbol) DO UPDATE SET
    signal_type = EXCLUDED.signal_type,
    strength = EXCLUDED.strength,
    price = EXCLUDED.price,
    rsi = EXCLUDED.rsi,
    macd_value = EXCLUDED.macd_value,
    macd_signal = EXCLUDED.macd_signal,
    macd_hist = EXCLUDED.macd_hist,
    ema9 = EXCLUDED.ema9,
    ema21 = EXCLUDED.ema21,
    adx = EXCLUDED.adx,
    plus_di = EXCLUDED.plus_di,
    minus_di = EXCLUDED.minus_di,
    stochrsi_k = EXCLUDED.stochrsi_k,
    stochrsi_d = EXCLUDED.stochrsi_d,
    bb_upper = EXCLUDED.bb_upper,
    bb_middle = EXCLUDED.bb_middle,
    bb_lower = EXCLUDED.bb_lower,
    volume = EXCLUDED.volume,
    updated_at = EXCLUDED.updated_at";

const SELECT_SIGNALS: &str = "SELECT symbol, signal_type, strength, price, rsi,
    macd_value, macd_signal, macd_hist, ema9, ema21,
    adx, plus_di, minus_di, stochrsi_k, stochrsi_d,
    bb_upper, bb_middle, bb_lower, volume, created_at, updated_at
FROM trading_signals ORDER BY symbol";

/// Signal store backed by Postgres.
///
/// The connection task runs in the background; when it dies the next
/// operation reconnects before executing. Transient failures are retried
/// with the shared backoff policy before the caller gives up.
pub struct SignalDatabase {
    url: String,
    client: Arc<RwLock<Option<Client>>>,
    retry: RetryConfig,
}

impl SignalDatabase {
    pub async fn connect(url: impl Into<String>) -> Result<Self, StoreError> {
        let db = Self {
            url: url.into(),
            client: Arc::new(RwLock::new(None)),
            retry: RetryConfig::default(),
        };
        db.reconnect().await?;
        Ok(db)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        let (client, connection) = tokio_postgres::connect(&self.url, NoTls)
            .await
            .map_err(StoreError::Connect)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "SignalDatabase: connection task ended");
            }
        });

        client
            .execute(CREATE_TABLE, &[])
            .await
            .map_err(StoreError::Query)?;

        *self.client.write().await = Some(client);
        info!("SignalDatabase: connected, schema ensured");
        Ok(())
    }

    async fn ensure_connected(&self) -> Result<(), StoreError> {
        {
            let guard = self.client.read().await;
            if guard.as_ref().is_some_and(|c| !c.is_closed()) {
                return Ok(());
            }
        }
        warn!("SignalDatabase: connection down, reconnecting");
        self.reconnect().await
    }

    async fn upsert_once(&self, record: &SignalRecord) -> Result<(), StoreError> {
        self.ensure_connected().await?;
        let guard = self.client.read().await;
        let client = guard
            .as_ref()
            .filter(|c| !c.is_closed())
            .ok_or(StoreError::Disconnected)?;

        client
            .execute(
                UPSERT_SIGNAL,
                &[
                    &record.symbol,
                    &record.kind.as_str(),
                    &record.strength,
                    &record.price,
                    &record.rsi,
                    &record.macd_value,
                    &record.macd_signal,
                    &record.macd_hist,
                    &record.ema9,
                    &record.ema21,
                    &record.adx,
                    &record.plus_di,
                    &record.minus_di,
                    &record.stochrsi_k,
                    &record.stochrsi_d,
                    &record.bb_upper,
                    &record.bb_middle,
                    &record.bb_lower,
                    &record.volume,
                    &record.created_at,
                    &record.updated_at,
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    /// Full signal table, ordered by symbol.
    pub async fn fetch_signals(&self) -> Result<Vec<SignalRecord>, StoreError> {
        self.ensure_connected().await?;
        let guard = self.client.read().await;
        let client = guard
            .as_ref()
            .filter(|c| !c.is_closed())
            .ok_or(StoreError::Disconnected)?;

        let rows = client
            .query(SELECT_SIGNALS, &[])
            .await
            .map_err(StoreError::Query)?;

        Ok(rows.iter().map(row_to_record).collect())
    }
}

fn row_to_record(row: &tokio_postgres::Row) -> SignalRecord {
    let label: String = row.get("signal_type");
    SignalRecord {
        symbol: row.get("symbol"),
        kind: SignalKind::from_label(&label),
        strength: row.get("strength"),
        price: row.get("price"),
        rsi: row.get("rsi"),
        macd_value: row.get("macd_value"),
        macd_signal: row.get("macd_signal"),
        macd_hist: row.get("macd_hist"),
        ema9: row.get("ema9"),
        ema21: row.get("ema21"),
        adx: row.get("adx"),
        plus_di: row.get("plus_di"),
        minus_di: row.get("minus_di"),
        stochrsi_k: row.get("stochrsi_k"),
        stochrsi_d: row.get("stochrsi_d"),
        bb_upper: row.get("bb_upper"),
        bb_middle: row.get("bb_middle"),
        bb_lower: row.get("bb_lower"),
        volume: row.get("volume"),
        created_at: row.get::<_, DateTime<Utc>>("created_at"),
        updated_at: row.get::<_, DateTime<Utc>>("updated_at"),
    }
}

#[async_trait]
impl SignalSink for SignalDatabase {
    /// Transient failures retry with backoff; a non-transient error or an
    /// exhausted budget surfaces to the caller, which drops the update.
    async fn upsert(&self, record: &SignalRecord) -> Result<(), StoreError> {
        (|| async { self.upsert_once(record).await })
            .retry(self.retry.backoff())
            .when(StoreError::is_transient)
            .notify(|err: &StoreError, delay: Duration| {
                warn!(
                    symbol = %record.symbol,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "SignalDatabase: upsert failed, retrying"
                );
            })
            .await
    }
}
