//! Unique-visitor accounting.
//!
//! Every non-loopback client address is stored once in `unique_visitors`, with
//! a running total kept in `total_unique_visitors`. The process-wide
//! [`UniqueVisitorsMetric`] mirrors that total; it is not persisted, so a
//! fresh process seeds it from the store the first time the counter is used.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::db::{Sighting, Store, UniqueVisitor};

/// Name of the exported unique-visitor counter.
pub const UNIQUE_USERS_METRIC: &str = "unique_users";

#[derive(Debug, Error)]
pub enum VisitorError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for VisitorError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VisitorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of accounting a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Loopback client; nothing was touched.
    Skipped,
    NewVisitor,
    ReturningVisitor,
}

impl VisitOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::NewVisitor => "new",
            Self::ReturningVisitor => "returning",
        }
    }
}

/// In-process count of unique visitors, mirrored to the metrics recorder.
#[derive(Debug, Default)]
pub struct UniqueVisitorsMetric {
    value: AtomicU64,
}

impl UniqueVisitorsMetric {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(UNIQUE_USERS_METRIC).increment(1);
    }

    /// Sets the value to `total` if it still reads zero. Returns whether the
    /// seed was applied.
    pub fn seed(&self, total: u64) -> bool {
        let seeded = self
            .value
            .compare_exchange(0, total, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok();
        if seeded {
            metrics::counter!(UNIQUE_USERS_METRIC).absolute(total);
        }
        seeded
    }
}

pub struct VisitorCounter {
    store: Store,
    metric: Arc<UniqueVisitorsMetric>,
    initialized: OnceCell<()>,
}

impl VisitorCounter {
    #[must_use]
    pub fn new(store: Store, metric: Arc<UniqueVisitorsMetric>) -> Self {
        Self {
            store,
            metric,
            initialized: OnceCell::new(),
        }
    }

    /// Reconciles the metric with the persisted total.
    ///
    /// Runs once per counter; later calls return immediately. A failed
    /// attempt leaves the counter uninitialized so the next call retries.
    pub async fn initialize(&self) -> Result<(), VisitorError> {
        self.initialized
            .get_or_try_init(|| async {
                let total = self.store.total_unique_visitors().await?;
                if self.metric.seed(total) {
                    info!(total, "Seeded unique visitor metric from store");
                }
                Ok::<(), VisitorError>(())
            })
            .await?;
        Ok(())
    }

    /// Accounts one request from `ip`.
    pub async fn record(&self, ip: IpAddr) -> Result<VisitOutcome, VisitorError> {
        let ip = ip.to_canonical();
        if ip.is_loopback() {
            return Ok(VisitOutcome::Skipped);
        }

        // Seeding must happen before the first increment, or the metric
        // would no longer read zero.
        self.initialize().await?;

        let address = exploded(ip);
        let outcome = match self.store.record_visit(&address).await? {
            Sighting::First => {
                self.metric.increment();
                VisitOutcome::NewVisitor
            }
            Sighting::Repeat => VisitOutcome::ReturningVisitor,
        };

        debug!(ip = %address, ?outcome, "Visitor accounted");
        Ok(outcome)
    }

    /// Persisted total of distinct visitors.
    pub async fn total(&self) -> Result<u64, VisitorError> {
        Ok(self.store.total_unique_visitors().await?)
    }

    pub async fn get(&self, ip: IpAddr) -> Result<Option<UniqueVisitor>, VisitorError> {
        Ok(self.store.get_visitor(&exploded(ip.to_canonical())).await?)
    }

    #[must_use]
    pub fn metric_value(&self) -> u64 {
        self.metric.value()
    }
}

/// Fully expanded textual form of an address, used as the storage key.
///
/// IPv4 keeps its dotted quad; IPv6 is written as eight zero-padded groups.
#[must_use]
pub fn exploded(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => v6
            .segments()
            .iter()
            .map(|segment| format!("{segment:04x}"))
            .collect::<Vec<_>>()
            .join(":"),
    }
}
