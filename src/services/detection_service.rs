use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::LedgerClient;
use crate::models::TransactionRecord;
use crate::services::filter_service::MevStrategy;
use crate::utils::errors::FetchError;

/// Fetch-and-classify step shared by the background monitor and `check_mev`
pub struct MevScanner {
    ledger: Arc<dyn LedgerClient>,
    strategy: Arc<dyn MevStrategy>,
    address: String,
    fetch_timeout: Duration,
}

impl MevScanner {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        strategy: Arc<dyn MevStrategy>,
        address: String,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            strategy,
            address,
            fetch_timeout,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current records for the monitored address, bounded by the fetch timeout
    pub async fn fetch(&self) -> Result<Vec<TransactionRecord>, FetchError> {
        tokio::time::timeout(
            self.fetch_timeout,
            self.ledger.signatures_for_address(&self.address),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }

    /// Notable records from one fetch, in ledger order
    pub async fn scan(&self) -> Result<Vec<TransactionRecord>, FetchError> {
        self.scan_excluding(|_| false).await
    }

    /// Like `scan`, but records for which `skip` returns true are dropped before
    /// enrichment, so they cost no further ledger lookups
    pub async fn scan_excluding<F>(&self, skip: F) -> Result<Vec<TransactionRecord>, FetchError>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        let listed = self.fetch().await?;
        let candidates: Vec<TransactionRecord> =
            listed.into_iter().filter(|record| !skip(record)).collect();

        // Each enrichment lookup gets the full fetch timeout to itself
        let records = self.ledger.enrich(candidates, self.fetch_timeout).await;
        let notable: Vec<TransactionRecord> = self
            .strategy
            .classify(&records)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            "{} flagged {}/{} transactions for {}",
            self.strategy.name(),
            notable.len(),
            records.len(),
            self.address
        );
        Ok(notable)
    }
}
