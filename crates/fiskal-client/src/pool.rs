//! Bounded concurrent submission.
//!
//! Each invoice runs as its own task; a semaphore caps how many are in
//! flight. Receipt codes are computed up front on the calling task, so a
//! submission that times out or panics still reports its ZOI and QR.

use std::sync::Arc;
use std::time::Duration;

use fiskal_core::InvoiceRecord;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::FiskalError;
use crate::pipeline::{FiscalClient, InvoiceOutcome, ReceiptCodes, SubmissionFailure};

/// Result of one invoice in a batch.
pub type SubmissionResult = Result<InvoiceOutcome, SubmissionFailure>;

/// Fixed-size worker pool over one [`FiscalClient`].
#[derive(Debug, Clone)]
pub struct SubmissionPool {
    client: Arc<FiscalClient>,
    permits: Arc<Semaphore>,
    unit_timeout: Duration,
}

impl SubmissionPool {
    /// Pool sized and timed by the client's configuration.
    pub fn new(client: Arc<FiscalClient>) -> Self {
        let size = client.config().max_concurrency.max(1);
        let unit_timeout = client.config().unit_timeout();
        Self::with_limits(client, size, unit_timeout)
    }

    pub fn with_limits(client: Arc<FiscalClient>, size: usize, unit_timeout: Duration) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(size.max(1))),
            unit_timeout,
        }
    }

    /// Submit every record; results come back in input order.
    pub async fn submit_all(&self, records: Vec<InvoiceRecord>) -> Vec<SubmissionResult> {
        let total = records.len();
        let mut results: Vec<Option<SubmissionResult>> = (0..total).map(|_| None).collect();
        let mut codes_by_index: Vec<Option<ReceiptCodes>> = vec![None; total];
        let mut tasks = JoinSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let codes = match self.client.receipt_codes(&record) {
                Ok(codes) => codes,
                Err(e) => {
                    results[index] = Some(Err(SubmissionFailure::new(None, e)));
                    continue;
                }
            };
            codes_by_index[index] = Some(codes.clone());

            let client = self.client.clone();
            let permits = self.permits.clone();
            let unit_timeout = self.unit_timeout;
            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        match tokio::time::timeout(
                            unit_timeout,
                            client.transmit_invoice(&record, &codes),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => {
                                tracing::warn!(zoi = %codes.zoi, "submission timed out after {unit_timeout:?}");
                                Err(FiskalError::UnitTimeout(unit_timeout))
                            }
                        }
                    }
                    Err(e) => Err(FiskalError::TaskFailed(e.to_string())),
                };
                (index, outcome.map_err(|e| SubmissionFailure::new(Some(codes), e)))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!("submission task failed: {e}"),
            }
        }

        results
            .into_iter()
            .zip(codes_by_index)
            .map(|(result, codes)| {
                result.unwrap_or_else(|| {
                    Err(SubmissionFailure::new(
                        codes,
                        FiskalError::TaskFailed("task ended without a result".into()),
                    ))
                })
            })
            .collect()
    }
}
