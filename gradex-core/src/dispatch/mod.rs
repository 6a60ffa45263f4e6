//! Dispatching a submission to a grading executor.
//!
//! The dispatcher performs the full admission/dispatch sequence: fetch the
//! capable set, refuse outright when every executor is saturated, select
//! the least loaded one, reserve a load slot, make the signed call, and
//! release the slot on every exit path.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use gradex_contracts::{AssessRequest, AssessResponse};
use gradex_model::{Assessment, Executor, ExecutorId, ExerciseId};

use crate::auth::RequestCrypto;
use crate::error::{CoreError, Result};
use crate::registry::{ExecutorRegistry, ExecutorStore, LoadAccounting};

mod selector;

pub use selector::select_executor;

/// Path template every executor serves, relative to its base URL.
const ASSESS_PATH: &str = "/v1/exercises";

/// Client for forwarding submissions to grading executors.
pub struct Dispatcher {
    store: Arc<dyn ExecutorStore>,
    crypto: Arc<RequestCrypto>,
    http: reqwest::Client,
    call_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ExecutorStore>,
        crypto: Arc<RequestCrypto>,
        call_timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("default reqwest client is buildable");
        Self {
            store,
            crypto,
            http,
            call_timeout,
        }
    }

    /// Assess a submission for an exercise on the least loaded capable
    /// executor. Grading runs synchronously on the executor and may take a
    /// while; the call is bounded by the configured timeout.
    ///
    /// No retries happen here: a failed dispatch surfaces its typed error
    /// and the caller decides whether to start over with a fresh selection.
    pub async fn assess(
        &self,
        exercise: ExerciseId,
        submission: &str,
    ) -> Result<Assessment> {
        let capable = self.store.list_capable(exercise).await?;
        if capable.is_empty() {
            return Err(CoreError::NoExecutorConfigured(exercise));
        }
        // Admission control: refuse before reserving anything rather than
        // queueing on a saturated fleet.
        if capable.iter().all(Executor::at_capacity) {
            warn!(%exercise, executors = capable.len(), "all capable executors saturated");
            return Err(CoreError::ServiceOverloaded);
        }

        let chosen = select_executor(&capable)?.clone();

        // Reserve before the call so concurrent dispatches see the load.
        self.store.increment_load(chosen.id).await?;
        let reservation = LoadReservation::new(Arc::clone(&self.store), chosen.id);

        info!(executor = %chosen.id, %exercise, "dispatching submission");
        let outcome = self.call_executor(&chosen, exercise, submission).await;
        reservation.release().await;

        match &outcome {
            Ok(assessment) => {
                info!(executor = %chosen.id, %exercise, grade = assessment.grade(), "assessment complete")
            }
            Err(err) => {
                warn!(executor = %chosen.id, %exercise, error = %err, "assessment failed")
            }
        }
        outcome
    }

    async fn call_executor(
        &self,
        executor: &Executor,
        exercise: ExerciseId,
        submission: &str,
    ) -> Result<Assessment> {
        let timestamp = Utc::now().timestamp();
        let request = AssessRequest {
            submission: submission.to_owned(),
            timestamp,
            signature: self.crypto.sign(exercise, submission, timestamp),
        };
        let url = format!(
            "{}{}/{}/automatic-assessment",
            executor.base_url.trim_end_matches('/'),
            ASSESS_PATH,
            exercise,
        );

        let response = self
            .http
            .post(&url)
            .timeout(self.call_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|source| CoreError::ExecutorUnreachable {
                executor: executor.id,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::BadExecutorResponse {
                executor: executor.id,
                reason: format!("status {status}"),
            });
        }

        let body: AssessResponse = response.json().await.map_err(|err| {
            CoreError::BadExecutorResponse {
                executor: executor.id,
                reason: format!("malformed body: {err}"),
            }
        })?;

        Assessment::new(body.grade, body.feedback).map_err(|err| {
            CoreError::BadExecutorResponse {
                executor: executor.id,
                reason: err.to_string(),
            }
        })
    }
}

/// One reserved load slot on an executor.
///
/// The slot is released exactly once: explicitly via [`release`] after the
/// outbound call completes, or from `Drop` when the dispatch future is
/// cancelled mid-call. The drop path hands the decrement to the runtime
/// because destructors cannot await.
///
/// [`release`]: LoadReservation::release
struct LoadReservation {
    store: Arc<dyn ExecutorStore>,
    executor: ExecutorId,
    armed: bool,
}

impl LoadReservation {
    fn new(store: Arc<dyn ExecutorStore>, executor: ExecutorId) -> Self {
        Self {
            store,
            executor,
            armed: true,
        }
    }

    async fn release(mut self) {
        self.armed = false;
        if let Err(err) = self.store.decrement_load(self.executor).await {
            warn!(executor = %self.executor, error = %err, "failed to release load slot");
        }
    }
}

impl Drop for LoadReservation {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let store = Arc::clone(&self.store);
        let executor = self.executor;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = store.decrement_load(executor).await {
                    warn!(%executor, error = %err, "failed to release load slot after cancellation");
                }
            });
        } else {
            warn!(%executor, "load slot leaked: no runtime to release it on");
        }
    }
}
