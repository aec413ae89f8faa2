use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::FutureExt;
use herald_core::{
    Credential, DeliveryPoint, Notification, ProviderRecord, PushError, PushOutcome, PushResult,
    TokenStatus,
};
use herald_provider::{PushContext, PushGateway};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, info, instrument, warn};

use crate::config::ExecutorConfig;

/// Drives one push through its phases: token check, message build, bounded
/// fan-out, and drain.
///
/// Provider-level failures before fan-out abort the batch with a single
/// provider-level result and a full, non-processing drain of the input.
/// Failures while sending are isolated to their destination.
#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    config: ExecutorConfig,
}

impl DispatchEngine {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Push `notification` through `gateway` to every destination arriving on
    /// `destinations`.
    ///
    /// Emits exactly one result per destination, plus provider-level results
    /// when the token was refreshed, the batch was aborted, or both (refresh
    /// first). The input is
    /// always consumed to the end. The result channel closes once this future
    /// and every worker it spawned have finished.
    #[instrument(skip_all, fields(provider = %provider.name()))]
    pub async fn push<G: PushGateway>(
        &self,
        gateway: &Arc<G>,
        provider: &ProviderRecord,
        destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        notification: &Notification,
        ctx: &PushContext,
    ) {
        let provider_name = provider.name().to_owned();

        let credential = match self.check_token(gateway.as_ref(), provider, ctx).await {
            Ok(TokenStatus::Cached(credential)) => credential,
            Ok(TokenStatus::Refreshed(credential)) => {
                info!("provider credential refreshed");
                let update = PushOutcome::ProviderUpdated(credential.clone());
                emit(&results, PushResult::provider_level(&provider_name, update)).await;
                credential
            }
            Err(e) => {
                warn!(error = %e, "token check failed, aborting batch");
                abort(provider_name, e, destinations, results).await;
                return;
            }
        };

        let body = match gateway.encode(notification) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "message build failed, aborting batch");
                abort(provider_name, e, destinations, results).await;
                return;
            }
        };

        self.fan_out(
            gateway,
            provider_name.into(),
            Arc::new(credential),
            body,
            destinations,
            results,
            ctx,
        )
        .await;
    }

    async fn check_token<G: PushGateway>(
        &self,
        gateway: &G,
        provider: &ProviderRecord,
        ctx: &PushContext,
    ) -> Result<TokenStatus, PushError> {
        let deadline = self.config.token_timeout;
        tokio::select! {
            biased;
            () = ctx.cancelled() => Err(PushError::Cancelled),
            checked = tokio::time::timeout(deadline, gateway.ensure_token(provider)) => {
                checked.unwrap_or(Err(PushError::Timeout(deadline)))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn fan_out<G: PushGateway>(
        &self,
        gateway: &Arc<G>,
        provider: Arc<str>,
        credential: Arc<Credential>,
        body: Bytes,
        mut destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        ctx: &PushContext,
    ) {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut workers = JoinSet::new();
        let mut launched = 0usize;

        while let Some(destination) = destinations.recv().await {
            let permit = tokio::select! {
                biased;
                () = ctx.cancelled() => Err(PushError::Cancelled),
                permit = Arc::clone(&permits).acquire_owned() => {
                    permit.map_err(|_| PushError::Internal("worker pool closed".to_owned()))
                }
            };
            let permit = match permit {
                Ok(permit) => permit,
                Err(e) => {
                    emit(&results, PushResult::for_destination(&*provider, destination, Err(e)))
                        .await;
                    continue;
                }
            };

            let worker = Worker {
                gateway: Arc::clone(gateway),
                provider: Arc::clone(&provider),
                credential: Arc::clone(&credential),
                body: body.clone(),
                results: results.clone(),
                cancel: ctx.clone(),
                timeout: self.config.send_timeout,
            };
            workers.spawn(worker.run(destination, permit).in_current_span());
            launched += 1;

            while let Some(joined) = workers.try_join_next() {
                reap(joined);
            }
        }

        // Workers hold their own senders; the channel closes when the last
        // one finishes.
        drop(results);
        while let Some(joined) = workers.join_next().await {
            reap(joined);
        }
        debug!(launched, "fan-out complete");
    }
}

/// One unit of fan-out work: a single send to a single destination.
struct Worker<G> {
    gateway: Arc<G>,
    provider: Arc<str>,
    credential: Arc<Credential>,
    body: Bytes,
    results: mpsc::Sender<PushResult>,
    cancel: PushContext,
    timeout: Duration,
}

impl<G: PushGateway> Worker<G> {
    async fn run(self, destination: DeliveryPoint, _permit: OwnedSemaphorePermit) {
        let send = tokio::time::timeout(
            self.timeout,
            self.gateway
                .send(&self.credential, &destination, self.body.clone()),
        );
        // A finished send wins over a cancellation seen in the same poll.
        let sent = tokio::select! {
            biased;
            sent = AssertUnwindSafe(send).catch_unwind() => match sent {
                Ok(Ok(sent)) => sent,
                Ok(Err(_elapsed)) => Err(PushError::Timeout(self.timeout)),
                Err(_panic) => Err(PushError::Internal("send panicked".to_owned())),
            },
            () = self.cancel.cancelled() => Err(PushError::Cancelled),
        };

        match &sent {
            Ok(message_id) => debug!(%destination, %message_id, "delivered"),
            Err(e) => warn!(%destination, error = %e, "delivery failed"),
        }
        emit(
            &self.results,
            PushResult::for_destination(&*self.provider, destination, sent),
        )
        .await;
    }
}

/// Emit the provider-level failure and consume the rest of the input without
/// processing it.
async fn abort(
    provider: String,
    error: PushError,
    mut destinations: mpsc::Receiver<DeliveryPoint>,
    results: mpsc::Sender<PushResult>,
) {
    emit(
        &results,
        PushResult::provider_level(provider, PushOutcome::Failed(error)),
    )
    .await;
    let mut drained = 0usize;
    while destinations.recv().await.is_some() {
        drained += 1;
    }
    debug!(drained, "input drained after abort");
}

async fn emit(results: &mpsc::Sender<PushResult>, result: PushResult) {
    if results.send(result).await.is_err() {
        debug!("result receiver dropped; discarding result");
    }
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "push worker ended abnormally");
    }
}
