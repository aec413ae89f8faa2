use herald_core::{DeliveryPoint, Notification, ProviderRecord, PushResult};
use herald_provider::{DynPushService, PushContext};
use tokio::sync::mpsc;

/// Push one notification to a fixed list of destinations and collect every
/// result.
///
/// This wraps the streaming [`DynPushService::push`] contract for hosts that
/// already hold the whole batch in memory. Results are returned in completion
/// order; a provider-level result, if any, comes first.
///
/// # Examples
///
/// ```no_run
/// # use herald_core::{Notification, ProviderRecord};
/// # use herald_executor::batch::execute_batch;
/// # use herald_provider::{DynPushService, PushContext};
/// # async fn example(service: &dyn DynPushService, provider: &ProviderRecord) {
/// let notification = Notification::new().with("title", "hello");
/// let results = execute_batch(service, provider, vec![], &notification, &PushContext::new()).await;
/// assert!(results.len() <= 1);
/// # }
/// ```
pub async fn execute_batch(
    service: &dyn DynPushService,
    provider: &ProviderRecord,
    destinations: Vec<DeliveryPoint>,
    notification: &Notification,
    ctx: &PushContext,
) -> Vec<PushResult> {
    let expected = destinations.len() + 1;
    let (dp_tx, dp_rx) = mpsc::channel(destinations.len().max(1));
    let (res_tx, mut res_rx) = mpsc::channel(expected);

    let feed = async move {
        for dp in destinations {
            if dp_tx.send(dp).await.is_err() {
                break;
            }
        }
    };
    let collect = async {
        let mut out = Vec::with_capacity(expected);
        while let Some(result) = res_rx.recv().await {
            out.push(result);
        }
        out
    };

    let ((), (), results) = tokio::join!(
        feed,
        service.push(provider, dp_rx, res_tx, notification, ctx),
        collect
    );
    results
}
