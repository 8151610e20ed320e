//! Notification fan-out coordinator.
//!
//! [`FanoutCoordinator`] subscribes to the [`DriveEventBus`](crate::bus::DriveEventBus)
//! and turns every drive event into per-channel deliveries. It runs as a
//! long-lived background task, fully detached from the request path: the
//! drive write that published the event has already committed, and
//! nothing that happens here can fail it.
//!
//! Delivery is best-effort. Failures are counted per batch and per
//! recipient, logged under a per-invocation fan-out id, and never
//! propagated.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use placedrive_core::message::{self, PushMessage, TemplateMessage};
use placedrive_core::recipients::{self, ResolvedAudience};
use placedrive_core::{
    Channel, DispatchOutcome, DispatchSummary, DriveStore, FanoutReport,
};

use crate::bus::DriveEvent;
use crate::eligibility::EligibilityEvaluator;
use crate::gateway::messaging::{MessagingError, MessagingGateway};
use crate::gateway::push::{BatchReceipt, PushError, PushGateway, PUSH_BATCH_LIMIT};

/// Push batches in flight at once unless configured otherwise.
const DEFAULT_MAX_INFLIGHT_BATCHES: usize = 8;

/// Deadline for a single gateway call unless configured otherwise.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const DEFAULT_RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

// ---------------------------------------------------------------------------
// FanoutConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for dispatch.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Upper bound on push batches in flight at once.
    pub max_inflight_batches: usize,
    /// Deadline for one gateway call, including the provider round trip.
    pub call_timeout: Duration,
    /// Backoff schedule for transient gateway errors; the length is the
    /// retry count. Permanent errors are never retried.
    pub retry_delays: Vec<Duration>,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_inflight_batches: DEFAULT_MAX_INFLIGHT_BATCHES,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry_delays: DEFAULT_RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// FanoutCoordinator
// ---------------------------------------------------------------------------

/// Background service dispatching drive notifications.
pub struct FanoutCoordinator {
    drives: Arc<dyn DriveStore>,
    evaluator: EligibilityEvaluator,
    push: Option<Arc<dyn PushGateway>>,
    messaging: Option<Arc<dyn MessagingGateway>>,
    config: FanoutConfig,
}

impl FanoutCoordinator {
    /// Create a coordinator with the given channel gateways.
    ///
    /// A `None` gateway disables that channel for the lifetime of the
    /// process; this is logged once here rather than per event.
    pub fn new(
        drives: Arc<dyn DriveStore>,
        evaluator: EligibilityEvaluator,
        push: Option<Arc<dyn PushGateway>>,
        messaging: Option<Arc<dyn MessagingGateway>>,
    ) -> Self {
        if push.is_none() {
            warn!("Push gateway not configured, push channel disabled");
        }
        if messaging.is_none() {
            warn!("Messaging gateway not configured, messaging channel disabled");
        }
        Self {
            drives,
            evaluator,
            push,
            messaging,
            config: FanoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FanoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the dispatch loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and
    /// dispatches every event it receives. The loop exits when the
    /// channel is closed (i.e. the bus is dropped).
    pub async fn run(self: Arc<Self>, mut receiver: broadcast::Receiver<DriveEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.dispatch(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        skipped = n,
                        "Fan-out lagged, some drive events were not dispatched"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Drive event bus closed, fan-out shutting down");
                    break;
                }
            }
        }
    }

    /// Dispatch one drive event to every configured channel.
    ///
    /// Never returns an error: whatever stops dispatch early is recorded
    /// on the report and logged under its fan-out id.
    pub async fn dispatch(&self, event: &DriveEvent) -> FanoutReport {
        let mut report = FanoutReport::new(event.drive.id, event.kind);
        let fanout_id = report.fanout_id;
        let drive_id = event.drive.id;

        if let Err(e) = event.drive.eligibility.validate() {
            error!(%fanout_id, drive_id, error = %e, "Fan-out aborted on invalid criteria");
            report.aborted = Some(e.to_string());
            return report;
        }

        // Existence re-check only. The drive may have been deleted since
        // the event was published; message content still comes from the
        // snapshot carried by the event.
        match self.drives.fetch_drive(drive_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(%fanout_id, drive_id, "Fan-out aborted, drive no longer exists");
                report.aborted = Some("drive no longer exists".to_string());
                return report;
            }
            Err(e) => {
                error!(%fanout_id, drive_id, error = %e, "Fan-out aborted, drive lookup failed");
                report.aborted = Some(e.to_string());
                return report;
            }
        }

        let eligible = match self
            .evaluator
            .eligible_students(&event.drive.eligibility)
            .await
        {
            Ok(students) => students,
            Err(e) => {
                error!(%fanout_id, drive_id, error = %e, "Fan-out aborted, eligibility evaluation failed");
                report.aborted = Some(e.to_string());
                return report;
            }
        };

        let push_audience = recipients::push_targets(&eligible);
        let messaging_audience = recipients::messaging_targets(&eligible);

        info!(
            %fanout_id,
            drive_id,
            event = %event.kind,
            eligible = eligible.len(),
            push_targets = push_audience.targets.len(),
            messaging_targets = messaging_audience.targets.len(),
            "Dispatching drive notifications"
        );

        // Both channel tasks are spawned before either is awaited, so a
        // stall on one channel cannot starve the other.
        let push_task = self.push.clone().map(|gateway| {
            let message = message::push_message(&event.drive, event.kind);
            let config = self.config.clone();
            tokio::spawn(async move {
                dispatch_push(gateway, push_audience, message, config, fanout_id).await
            })
        });
        let messaging_task = self.messaging.clone().map(|gateway| {
            let message = message::template_message(&event.drive, event.kind);
            let config = self.config.clone();
            tokio::spawn(async move {
                dispatch_messaging(gateway, messaging_audience, message, config, fanout_id).await
            })
        });

        if let Some(task) = push_task {
            match task.await {
                Ok(summary) => report.push = Some(summary),
                Err(e) => error!(%fanout_id, drive_id, error = %e, "Push dispatch task failed"),
            }
        }
        if let Some(task) = messaging_task {
            match task.await {
                Ok(summary) => report.messaging = Some(summary),
                Err(e) => {
                    error!(%fanout_id, drive_id, error = %e, "Messaging dispatch task failed")
                }
            }
        }

        info!(
            %fanout_id,
            drive_id,
            attempted = report.total_attempted(),
            delivered = report.total_delivered(),
            "Drive notification dispatch finished"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Push channel
// ---------------------------------------------------------------------------

/// Deliver one push message to the resolved audience in provider-sized
/// batches. Batch failures are isolated: one failed batch costs exactly
/// that batch.
async fn dispatch_push(
    gateway: Arc<dyn PushGateway>,
    audience: ResolvedAudience,
    message: PushMessage,
    config: FanoutConfig,
    fanout_id: Uuid,
) -> DispatchSummary {
    let mut summary = DispatchSummary::new(Channel::Push);
    summary.add_skipped(audience.skipped);

    let tokens: Vec<String> = audience
        .targets
        .into_iter()
        .map(|t| t.identifier)
        .collect();
    let batches: Vec<Vec<String>> = tokens
        .chunks(PUSH_BATCH_LIMIT)
        .map(|chunk| chunk.to_vec())
        .collect();
    let batch_count = batches.len();

    let results: Vec<(usize, usize, Result<BatchReceipt, PushError>)> =
        stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| {
                let gateway = Arc::clone(&gateway);
                let message = &message;
                let config = &config;
                async move {
                    let size = batch.len();
                    let result = send_push_batch(gateway.as_ref(), &batch, message, config).await;
                    (index, size, result)
                }
            })
            .buffer_unordered(config.max_inflight_batches)
            .collect()
            .await;

    for (index, size, result) in results {
        match result {
            Ok(receipt) => {
                summary.add_delivered(receipt.delivered);
                summary.add_failed(receipt.failed);
                if receipt.failed > 0 {
                    warn!(
                        %fanout_id,
                        batch = index + 1,
                        batches = batch_count,
                        delivered = receipt.delivered,
                        failed = receipt.failed,
                        "Push batch partially delivered"
                    );
                }
            }
            Err(e) => {
                summary.add_failed(size);
                warn!(
                    %fanout_id,
                    batch = index + 1,
                    batches = batch_count,
                    size,
                    error = %e,
                    "Push batch failed"
                );
            }
        }
    }
    summary
}

/// One batch send with a deadline and bounded retry on transient errors.
async fn send_push_batch(
    gateway: &dyn PushGateway,
    tokens: &[String],
    message: &PushMessage,
    config: &FanoutConfig,
) -> Result<BatchReceipt, PushError> {
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(
            config.call_timeout,
            gateway.send_multicast(tokens, message),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PushError::Timeout(config.call_timeout)),
        };
        match result {
            Ok(receipt) => return Ok(receipt),
            Err(e) if e.is_transient() && attempt < config.retry_delays.len() => {
                let delay = config.retry_delays[attempt];
                attempt += 1;
                debug!(attempt, error = %e, "Retrying push batch after transient error");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Messaging channel
// ---------------------------------------------------------------------------

/// Deliver one template message per recipient, sequentially. A failed
/// recipient costs exactly that recipient.
async fn dispatch_messaging(
    gateway: Arc<dyn MessagingGateway>,
    audience: ResolvedAudience,
    message: TemplateMessage,
    config: FanoutConfig,
    fanout_id: Uuid,
) -> DispatchSummary {
    let mut summary = DispatchSummary::new(Channel::Messaging);
    summary.add_skipped(audience.skipped);

    for target in &audience.targets {
        match send_template_message(gateway.as_ref(), &target.identifier, &message, &config).await {
            Ok(()) => summary.record(&DispatchOutcome::Delivered),
            Err(e) => {
                warn!(
                    %fanout_id,
                    recipient = target.redacted(),
                    error = %e,
                    "Template message failed"
                );
                summary.record(&DispatchOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        }
    }
    summary
}

/// One template send with a deadline and bounded retry on transient
/// errors.
async fn send_template_message(
    gateway: &dyn MessagingGateway,
    recipient: &str,
    message: &TemplateMessage,
    config: &FanoutConfig,
) -> Result<(), MessagingError> {
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(
            config.call_timeout,
            gateway.send_template(recipient, message),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(MessagingError::Timeout(config.call_timeout)),
        };
        match result {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < config.retry_delays.len() => {
                let delay = config.retry_delays[attempt];
                attempt += 1;
                debug!(attempt, error = %e, "Retrying template message after transient error");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
