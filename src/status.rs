//! Domain order status and its derivation from queue-native job state.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::queue::{JobOutcome, JobStatus, ProcessingStatus};

/// Status exposed to API callers. Derived on every query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    Accepted,
    Rejected,
    Error,
}

impl OrderStatus {
    /// Caller-facing description for each status.
    pub const fn description(self) -> &'static str {
        match self {
            OrderStatus::Processing => "Order is currently undergoing processing",
            OrderStatus::Accepted => "Order has been accepted and queued",
            OrderStatus::Rejected => "Order has been rejected due to invalid data",
            OrderStatus::Error => {
                "Unable to process order due to temporary error. Please try again later"
            }
        }
    }
}

/// Status plus detail, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusView {
    pub status: OrderStatus,
    pub detail: String,
}

impl OrderStatusView {
    pub fn new(status: OrderStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn with_default_detail(status: OrderStatus) -> Self {
        Self::new(status, status.description())
    }
}

/// Map a queue-native job state (plus optional result payload) to the domain
/// status. A rejected job's own detail takes precedence over the generic
/// description; everything else gets the static description of its status.
pub fn translate_job_state(status: JobStatus, outcome: Option<&JobOutcome>) -> OrderStatusView {
    match status {
        JobStatus::Created
        | JobStatus::Deferred
        | JobStatus::Queued
        | JobStatus::Scheduled
        | JobStatus::Started => OrderStatusView::with_default_detail(OrderStatus::Processing),
        JobStatus::Canceled | JobStatus::Failed | JobStatus::Stopped => {
            OrderStatusView::with_default_detail(OrderStatus::Error)
        }
        JobStatus::Finished => match outcome {
            Some(outcome) if outcome.status == ProcessingStatus::Accepted => {
                OrderStatusView::with_default_detail(OrderStatus::Accepted)
            }
            Some(outcome) => OrderStatusView::new(
                OrderStatus::Rejected,
                outcome
                    .detail
                    .clone()
                    .unwrap_or_else(|| OrderStatus::Rejected.description().to_string()),
            ),
            None => OrderStatusView::with_default_detail(OrderStatus::Rejected),
        },
    }
}
