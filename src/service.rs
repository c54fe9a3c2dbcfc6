//! Client-facing façade over the queue: enqueue on create, translate job
//! state on status queries.

use uuid::Uuid;

use crate::errors::AppError;
use crate::queue::{EnqueueOptions, JobQueue, OrderRequest, QueueError};
use crate::status::{translate_job_state, OrderStatus, OrderStatusView};

pub struct OrderService<Q> {
    queue: Q,
    options: EnqueueOptions,
}

impl<Q: JobQueue> OrderService<Q> {
    pub fn new(queue: Q, options: EnqueueOptions) -> Self {
        Self { queue, options }
    }

    /// Assign an id, enqueue the order, and return immediately; validation
    /// and persistence happen later in a worker.
    pub fn create_order(&self, request: &OrderRequest) -> Result<Uuid, AppError> {
        let job_id = Uuid::new_v4();
        match self.queue.enqueue(job_id, request, &self.options) {
            Ok(()) => Ok(job_id),
            Err(e @ QueueError::Connection(_)) => Err(e.into()),
            Err(e) => {
                log::error!("Failed to create order: {e}");
                Err(AppError::Internal("Failed to create order".to_string()))
            }
        }
    }

    /// Derive the caller-facing status from the job's current queue state.
    /// An unknown id is a distinct not-found condition, never a status.
    pub fn get_order_status(&self, order_id: Uuid) -> Result<OrderStatusView, AppError> {
        match self.queue.fetch_job(order_id) {
            Ok(Some(job)) => Ok(translate_job_state(job.status, job.result.as_ref())),
            Ok(None) => Err(AppError::NotFound),
            Err(e @ QueueError::Connection(_)) => Err(e.into()),
            Err(QueueError::Corrupt(job, reason)) => {
                log::error!("Invalid job data for order {job}: {reason}");
                Ok(OrderStatusView::new(OrderStatus::Error, "Order is invalid"))
            }
            Err(e) => {
                log::error!("Error fetching status for order {order_id}: {e}");
                Ok(OrderStatusView::new(
                    OrderStatus::Error,
                    OrderStatus::Error.description(),
                ))
            }
        }
    }
}
