use std::fmt::Debug;

use log::*;

use crate::{
    bridge_api::{errors::PaymentFlowError, OrderAnnotator, TagUpdate},
    bridge_types::{OrderId, OrderSnapshot},
    payment_state::{decide_transition, PaymentStatus, PaymentStatusEvent, PaymentTag, TransitionDecision},
    traits::{OrderManagement, OrderManagementError},
};

/// What a payment status event did to its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(PaymentTag),
    AlreadyApplied(PaymentTag),
    Superseded { requested: PaymentTag, current: PaymentTag },
    NoAction(PaymentStatus),
    /// The event did not say which order it was for.
    MissingOrderId,
    /// The commerce platform does not know the order.
    UnknownOrder(OrderId),
}

/// `PaymentFlowApi` handles payment status notifications from the payment processor, moving the matching order through
/// the payment states described in [`crate::payment_state`].
pub struct PaymentFlowApi<B> {
    annotator: OrderAnnotator<B>,
    mark_as_paid: bool,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi(mark_as_paid: {})", self.mark_as_paid)
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(backend: B) -> Self {
        Self { annotator: OrderAnnotator::new(backend), mark_as_paid: false }
    }

    /// When enabled, an order that becomes paid is also marked as paid on the commerce platform, in addition to being
    /// tagged.
    pub fn with_mark_as_paid(mut self, mark_as_paid: bool) -> Self {
        self.mark_as_paid = mark_as_paid;
        self
    }
}

impl<B> PaymentFlowApi<B>
where B: OrderManagement
{
    pub async fn process_status_event(
        &self,
        event: &PaymentStatusEvent,
    ) -> Result<TransitionOutcome, PaymentFlowError> {
        let Some(order_id) = event.order_id.clone() else {
            warn!("🔄️ Payment status '{}' has no order id. Ignoring it.", event.status);
            return Ok(TransitionOutcome::MissingOrderId);
        };
        if event.status.target_tag().is_none() {
            debug!("🔄️ Payment status '{}' for order {order_id} needs no action.", event.status);
            return Ok(TransitionOutcome::NoAction(event.status.clone()));
        }
        let order = match self.annotator.fetch_order(&order_id).await {
            Ok(order) => order,
            Err(OrderManagementError::OrderNotFound(id)) => {
                warn!("🔄️ Received payment status '{}' for unknown order {id}. Ignoring it.", event.status);
                return Ok(TransitionOutcome::UnknownOrder(id));
            },
            Err(error) => return Err(PaymentFlowError::Order { order_id, error }),
        };
        let outcome = match decide_transition(&event.status, &order.tags) {
            TransitionDecision::Apply(tag) => {
                let update = self
                    .annotator
                    .add_tag_to(&order, tag.as_tag())
                    .await
                    .map_err(|error| PaymentFlowError::Order { order_id: order_id.clone(), error })?;
                match update {
                    TagUpdate::Added(_) => {
                        info!("🔄️ Order {order_id} moved to '{tag}' (payment status '{}')", event.status);
                        TransitionOutcome::Applied(tag)
                    },
                    TagUpdate::Unchanged => TransitionOutcome::AlreadyApplied(tag),
                }
            },
            TransitionDecision::AlreadyApplied(tag) => {
                debug!("🔄️ Order {order_id} is already tagged '{tag}'.");
                TransitionOutcome::AlreadyApplied(tag)
            },
            TransitionDecision::Superseded { requested, current } => {
                info!("🔄️ Order {order_id} is already '{current}'. Not applying '{requested}'.");
                return Ok(TransitionOutcome::Superseded { requested, current });
            },
            TransitionDecision::NoAction(status) => return Ok(TransitionOutcome::NoAction(status)),
        };
        let paid = matches!(
            outcome,
            TransitionOutcome::Applied(PaymentTag::Paid) | TransitionOutcome::AlreadyApplied(PaymentTag::Paid)
        );
        if paid {
            self.ensure_marked_paid(&order).await?;
        }
        Ok(outcome)
    }

    /// Marks a paid order as paid on the commerce platform, if that is enabled and has not happened yet.
    ///
    /// A failed capture leaves the paid tag in place. The next paid event for the order tries the capture again.
    async fn ensure_marked_paid(&self, order: &OrderSnapshot) -> Result<(), PaymentFlowError> {
        if !self.mark_as_paid || order.is_marked_paid() {
            return Ok(());
        }
        let order_id = order.order_id();
        self.annotator
            .mark_as_paid(&order_id)
            .await
            .map_err(|error| PaymentFlowError::MarkAsPaid { order_id: order_id.clone(), error })?;
        info!("🔄️ Order {order_id} marked as paid");
        Ok(())
    }
}
