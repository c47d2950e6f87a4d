use log::*;
use payment_bridge_engine::{
    bridge_types::{NoteAttribute, OrderId, OrderSnapshot, TagSet},
    OrderManagement,
    OrderManagementError,
};
use shopify_tools::{NoteAttribute as ShopifyNoteAttribute, ShopifyApi, ShopifyApiError, ShopifyOrder};

/// Shopify, as the commerce platform the bridge reconciles orders against.
#[derive(Clone)]
pub struct ShopifyOrders {
    api: ShopifyApi,
}

impl ShopifyOrders {
    pub fn new(api: ShopifyApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ShopifyApi {
        &self.api
    }
}

/// Converts a Shopify order (from a webhook or an API read) into the bridge's view of it.
///
/// Shopify has moved fields around between API versions, so the amount falls back to `current_total_price` and the
/// currency to `presentment_currency`.
pub fn order_snapshot(order: ShopifyOrder) -> OrderSnapshot {
    let gateway = order.gateway_name().map(String::from);
    let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.trim().is_empty()).cloned();
    let total_price = non_empty(&order.total_price).or_else(|| non_empty(&order.current_total_price));
    let currency = non_empty(&order.currency).or_else(|| non_empty(&order.presentment_currency));
    OrderSnapshot {
        id: order.id,
        name: order.name,
        gateway,
        total_price,
        currency,
        financial_status: order.financial_status,
        tags: TagSet::parse(&order.tags),
        note_attributes: order.note_attributes.into_iter().map(|a| NoteAttribute::new(a.name, a.value)).collect(),
    }
}

fn to_order_error(order_id: &OrderId, e: ShopifyApiError) -> OrderManagementError {
    match e {
        ShopifyApiError::QueryError { status: 404, .. } => OrderManagementError::OrderNotFound(order_id.clone()),
        ShopifyApiError::Initialization(s) | ShopifyApiError::RestResponseError(s) => {
            OrderManagementError::Unavailable(s)
        },
        e => OrderManagementError::RequestRejected(e.to_string()),
    }
}

impl OrderManagement for ShopifyOrders {
    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderManagementError> {
        let order = self.api.get_order(order_id.as_str()).await.map_err(|e| to_order_error(order_id, e))?;
        Ok(order_snapshot(order))
    }

    async fn write_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), OrderManagementError> {
        let tags = tags.to_string();
        trace!("🛍️ Writing tags [{tags}] to order {order_id}");
        self.api.update_order_tags(order_id.as_str(), &tags).await.map_err(|e| to_order_error(order_id, e))?;
        Ok(())
    }

    async fn write_note_attributes(
        &self,
        order_id: &OrderId,
        attributes: &[NoteAttribute],
    ) -> Result<(), OrderManagementError> {
        let attributes =
            attributes.iter().map(|a| ShopifyNoteAttribute::new(a.name.as_str(), a.value.as_str())).collect::<Vec<_>>();
        self.api
            .update_note_attributes(order_id.as_str(), &attributes)
            .await
            .map_err(|e| to_order_error(order_id, e))?;
        Ok(())
    }

    async fn mark_as_paid(&self, order_id: &OrderId) -> Result<(), OrderManagementError> {
        self.api.mark_order_as_paid(order_id.as_str()).await.map_err(|e| to_order_error(order_id, e))
    }
}
