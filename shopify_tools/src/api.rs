use std::sync::Arc;

use graphql_parser::parse_query;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ShopifyConfig,
    helpers::{order_gid, order_id_value},
    NoteAttribute,
    ShopifyApiError,
    ShopifyOrder,
};

#[derive(Clone)]
pub struct ShopifyApi {
    config: ShopifyConfig,
    client: Arc<Client>,
}

#[derive(Deserialize)]
struct OrderResponse {
    order: ShopifyOrder,
}

impl ShopifyApi {
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.admin_access_token.reveal().as_str())
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        headers.insert("X-Shopify-Access-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, ShopifyApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ShopifyApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ShopifyApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ShopifyApiError::RestResponseError(e.to_string()))?;
            Err(ShopifyApiError::QueryError { status, message })
        }
    }

    pub async fn graphql_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, ShopifyApiError> {
        let query = parse_query::<String>(query).map_err(|e| ShopifyApiError::InvalidGraphQL(e.to_string()))?;
        let mut body = serde_json::json!({
            "query": query.to_string(),
        });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }
        trace!("Sending GraphQL query: {body}");
        let result = self.rest_query::<Value, Value>(Method::POST, "/graphql.json", &[], Some(body)).await?;
        if let Some(errors) = result["errors"].as_array() {
            let e = errors.iter().map(|e| e.to_string()).collect::<Vec<String>>().join(", ");
            return Err(ShopifyApiError::GraphQLError(e));
        }
        let data = result["data"].clone();
        trace!("GraphQL response: {data}");
        trace!("GraphQL costs: {}", result["extensions"]["cost"]);
        if data.is_null() {
            return Err(ShopifyApiError::EmptyResponse);
        }
        serde_json::from_value(data).map_err(|e| ShopifyApiError::JsonError(e.to_string()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://{}/admin/api/{}{path}", self.config.shop, self.config.api_version)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<ShopifyOrder, ShopifyApiError> {
        let path = format!("/orders/{order_id}.json");
        debug!("🛍️ Fetching order #{order_id}");
        let result = self.rest_query::<OrderResponse, ()>(Method::GET, &path, &[], None).await?;
        trace!("🛍️ Fetched order #{order_id}. Tags: [{}]", result.order.tags);
        Ok(result.order)
    }

    /// Overwrites the order's tag string. Shopify replaces the whole list, so callers must merge with the current tags
    /// first.
    pub async fn update_order_tags(&self, order_id: &str, tags: &str) -> Result<ShopifyOrder, ShopifyApiError> {
        let body = serde_json::json!({ "order": { "id": order_id_value(order_id), "tags": tags } });
        self.update_order(order_id, body).await
    }

    /// Overwrites the order's note attributes. As with tags, the list is replaced wholesale.
    pub async fn update_note_attributes(
        &self,
        order_id: &str,
        attributes: &[NoteAttribute],
    ) -> Result<ShopifyOrder, ShopifyApiError> {
        let body = serde_json::json!({ "order": { "id": order_id_value(order_id), "note_attributes": attributes } });
        self.update_order(order_id, body).await
    }

    async fn update_order(&self, order_id: &str, body: Value) -> Result<ShopifyOrder, ShopifyApiError> {
        let path = format!("/orders/{order_id}.json");
        debug!("🛍️ Updating order #{order_id}: {body}");
        let result = self.rest_query::<OrderResponse, Value>(Method::PUT, &path, &[], Some(body)).await?;
        info!("🛍️ Order #{order_id} updated");
        Ok(result.order)
    }

    /// Transitions the order's financial status to paid, recording a capture for the outstanding balance.
    pub async fn mark_order_as_paid(&self, order_id: &str) -> Result<(), ShopifyApiError> {
        let mutation = r#"
        mutation orderMarkAsPaid($input: OrderMarkAsPaidInput!) {
          orderMarkAsPaid(input: $input) {
            order { id displayFinancialStatus }
            userErrors { field message }
          }
        }"#;
        let variables = serde_json::json!({ "input": { "id": order_gid(order_id) } });
        debug!("🛍️ Marking order #{order_id} as paid");
        let response = self.graphql_query::<Value>(mutation, Some(variables)).await?;
        if let Some(errors) = response["orderMarkAsPaid"]["userErrors"].as_array() {
            if !errors.is_empty() {
                let e = errors.iter().map(|e| e.to_string()).collect::<Vec<String>>().join(", ");
                return Err(ShopifyApiError::GraphQLError(e));
            }
        }
        info!(
            "🛍️ Order #{order_id} marked as paid. Financial status: {}",
            response["orderMarkAsPaid"]["order"]["displayFinancialStatus"]
        );
        Ok(())
    }
}
