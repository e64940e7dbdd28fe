//! reqwest-backed [`OrderClient`] talking to the order backend's REST surface.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{OrderId, OrderRecord},
    error::{ErrorKind, OperationError, OperationResult},
    protocol::OrderOperation,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::OrderClient;

#[derive(Debug, Error)]
pub enum TransportConfigError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("backend url '{0}' cannot carry a request path")]
    NotABase(String),
}

#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    http: Client,
    base_url: Url,
}

impl HttpOrderClient {
    pub fn new(base_url: &str) -> Result<Self, TransportConfigError> {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: &str) -> Result<Self, TransportConfigError> {
        let parsed = Url::parse(base_url).map_err(|source| TransportConfigError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TransportConfigError::NotABase(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Each segment is percent-encoded on its own, so an order id containing
    /// `/` or spaces still addresses exactly one resource.
    fn endpoint(&self, operation: OrderOperation, order_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(operation.path_segments(order_id));
        }
        url
    }

    async fn send(
        &self,
        operation: OrderOperation,
        order_id: Option<&OrderId>,
    ) -> OperationResult<Response> {
        let url = self.endpoint(operation, order_id.map(OrderId::as_str).unwrap_or_default());
        let request = match operation {
            OrderOperation::ListAll | OrderOperation::Fetch => self.http.get(url),
            OrderOperation::Create => self.http.post(url),
            OrderOperation::Delete => self.http.delete(url),
        };

        let response = request.send().await.map_err(|err| {
            warn!(
                operation = operation.name(),
                order_uid = order_id.map(OrderId::as_str),
                "orders: transport failure: {err}"
            );
            OperationError::new(
                operation.failure_kind(),
                format!("{}: request failed: {err}", describe(operation, order_id)),
            )
        })?;

        let status = response.status();
        if operation.accepts_status(status.as_u16()) {
            return Ok(response);
        }

        warn!(
            operation = operation.name(),
            order_uid = order_id.map(OrderId::as_str),
            status = status.as_u16(),
            "orders: backend rejected request"
        );
        let kind = operation.failure_for_status(status.as_u16());
        match order_id {
            Some(id) if kind == ErrorKind::NotFound => Err(OperationError::not_found(id)),
            _ => Err(OperationError::new(
                kind,
                format!(
                    "{}: server responded with {status}",
                    describe(operation, order_id)
                ),
            )),
        }
    }
}

fn describe(operation: OrderOperation, order_id: Option<&OrderId>) -> String {
    match (operation, order_id) {
        (OrderOperation::ListAll, _) => "list orders".to_string(),
        (OrderOperation::Create, _) => "create order".to_string(),
        (OrderOperation::Fetch, Some(id)) => format!("fetch order {id}"),
        (OrderOperation::Delete, Some(id)) => format!("delete order {id}"),
        (OrderOperation::Fetch, None) => "fetch order".to_string(),
        (OrderOperation::Delete, None) => "delete order".to_string(),
    }
}

async fn decode_body<T: DeserializeOwned>(
    operation: OrderOperation,
    order_id: Option<&OrderId>,
    response: Response,
) -> OperationResult<T> {
    response.json::<T>().await.map_err(|err| {
        warn!(
            operation = operation.name(),
            "orders: malformed response body: {err}"
        );
        OperationError::new(
            operation.failure_kind(),
            format!(
                "{}: malformed response body: {err}",
                describe(operation, order_id)
            ),
        )
    })
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn list_all(&self) -> OperationResult<Vec<OrderId>> {
        let operation = OrderOperation::ListAll;
        let response = self.send(operation, None).await?;
        // An empty order set comes back as `null`.
        let ids: Option<Vec<OrderId>> = decode_body(operation, None, response).await?;
        let ids = ids.unwrap_or_default();
        debug!(count = ids.len(), "orders: listed order ids");
        Ok(ids)
    }

    async fn fetch_by_id(&self, id: &OrderId) -> OperationResult<OrderRecord> {
        if id.is_empty() {
            return Err(OperationError::empty_order_id());
        }
        let operation = OrderOperation::Fetch;
        let response = self.send(operation, Some(id)).await?;
        let record: OrderRecord = decode_body(operation, Some(id), response).await?;
        debug!(order_uid = %record.order_uid, "orders: fetched order");
        Ok(record)
    }

    async fn create(&self) -> OperationResult<OrderRecord> {
        let operation = OrderOperation::Create;
        let response = self.send(operation, None).await?;
        let record: OrderRecord = decode_body(operation, None, response).await?;
        if record.order_uid.is_empty() {
            warn!("orders: created order came back without order_uid");
            return Err(OperationError::new(
                operation.failure_kind(),
                "create order: response is missing order_uid",
            ));
        }
        debug!(order_uid = %record.order_uid, "orders: created order");
        Ok(record)
    }

    async fn delete_by_id(&self, id: &OrderId) -> OperationResult<()> {
        if id.is_empty() {
            return Err(OperationError::empty_order_id());
        }
        self.send(OrderOperation::Delete, Some(id)).await?;
        debug!(order_uid = %id, "orders: deleted order");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
