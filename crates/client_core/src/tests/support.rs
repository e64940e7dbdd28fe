use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{Delivery, Item, OrderId, OrderRecord, Payment},
    error::{OperationError, OperationResult},
    protocol::OrderOperation,
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::OrderClient;

pub(crate) fn sample_order(uid: &str) -> OrderRecord {
    OrderRecord {
        order_uid: OrderId::from(uid),
        track_number: "WBILMTESTTRACK".to_string(),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Test Testov".to_string(),
            phone: "+9720000000".to_string(),
            zip: "2639809".to_string(),
            city: "Kiryat Mozkin".to_string(),
            address: "Ploshad Mira 15".to_string(),
            region: "Kraiot".to_string(),
            email: "test@gmail.com".to_string(),
        },
        payment: Payment {
            transaction: format!("tx-{uid}"),
            request_id: "req-1".to_string(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 1817,
            payment_dt: 1637907727,
            bank: "alpha".to_string(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 7,
        },
        items: vec![
            Item {
                chrt_id: 9934930,
                track_number: "WBILMTESTTRACK".to_string(),
                price: 453,
                rid: "ab4219087a764ae0btest".to_string(),
                name: "Mascaras".to_string(),
                sale: 30,
                size: "0".to_string(),
                total_price: 317,
                nm_id: 2389212,
                brand: "Vivienne Sabo".to_string(),
                status: 202,
            },
            Item {
                chrt_id: 1200,
                track_number: "WBILMTESTTRACK".to_string(),
                price: 100,
                rid: "rid-second".to_string(),
                name: "Brush".to_string(),
                sale: 0,
                size: "M".to_string(),
                total_price: 100,
                nm_id: 5511,
                brand: "Acme".to_string(),
                status: 200,
            },
        ],
        locale: "en".to_string(),
        internal_signature: "sig".to_string(),
        customer_id: "customer-1".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "9".to_string(),
        sm_id: 99,
        date_created: "2021-11-26T06:22:19Z".parse().expect("timestamp"),
        oof_shard: "1".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedCall {
    ListAll,
    Fetch(OrderId),
    Create,
    Delete(OrderId),
}

/// In-memory backend standing in for the HTTP client.
#[derive(Default)]
pub(crate) struct FakeOrderClient {
    orders: Mutex<Vec<OrderRecord>>,
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<OrderOperation, OperationError>>,
    next_uids: Mutex<Vec<String>>,
    held_list: Mutex<Option<Arc<Notify>>>,
    held_fetches: Mutex<HashMap<OrderId, Arc<Notify>>>,
    held_deletes: Mutex<HashMap<OrderId, Arc<Notify>>>,
}

impl FakeOrderClient {
    pub(crate) fn with_orders(uids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(uids.iter().map(|uid| sample_order(uid)).collect()),
            ..Self::default()
        })
    }

    pub(crate) async fn fail(&self, operation: OrderOperation, err: OperationError) {
        self.failures.lock().await.insert(operation, err);
    }

    pub(crate) async fn recover(&self, operation: OrderOperation) {
        self.failures.lock().await.remove(&operation);
    }

    /// Uids handed out by subsequent creates, in order.
    pub(crate) async fn queue_uids(&self, uids: &[&str]) {
        let mut queue = self.next_uids.lock().await;
        queue.extend(uids.iter().map(|uid| uid.to_string()));
    }

    /// The next list-all takes its snapshot immediately but only returns it
    /// once the handle is notified.
    pub(crate) async fn hold_list(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.held_list.lock().await = Some(notify.clone());
        notify
    }

    /// Blocks fetches of `uid` until the returned handle is notified.
    pub(crate) async fn hold_fetch(&self, uid: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.held_fetches
            .lock()
            .await
            .insert(OrderId::from(uid), notify.clone());
        notify
    }

    pub(crate) async fn hold_delete(&self, uid: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.held_deletes
            .lock()
            .await
            .insert(OrderId::from(uid), notify.clone());
        notify
    }

    pub(crate) async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn check_failure(&self, operation: OrderOperation) -> OperationResult<()> {
        match self.failures.lock().await.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OrderClient for FakeOrderClient {
    async fn list_all(&self) -> OperationResult<Vec<OrderId>> {
        self.calls.lock().await.push(RecordedCall::ListAll);
        self.check_failure(OrderOperation::ListAll).await?;
        let snapshot: Vec<OrderId> = self
            .orders
            .lock()
            .await
            .iter()
            .map(|order| order.order_uid.clone())
            .collect();
        let hold = self.held_list.lock().await.take();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        Ok(snapshot)
    }

    async fn fetch_by_id(&self, id: &OrderId) -> OperationResult<OrderRecord> {
        self.calls.lock().await.push(RecordedCall::Fetch(id.clone()));
        let hold = self.held_fetches.lock().await.get(id).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.check_failure(OrderOperation::Fetch).await?;
        self.orders
            .lock()
            .await
            .iter()
            .find(|order| &order.order_uid == id)
            .cloned()
            .ok_or_else(|| OperationError::not_found(id))
    }

    async fn create(&self) -> OperationResult<OrderRecord> {
        self.calls.lock().await.push(RecordedCall::Create);
        self.check_failure(OrderOperation::Create).await?;
        let uid = {
            let mut queue = self.next_uids.lock().await;
            if queue.is_empty() {
                format!("generated-{}", self.orders.lock().await.len() + 1)
            } else {
                queue.remove(0)
            }
        };
        let order = sample_order(&uid);
        self.orders.lock().await.push(order.clone());
        Ok(order)
    }

    async fn delete_by_id(&self, id: &OrderId) -> OperationResult<()> {
        self.calls.lock().await.push(RecordedCall::Delete(id.clone()));
        let hold = self.held_deletes.lock().await.get(id).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        self.check_failure(OrderOperation::Delete).await?;
        let mut orders = self.orders.lock().await;
        let Some(position) = orders.iter().position(|order| &order.order_uid == id) else {
            return Err(OperationError::not_found(id));
        };
        orders.remove(position);
        Ok(())
    }
}

/// State of the axum stand-in for the order backend.
#[derive(Clone, Default)]
pub(crate) struct BackendState {
    pub(crate) orders: Arc<Mutex<Vec<OrderRecord>>>,
    pub(crate) requests: Arc<Mutex<Vec<String>>>,
    pub(crate) forced_status: Arc<Mutex<Option<StatusCode>>>,
    pub(crate) null_when_empty: Arc<Mutex<bool>>,
    pub(crate) malformed_fetch_body: Arc<Mutex<bool>>,
    pub(crate) created: Arc<Mutex<u32>>,
}

impl BackendState {
    async fn record(&self, request: String) -> Option<Response> {
        self.requests.lock().await.push(request);
        let forced = *self.forced_status.lock().await;
        forced.map(IntoResponse::into_response)
    }
}

async fn backend_list_all(State(state): State<BackendState>) -> Response {
    if let Some(forced) = state.record("GET /orders/all".to_string()).await {
        return forced;
    }
    let ids: Vec<OrderId> = state
        .orders
        .lock()
        .await
        .iter()
        .map(|order| order.order_uid.clone())
        .collect();
    if ids.is_empty() && *state.null_when_empty.lock().await {
        return Json(serde_json::Value::Null).into_response();
    }
    Json(ids).into_response()
}

async fn backend_fetch(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    if let Some(forced) = state.record(format!("GET /orders/id/{id}")).await {
        return forced;
    }
    if *state.malformed_fetch_body.lock().await {
        return (StatusCode::OK, "{\"order_uid\": 12").into_response();
    }
    match state
        .orders
        .lock()
        .await
        .iter()
        .find(|order| order.order_uid.as_str() == id)
    {
        Some(order) => Json(order.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn backend_create(State(state): State<BackendState>) -> Response {
    if let Some(forced) = state.record("POST /orders/new".to_string()).await {
        return forced;
    }
    let uid = {
        let mut created = state.created.lock().await;
        *created += 1;
        format!("created-{created}")
    };
    let order = sample_order(&uid);
    state.orders.lock().await.push(order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn backend_delete(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    if let Some(forced) = state.record(format!("DELETE /orders/id/{id}")).await {
        return forced;
    }
    let mut orders = state.orders.lock().await;
    match orders.iter().position(|order| order.order_uid.as_str() == id) {
        Some(position) => {
            orders.remove(position);
            StatusCode::NO_CONTENT.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub(crate) async fn spawn_order_backend(uids: &[&str]) -> (String, BackendState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let state = BackendState::default();
    *state.orders.lock().await = uids.iter().map(|uid| sample_order(uid)).collect();

    let app = Router::new()
        .route("/orders/all", get(backend_list_all))
        .route("/orders/new", post(backend_create))
        .route("/orders/id/:id", get(backend_fetch).delete(backend_delete))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

/// Base URL of a port nothing listens on.
pub(crate) async fn unreachable_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
