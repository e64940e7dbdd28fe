//! Sequences user intent into order operations and applies their outcomes to
//! the id list and the detail view.
//!
//! Network awaits never hold the state lock, so operations of any kind may be
//! in flight at the same time. Outcomes are applied in the order responses
//! arrive, not the order they were requested. The one exception is the
//! session's initial list: creates and deletes that land before it are
//! reapplied on top of its snapshot.

use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{OrderId, OrderRecord},
    error::{OperationError, OperationResult},
    protocol::OrderOperation,
};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    presenter::{DetailView, OrderDetailPresenter},
    store::OrderListStore,
    OrderClient,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    OperationStateChanged {
        operation: OrderOperation,
        phase: OperationPhase,
    },
    ListChanged(Vec<OrderId>),
    DetailChanged(DetailView),
    Notice(String),
}

/// A list mutation applied while the initial list load is outstanding.
#[derive(Debug, Clone)]
enum ListEdit {
    Added(OrderId),
    Removed(OrderId),
}

#[derive(Default)]
struct ControllerState {
    store: OrderListStore,
    detail: Option<DetailView>,
    notice: Option<String>,
    session_started: bool,
    /// `Some` while the session's list-all is in flight; replayed on top of
    /// its snapshot so creates and deletes that finish first are kept.
    pending_edits: Option<Vec<ListEdit>>,
    in_flight: HashMap<OrderOperation, usize>,
}

impl ControllerState {
    fn record_edit(&mut self, edit: ListEdit) {
        if let Some(edits) = self.pending_edits.as_mut() {
            edits.push(edit);
        }
    }

    fn load_snapshot(&mut self, ids: Vec<OrderId>, edits: Vec<ListEdit>) {
        self.store.load(ids);
        for edit in edits {
            match edit {
                ListEdit::Added(id) => {
                    self.store.add(id);
                }
                ListEdit::Removed(id) => {
                    self.store.remove(&id);
                }
            }
        }
    }
}

pub struct UiController {
    client: Arc<dyn OrderClient>,
    presenter: OrderDetailPresenter,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl UiController {
    pub fn new(client: Arc<dyn OrderClient>) -> Arc<Self> {
        Self::with_presenter(client, OrderDetailPresenter)
    }

    pub fn with_presenter(
        client: Arc<dyn OrderClient>,
        presenter: OrderDetailPresenter,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            client,
            presenter,
            inner: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn presenter(&self) -> &OrderDetailPresenter {
        &self.presenter
    }

    /// Loads the initial id list. Runs the remote call at most once per
    /// controller; a failure leaves a notice and the session usable.
    pub async fn start_session(&self) -> OperationResult<()> {
        let operation = OrderOperation::ListAll;
        {
            let mut guard = self.inner.lock().await;
            if guard.session_started {
                warn!("orders: session already started; ignoring repeated start");
                return Ok(());
            }
            guard.session_started = true;
            guard.pending_edits = Some(Vec::new());
            self.begin(&mut guard, operation);
        }

        let result = self.client.list_all().await;

        let mut guard = self.inner.lock().await;
        let edits = guard.pending_edits.take().unwrap_or_default();
        match result {
            Ok(ids) => {
                if !edits.is_empty() {
                    debug!(
                        edits = edits.len(),
                        "orders: replaying list edits made during initial load"
                    );
                }
                guard.load_snapshot(ids, edits);
                guard.notice = None;
                info!(count = guard.store.len(), "orders: session list loaded");
                self.emit(ControllerEvent::ListChanged(guard.store.ids().to_vec()));
                self.finish(&mut guard, operation, true);
                Ok(())
            }
            Err(err) => {
                warn!("orders: initial list load failed: {err}");
                let notice = self.presenter.render_notice(&err);
                guard.notice = Some(notice.clone());
                self.emit(ControllerEvent::Notice(notice));
                self.finish(&mut guard, operation, false);
                Err(err)
            }
        }
    }

    pub async fn fetch(&self, id: &str) -> OperationResult<OrderRecord> {
        let operation = OrderOperation::Fetch;
        let id = self.validate_id(operation, id).await?;
        self.begin(&mut self.inner.lock().await, operation);

        let result = self.client.fetch_by_id(&id).await;

        let mut guard = self.inner.lock().await;
        let view = match &result {
            Ok(record) => self.presenter.render_order(record),
            Err(err) => {
                warn!(order_uid = %id, "orders: fetch failed: {err}");
                self.presenter.render_error(err)
            }
        };
        self.show_detail(&mut guard, view);
        self.finish(&mut guard, operation, result.is_ok());
        result
    }

    pub async fn create(&self) -> OperationResult<OrderRecord> {
        let operation = OrderOperation::Create;
        self.begin(&mut self.inner.lock().await, operation);

        let result = self.client.create().await;

        let mut guard = self.inner.lock().await;
        let view = match &result {
            Ok(record) => {
                guard.record_edit(ListEdit::Added(record.order_uid.clone()));
                if guard.store.add(record.order_uid.clone()) {
                    self.emit(ControllerEvent::ListChanged(guard.store.ids().to_vec()));
                }
                info!(order_uid = %record.order_uid, "orders: order created");
                self.presenter.render_created(record)
            }
            Err(err) => {
                warn!("orders: create failed: {err}");
                self.presenter.render_error(err)
            }
        };
        self.show_detail(&mut guard, view);
        self.finish(&mut guard, operation, result.is_ok());
        result
    }

    /// Deletes remotely and only then drops the id from the list; a failed
    /// delete leaves the list as it was.
    pub async fn delete(&self, id: &str) -> OperationResult<()> {
        let operation = OrderOperation::Delete;
        let id = self.validate_id(operation, id).await?;
        self.begin(&mut self.inner.lock().await, operation);

        let result = self.client.delete_by_id(&id).await;

        let mut guard = self.inner.lock().await;
        let view = match &result {
            Ok(()) => {
                guard.record_edit(ListEdit::Removed(id.clone()));
                if guard.store.remove(&id) {
                    self.emit(ControllerEvent::ListChanged(guard.store.ids().to_vec()));
                }
                info!(order_uid = %id, "orders: order deleted");
                self.presenter.render_deleted(&id)
            }
            Err(err) => {
                warn!(order_uid = %id, "orders: delete failed: {err}");
                self.presenter.render_error(err)
            }
        };
        self.show_detail(&mut guard, view);
        self.finish(&mut guard, operation, result.is_ok());
        result
    }

    pub async fn order_ids(&self) -> Vec<OrderId> {
        self.inner.lock().await.store.ids().to_vec()
    }

    pub async fn detail(&self) -> Option<DetailView> {
        self.inner.lock().await.detail.clone()
    }

    pub async fn notice(&self) -> Option<String> {
        self.inner.lock().await.notice.clone()
    }

    /// Steady-state phase: `InFlight` while any invocation of `operation` is
    /// outstanding, `Idle` otherwise. Succeeded/Failed are only observable as
    /// events.
    pub async fn phase(&self, operation: OrderOperation) -> OperationPhase {
        let guard = self.inner.lock().await;
        if guard.in_flight.get(&operation).copied().unwrap_or(0) > 0 {
            OperationPhase::InFlight
        } else {
            OperationPhase::Idle
        }
    }

    async fn validate_id(&self, operation: OrderOperation, id: &str) -> OperationResult<OrderId> {
        if !id.is_empty() {
            return Ok(OrderId::from(id));
        }
        let err = OperationError::empty_order_id();
        warn!(operation = operation.name(), "orders: rejected empty order id");
        let mut guard = self.inner.lock().await;
        let view = self.presenter.render_error(&err);
        self.show_detail(&mut guard, view);
        self.emit_phase(operation, OperationPhase::Failed);
        if guard.in_flight.get(&operation).copied().unwrap_or(0) == 0 {
            self.emit_phase(operation, OperationPhase::Idle);
        }
        Err(err)
    }

    fn begin(&self, guard: &mut MutexGuard<'_, ControllerState>, operation: OrderOperation) {
        *guard.in_flight.entry(operation).or_insert(0) += 1;
        self.emit_phase(operation, OperationPhase::InFlight);
    }

    fn finish(
        &self,
        guard: &mut MutexGuard<'_, ControllerState>,
        operation: OrderOperation,
        succeeded: bool,
    ) {
        let outstanding = guard.in_flight.entry(operation).or_insert(0);
        *outstanding = outstanding.saturating_sub(1);
        let idle = *outstanding == 0;

        let phase = if succeeded {
            OperationPhase::Succeeded
        } else {
            OperationPhase::Failed
        };
        self.emit_phase(operation, phase);
        if idle {
            self.emit_phase(operation, OperationPhase::Idle);
        }
    }

    fn show_detail(&self, guard: &mut MutexGuard<'_, ControllerState>, view: DetailView) {
        guard.detail = Some(view.clone());
        self.emit(ControllerEvent::DetailChanged(view));
    }

    fn emit_phase(&self, operation: OrderOperation, phase: OperationPhase) {
        self.emit(ControllerEvent::OperationStateChanged { operation, phase });
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
