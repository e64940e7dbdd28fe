use async_trait::async_trait;
use shared::{
    domain::{OrderId, OrderRecord},
    error::OperationResult,
};

pub mod controller;
pub mod presenter;
pub mod store;
pub mod transport;

pub use controller::{ControllerEvent, OperationPhase, UiController};
pub use presenter::{DetailField, DetailSection, DetailView, OrderDetailPresenter};
pub use store::OrderListStore;
pub use transport::{HttpOrderClient, TransportConfigError};

/// The four remote order operations. Implementations never fail with anything
/// other than an `OperationError`: transport and status failures are folded
/// into it before returning.
#[async_trait]
pub trait OrderClient: Send + Sync {
    async fn list_all(&self) -> OperationResult<Vec<OrderId>>;
    async fn fetch_by_id(&self, id: &OrderId) -> OperationResult<OrderRecord>;
    async fn create(&self) -> OperationResult<OrderRecord>;
    async fn delete_by_id(&self, id: &OrderId) -> OperationResult<()>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
