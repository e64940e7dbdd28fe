//! REST contract of the order backend: routes, accepted statuses and the
//! mapping from unexpected statuses to [`ErrorKind`].

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

pub const ORDERS_SEGMENT: &str = "orders";
pub const LIST_ALL_SEGMENT: &str = "all";
pub const BY_ID_SEGMENT: &str = "id";
pub const CREATE_SEGMENT: &str = "new";

const STATUS_OK: u16 = 200;
const STATUS_NOT_FOUND: u16 = 404;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderOperation {
    ListAll,
    Fetch,
    Create,
    Delete,
}

impl OrderOperation {
    pub fn name(self) -> &'static str {
        match self {
            OrderOperation::ListAll => "list_all",
            OrderOperation::Fetch => "fetch",
            OrderOperation::Create => "create",
            OrderOperation::Delete => "delete",
        }
    }

    pub fn failure_kind(self) -> ErrorKind {
        match self {
            OrderOperation::ListAll => ErrorKind::ListFailed,
            OrderOperation::Fetch => ErrorKind::FetchFailed,
            OrderOperation::Create => ErrorKind::CreateFailed,
            OrderOperation::Delete => ErrorKind::DeleteFailed,
        }
    }

    /// Whether the operation addresses a single order and so can report
    /// [`ErrorKind::NotFound`].
    pub fn targets_order(self) -> bool {
        matches!(self, OrderOperation::Fetch | OrderOperation::Delete)
    }

    pub fn accepts_status(self, status: u16) -> bool {
        match self {
            OrderOperation::ListAll | OrderOperation::Fetch => status == STATUS_OK,
            OrderOperation::Create | OrderOperation::Delete => (200..300).contains(&status),
        }
    }

    pub fn failure_for_status(self, status: u16) -> ErrorKind {
        if status == STATUS_NOT_FOUND && self.targets_order() {
            ErrorKind::NotFound
        } else {
            self.failure_kind()
        }
    }

    /// Path segments below the backend base URL. `order_id` is only used by
    /// operations that target a single order.
    pub fn path_segments<'a>(self, order_id: &'a str) -> Vec<&'a str> {
        match self {
            OrderOperation::ListAll => vec![ORDERS_SEGMENT, LIST_ALL_SEGMENT],
            OrderOperation::Create => vec![ORDERS_SEGMENT, CREATE_SEGMENT],
            OrderOperation::Fetch | OrderOperation::Delete => {
                vec![ORDERS_SEGMENT, BY_ID_SEGMENT, order_id]
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
