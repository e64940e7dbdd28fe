//! Pure projections from order outcomes into renderable view models.

use std::fmt;

use shared::{
    domain::{Delivery, Item, OrderId, OrderRecord, Payment},
    error::{ErrorKind, OperationError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: String,
    pub fields: Vec<DetailField>,
}

impl DetailSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    fn field(mut self, label: &'static str, value: impl ToString) -> Self {
        self.fields.push(DetailField {
            label,
            value: value.to_string(),
        });
        self
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| field.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Order {
        heading: String,
        sections: Vec<DetailSection>,
    },
    Confirmation {
        message: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl DetailView {
    pub fn is_error(&self) -> bool {
        matches!(self, DetailView::Error { .. })
    }

    pub fn section(&self, title: &str) -> Option<&DetailSection> {
        match self {
            DetailView::Order { sections, .. } => {
                sections.iter().find(|section| section.title == title)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailView::Order { heading, sections } => {
                writeln!(f, "== {heading} ==")?;
                for section in sections {
                    writeln!(f, "[{}]", section.title)?;
                    for field in &section.fields {
                        writeln!(f, "  {}: {}", field.label, field.value)?;
                    }
                }
                Ok(())
            }
            DetailView::Confirmation { message } => writeln!(f, "{message}"),
            DetailView::Error { kind, message } => writeln!(f, "Error ({kind}): {message}"),
        }
    }
}

pub const ORDER_HEADING: &str = "Order Details";
pub const CREATED_HEADING: &str = "Order Created";

#[derive(Debug, Default, Clone, Copy)]
pub struct OrderDetailPresenter;

impl OrderDetailPresenter {
    pub fn render_order(&self, record: &OrderRecord) -> DetailView {
        order_view(ORDER_HEADING, record)
    }

    pub fn render_created(&self, record: &OrderRecord) -> DetailView {
        order_view(CREATED_HEADING, record)
    }

    pub fn render_deleted(&self, id: &OrderId) -> DetailView {
        DetailView::Confirmation {
            message: format!("Order {id} deleted"),
        }
    }

    pub fn render_error(&self, error: &OperationError) -> DetailView {
        DetailView::Error {
            kind: error.kind,
            message: error.message.clone(),
        }
    }

    pub fn render_notice(&self, error: &OperationError) -> String {
        format!("Order list unavailable: {}", error.message)
    }

    pub fn render_list(&self, ids: &[OrderId]) -> String {
        if ids.is_empty() {
            return "No orders loaded".to_string();
        }
        let mut out = format!("Orders ({}):", ids.len());
        for (position, id) in ids.iter().enumerate() {
            out.push_str(&format!("\n  {}. {id}", position + 1));
        }
        out
    }
}

fn order_view(heading: &str, record: &OrderRecord) -> DetailView {
    let mut sections = vec![order_section(record), delivery_section(&record.delivery)];
    if record.items.is_empty() {
        sections.push(DetailSection::new("Items"));
    } else {
        sections.extend(
            record
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| item_section(position + 1, item)),
        );
    }
    sections.push(payment_section(&record.payment));

    DetailView::Order {
        heading: heading.to_string(),
        sections,
    }
}

fn order_section(record: &OrderRecord) -> DetailSection {
    DetailSection::new("Order")
        .field("Order ID", &record.order_uid)
        .field("Track Number", &record.track_number)
        .field("Entry", &record.entry)
        .field("Locale", &record.locale)
        .field("Internal Signature", &record.internal_signature)
        .field("Customer ID", &record.customer_id)
        .field("Delivery Service", &record.delivery_service)
        .field("Shardkey", &record.shardkey)
        .field("SmID", record.sm_id)
        .field("Date Created", record.date_created.to_rfc3339())
        .field("Oof Shard", &record.oof_shard)
}

fn delivery_section(delivery: &Delivery) -> DetailSection {
    DetailSection::new("Delivery")
        .field("Name", &delivery.name)
        .field("Phone", &delivery.phone)
        .field("Zip", &delivery.zip)
        .field("City", &delivery.city)
        .field("Address", &delivery.address)
        .field("Region", &delivery.region)
        .field("Email", &delivery.email)
}

fn item_section(number: usize, item: &Item) -> DetailSection {
    DetailSection::new(format!("Item {number}"))
        .field("Chrt ID", item.chrt_id)
        .field("Track Number", &item.track_number)
        .field("Price", item.price)
        .field("Rid", &item.rid)
        .field("Name", &item.name)
        .field("Sale", item.sale)
        .field("Size", &item.size)
        .field("Total Price", item.total_price)
        .field("Nm ID", item.nm_id)
        .field("Brand", &item.brand)
        .field("Status", item.status)
}

fn payment_section(payment: &Payment) -> DetailSection {
    DetailSection::new("Payment")
        .field("Transaction", &payment.transaction)
        .field("Request ID", &payment.request_id)
        .field("Currency", &payment.currency)
        .field("Provider", &payment.provider)
        .field("Amount", payment.amount)
        .field("Payment Datetime", payment.payment_dt)
        .field("Bank", &payment.bank)
        .field("Delivery Cost", payment.delivery_cost)
        .field("Goods Total", payment.goods_total)
        .field("Custom Fee", payment.custom_fee)
}

#[cfg(test)]
#[path = "tests/presenter_tests.rs"]
mod tests;
