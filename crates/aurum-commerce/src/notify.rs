//! User-facing notices.
//!
//! The storefront reports rejected mutations and completed cart changes as
//! one-way notices. Delivery is best effort; nothing waits on a sink.

use crate::configurator::ValidationReason;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

/// A user-facing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// The product has no stock.
    OutOfStock { product_id: ProductId },
    /// The requested quantity is more than the product's stock.
    ExceedsStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
    ProductAdded { product_id: ProductId, quantity: i64 },
    ProductRemoved { product_id: ProductId },
    CartUpdated { product_id: ProductId, quantity: i64 },
    CartCleared,
    /// "Next" was pressed on an incomplete step.
    StepValidation { reason: ValidationReason },
}

impl Notice {
    /// Stable message key, e.g. for a translation table.
    pub fn key(&self) -> &'static str {
        match self {
            Notice::OutOfStock { .. } => "outOfStock",
            Notice::ExceedsStock { .. } => "exceedsStock",
            Notice::ProductAdded { .. } => "productAdded",
            Notice::ProductRemoved { .. } => "productRemoved",
            Notice::CartUpdated { .. } => "cartUpdated",
            Notice::CartCleared => "cartCleared",
            Notice::StepValidation { reason } => reason.message_key(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Notice::OutOfStock { .. }
            | Notice::ExceedsStock { .. }
            | Notice::StepValidation { .. } => Severity::Warning,
            Notice::ProductAdded { .. } => Severity::Success,
            Notice::ProductRemoved { .. } | Notice::CartUpdated { .. } | Notice::CartCleared => {
                Severity::Info
            }
        }
    }

    /// English fallback text.
    pub fn message(&self) -> String {
        match self {
            Notice::OutOfStock { product_id } => format!("{} is out of stock", product_id),
            Notice::ExceedsStock { available, .. } => {
                format!("Only {} left in stock", available)
            }
            Notice::ProductAdded { .. } => "Added to cart".to_string(),
            Notice::ProductRemoved { .. } => "Removed from cart".to_string(),
            Notice::CartUpdated { quantity, .. } => format!("Quantity updated to {}", quantity),
            Notice::CartCleared => "Cart cleared".to_string(),
            Notice::StepValidation { reason } => reason.message().to_string(),
        }
    }
}

/// Receiver of notices.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs every notice through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notice: Notice) {
        match notice.severity() {
            Severity::Warning => tracing::warn!(key = notice.key(), "{}", notice.message()),
            Severity::Success | Severity::Info => {
                tracing::info!(key = notice.key(), "{}", notice.message())
            }
        }
    }
}

/// Keeps notices in memory until taken.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Drain the recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.notices().iter().map(Notice::key).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
