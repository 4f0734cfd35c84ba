//! Order, repair, payment and account role vocabularies.
//!
//! Status columns are free-form text in the database. These enums cover the
//! conventional values; staff may set any of them in any order; the
//! `suggested_next` helpers only drive the back-office "next step" button.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct StatusError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl FromStr for $name {
            type Err = StatusError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(StatusError { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Confirmed => "Confirmée",
            Self::Processing => "En préparation",
            Self::Shipped => "Expédiée",
            Self::Delivered => "Livrée",
            Self::Cancelled => "Annulée",
        }
    }

    /// Delivered and cancelled orders are closed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn suggested_next(self) -> Option<Self> {
        if self.is_terminal() {
            return None;
        }
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    #[default]
    Received,
    Diagnosing,
    Repairing,
    Ready,
    Delivered,
    Cancelled,
}

string_enum!(RepairStatus, "repair status", {
    Received => "received",
    Diagnosing => "diagnosing",
    Repairing => "repairing",
    Ready => "ready",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl RepairStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Received => "Reçu",
            Self::Diagnosing => "Diagnostic",
            Self::Repairing => "En réparation",
            Self::Ready => "Prêt",
            Self::Delivered => "Livré",
            Self::Cancelled => "Annulé",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn suggested_next(self) -> Option<Self> {
        if self.is_terminal() {
            return None;
        }
        match self {
            Self::Received => Some(Self::Diagnosing),
            Self::Diagnosing => Some(Self::Repairing),
            Self::Repairing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "card")]
    Card,
}

string_enum!(PaymentMethod, "payment method", {
    CashOnDelivery => "cod",
    Card => "card",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    New,
    Read,
    Answered,
}

string_enum!(FeedbackStatus, "feedback status", {
    New => "new",
    Read => "read",
    Answered => "answered",
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Employee,
    Admin,
}

string_enum!(Role, "role", {
    Customer => "customer",
    Employee => "employee",
    Admin => "admin",
});

impl Role {
    /// Employees and admins may use the back-office.
    pub fn is_staff(self) -> bool { matches!(self, Self::Employee | Self::Admin) }
}

/// Display label for a stored order status, falling back to the raw text.
pub fn order_status_label(raw: &str) -> &str {
    match raw.parse::<OrderStatus>() {
        Ok(status) => status.label(),
        Err(_) => raw,
    }
}

/// Display label for a stored repair status, falling back to the raw text.
pub fn repair_status_label(raw: &str) -> &str {
    match raw.parse::<RepairStatus>() {
        Ok(status) => status.label(),
        Err(_) => raw,
    }
}
