//! Order status.
//!
//! Orders move `PENDING -> PAID -> SHIPPED`. The storefront only ever moves an
//! order forward (payment); staff may set any of the three values from the
//! admin panel to correct mistakes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not one of the known values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct ParseOrderStatusError(pub String);

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created at checkout, not paid yet.
    #[default]
    Pending,
    /// Marked paid by the payment simulator.
    Paid,
    /// Dispatched by staff.
    Shipped,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Paid, Self::Shipped];

    /// Stored/form value (`PENDING`, `PAID`, `SHIPPED`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Shipped => "SHIPPED",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid (Simulated)",
            Self::Shipped => "Shipped",
        }
    }

    /// Whether payment has been recorded for this order.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid | Self::Shipped)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "SHIPPED" => Ok(Self::Shipped),
            other => Err(ParseOrderStatusError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("paid".parse::<OrderStatus>().is_err());
        assert!("CANCELLED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_serde_uses_stored_values() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"SHIPPED\"");
    }
}
