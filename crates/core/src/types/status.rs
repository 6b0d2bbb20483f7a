//! Status enums for records.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are created already confirmed; there is no payment or
/// fulfillment flow that would move them further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Confirmed,
}

impl OrderStatus {
    /// The wire representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).ok().as_deref(),
            Some("\"confirmed\"")
        );
        assert_eq!("confirmed".parse::<OrderStatus>(), Ok(OrderStatus::Confirmed));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
