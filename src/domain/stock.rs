//! Stock level bucketing shown next to every product.

use serde::Serialize;

/// Threshold used when a product has none (or zero) configured.
pub const DEFAULT_STOCK_THRESHOLD: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Empty,
    Low,
    Available,
}

impl StockStatus {
    pub fn classify(quantity: i32, threshold: Option<i32>) -> Self {
        if quantity <= 0 {
            Self::Empty
        } else if quantity <= effective_threshold(threshold) {
            Self::Low
        } else {
            Self::Available
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Rupture de stock",
            Self::Low => "Stock faible",
            Self::Available => "En stock",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Empty => "stock-empty",
            Self::Low => "stock-low",
            Self::Available => "stock-available",
        }
    }
}

pub fn effective_threshold(threshold: Option<i32>) -> i32 {
    match threshold {
        Some(t) if t > 0 => t,
        _ => DEFAULT_STOCK_THRESHOLD,
    }
}

/// Serialized form attached to product payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StockBadge {
    pub status: StockStatus,
    pub label: &'static str,
    pub class: &'static str,
}

impl From<StockStatus> for StockBadge {
    fn from(status: StockStatus) -> Self {
        Self { status, label: status.label(), class: status.css_class() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_negative_are_empty() {
        assert_eq!(StockStatus::classify(0, Some(5)), StockStatus::Empty);
        assert_eq!(StockStatus::classify(-3, Some(5)), StockStatus::Empty);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(StockStatus::classify(5, Some(5)), StockStatus::Low);
        assert_eq!(StockStatus::classify(1, Some(5)), StockStatus::Low);
        assert_eq!(StockStatus::classify(6, Some(5)), StockStatus::Available);
    }

    #[test]
    fn test_missing_threshold_defaults_to_five() {
        assert_eq!(StockStatus::classify(5, None), StockStatus::Low);
        assert_eq!(StockStatus::classify(5, Some(0)), StockStatus::Low);
        assert_eq!(StockStatus::classify(6, None), StockStatus::Available);
    }

    #[test]
    fn test_custom_threshold() {
        assert_eq!(StockStatus::classify(10, Some(20)), StockStatus::Low);
        assert_eq!(StockStatus::classify(2, Some(1)), StockStatus::Available);
    }

    #[test]
    fn test_badge_labels() {
        let badge = StockBadge::from(StockStatus::classify(0, None));
        assert_eq!(badge.label, "Rupture de stock");
        assert_eq!(badge.class, "stock-empty");
    }
}
