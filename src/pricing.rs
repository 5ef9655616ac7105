//! Bundle pricing.
//!
//! Pure computation: the caller resolves unit prices from the catalog and
//! passes plain lines in, so nothing here touches the database. All amounts
//! are integer cents; intermediate percentage arithmetic runs on `Decimal`
//! and is rounded to whole cents only at the output boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::FixedAmount => "fixed_amount",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(DiscountType::Percentage),
            "fixed_amount" => Some(DiscountType::FixedAmount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SubscriptionDuration {
    #[serde(rename = "1_month")]
    OneMonth,
    #[serde(rename = "3_month")]
    ThreeMonth,
    #[serde(rename = "6_month")]
    SixMonth,
    #[serde(rename = "12_month")]
    TwelveMonth,
}

impl SubscriptionDuration {
    pub const ALL: [SubscriptionDuration; 4] = [
        SubscriptionDuration::OneMonth,
        SubscriptionDuration::ThreeMonth,
        SubscriptionDuration::SixMonth,
        SubscriptionDuration::TwelveMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionDuration::OneMonth => "1_month",
            SubscriptionDuration::ThreeMonth => "3_month",
            SubscriptionDuration::SixMonth => "6_month",
            SubscriptionDuration::TwelveMonth => "12_month",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1_month" => Some(SubscriptionDuration::OneMonth),
            "3_month" => Some(SubscriptionDuration::ThreeMonth),
            "6_month" => Some(SubscriptionDuration::SixMonth),
            "12_month" => Some(SubscriptionDuration::TwelveMonth),
            _ => None,
        }
    }

    /// Default percentage discount applied when an operator picks this
    /// duration. A one-time default: a manually edited discount value is
    /// never overwritten afterwards.
    pub fn default_discount_percent(&self) -> i64 {
        match self {
            SubscriptionDuration::OneMonth => 0,
            SubscriptionDuration::ThreeMonth => 15,
            SubscriptionDuration::SixMonth => 25,
            SubscriptionDuration::TwelveMonth => 35,
        }
    }
}

/// One priced line of a bundle. `unit_price` is `None` when the referenced
/// product no longer exists or carries no price; such lines contribute zero
/// to the total instead of aborting the computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BundlePricing {
    pub original_price: i64,
    pub savings: i64,
    pub final_price: i64,
}

/// Compute the three derived price fields for a set of lines and a discount
/// rule.
///
/// Percentage values outside [0, 100] are clamped; a fixed amount larger
/// than the original price is capped at it. The final price never goes
/// below zero.
pub fn compute_pricing(
    lines: &[PriceLine],
    discount_type: DiscountType,
    discount_value: i64,
) -> BundlePricing {
    let original_price: i64 = lines
        .iter()
        .map(|line| line.unit_price.unwrap_or(0) * i64::from(line.quantity.max(0)))
        .sum();

    let savings = match discount_type {
        DiscountType::Percentage => {
            let percent = Decimal::from(discount_value.clamp(0, 100));
            let raw = Decimal::from(original_price) * percent / Decimal::from(100);
            raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .unwrap_or(original_price)
        }
        DiscountType::FixedAmount => discount_value.max(0).min(original_price.max(0)),
    };

    BundlePricing {
        original_price,
        savings,
        final_price: (original_price - savings).max(0),
    }
}
