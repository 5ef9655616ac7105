use storefront_catalog_api::pricing::{
    DiscountType, PriceLine, SubscriptionDuration, compute_pricing,
};
use uuid::Uuid;

fn line(quantity: i32, unit_price: Option<i64>) -> PriceLine {
    PriceLine {
        product_id: Uuid::new_v4(),
        quantity,
        unit_price,
    }
}

#[test]
fn sums_lines_and_applies_percentage_discount() {
    // $40 x 2 + $30 x 1 = $110.00; 15% off -> $16.50 savings, $93.50 final.
    let lines = [line(2, Some(4000)), line(1, Some(3000))];
    let pricing = compute_pricing(&lines, DiscountType::Percentage, 15);
    assert_eq!(pricing.original_price, 11000);
    assert_eq!(pricing.savings, 1650);
    assert_eq!(pricing.final_price, 9350);
}

#[test]
fn fixed_amount_clamps_to_original_price() {
    // $200 off a $110 bundle saves $110, never goes negative.
    let lines = [line(2, Some(4000)), line(1, Some(3000))];
    let pricing = compute_pricing(&lines, DiscountType::FixedAmount, 20000);
    assert_eq!(pricing.original_price, 11000);
    assert_eq!(pricing.savings, 11000);
    assert_eq!(pricing.final_price, 0);
}

#[test]
fn hundred_percent_discount_zeroes_final_price() {
    let lines = [line(3, Some(2500))];
    let pricing = compute_pricing(&lines, DiscountType::Percentage, 100);
    assert_eq!(pricing.savings, pricing.original_price);
    assert_eq!(pricing.final_price, 0);
}

#[test]
fn percentage_is_clamped_into_range() {
    let lines = [line(1, Some(10000))];

    let negative = compute_pricing(&lines, DiscountType::Percentage, -20);
    assert_eq!(negative.savings, 0);
    assert_eq!(negative.final_price, 10000);

    let oversized = compute_pricing(&lines, DiscountType::Percentage, 150);
    assert_eq!(oversized.savings, 10000);
    assert_eq!(oversized.final_price, 0);
}

#[test]
fn negative_fixed_amount_clamps_to_zero() {
    let lines = [line(1, Some(10000))];
    let pricing = compute_pricing(&lines, DiscountType::FixedAmount, -500);
    assert_eq!(pricing.savings, 0);
    assert_eq!(pricing.final_price, 10000);
}

#[test]
fn missing_unit_price_contributes_zero() {
    let lines = [line(2, Some(4000)), line(5, None)];
    let pricing = compute_pricing(&lines, DiscountType::Percentage, 10);
    assert_eq!(pricing.original_price, 8000);
    assert_eq!(pricing.savings, 800);
    assert_eq!(pricing.final_price, 7200);
}

#[test]
fn empty_lines_price_to_zero() {
    let pricing = compute_pricing(&[], DiscountType::FixedAmount, 5000);
    assert_eq!(pricing.original_price, 0);
    assert_eq!(pricing.savings, 0);
    assert_eq!(pricing.final_price, 0);
}

#[test]
fn percentage_savings_round_to_whole_cents() {
    // 3333 * 15% = 499.95 cents, rounds away from zero to 500.
    let lines = [line(1, Some(3333))];
    let pricing = compute_pricing(&lines, DiscountType::Percentage, 15);
    assert_eq!(pricing.savings, 500);
    assert_eq!(pricing.final_price, 2833);
}

#[test]
fn final_price_always_equals_original_minus_savings() {
    let lines = [line(2, Some(1999)), line(1, Some(45)), line(4, None)];
    for value in [0, 7, 33, 100] {
        let pricing = compute_pricing(&lines, DiscountType::Percentage, value);
        assert_eq!(pricing.final_price, pricing.original_price - pricing.savings);
        assert!(pricing.final_price >= 0);
    }
    for value in [0, 500, 4043, 1_000_000] {
        let pricing = compute_pricing(&lines, DiscountType::FixedAmount, value);
        assert_eq!(pricing.final_price, pricing.original_price - pricing.savings);
        assert!(pricing.final_price >= 0);
    }
}

#[test]
fn subscription_tier_defaults() {
    assert_eq!(SubscriptionDuration::OneMonth.default_discount_percent(), 0);
    assert_eq!(SubscriptionDuration::ThreeMonth.default_discount_percent(), 15);
    assert_eq!(SubscriptionDuration::SixMonth.default_discount_percent(), 25);
    assert_eq!(
        SubscriptionDuration::TwelveMonth.default_discount_percent(),
        35
    );
}

#[test]
fn six_month_tier_prices_as_quarter_off() {
    let lines = [line(1, Some(10000))];
    let pricing = compute_pricing(
        &lines,
        DiscountType::Percentage,
        SubscriptionDuration::SixMonth.default_discount_percent(),
    );
    assert_eq!(pricing.savings, 2500);
    assert_eq!(pricing.final_price, 7500);
}

#[test]
fn enum_wire_strings_round_trip() {
    for duration in SubscriptionDuration::ALL {
        assert_eq!(
            SubscriptionDuration::parse(duration.as_str()),
            Some(duration)
        );
    }
    assert_eq!(SubscriptionDuration::parse("2_month"), None);

    for discount_type in [DiscountType::Percentage, DiscountType::FixedAmount] {
        assert_eq!(DiscountType::parse(discount_type.as_str()), Some(discount_type));
    }
    assert_eq!(DiscountType::parse("bogus"), None);
}
