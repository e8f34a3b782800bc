//! Reconciliation of an order's per-currency price totals against its
//! payment totals. Pure functions; the orchestrator feeds them the live
//! items and payments and stores the result on the order row.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::{order::OrderPaymentStatus, order_item, order_payment};

/// Per-currency sum used on both sides of the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyTotal {
    pub currency_id: Uuid,
    pub total: Decimal,
}

impl CurrencyTotal {
    pub fn new(currency_id: Uuid, total: Decimal) -> Self {
        Self { currency_id, total }
    }
}

/// Sums items into per-currency totals of their discounted line prices.
/// First-seen currency order is kept so the output is deterministic.
pub fn totals_from_items(items: &[order_item::Model]) -> Vec<CurrencyTotal> {
    let mut totals: Vec<CurrencyTotal> = Vec::new();
    for item in items {
        accumulate(&mut totals, item.currency_id, item.net_total());
    }
    totals
}

/// Sums payments into per-currency totals.
pub fn totals_from_payments(payments: &[order_payment::Model]) -> Vec<CurrencyTotal> {
    let mut totals: Vec<CurrencyTotal> = Vec::new();
    for payment in payments {
        accumulate(&mut totals, payment.currency_id, payment.amount);
    }
    totals
}

fn accumulate(totals: &mut Vec<CurrencyTotal>, currency_id: Uuid, amount: Decimal) {
    match totals.iter_mut().find(|t| t.currency_id == currency_id) {
        Some(entry) => entry.total += amount,
        None => totals.push(CurrencyTotal::new(currency_id, amount)),
    }
}

/// Derives the settlement state of one order.
///
/// Every currency that appears in `prices` is compared against the matching
/// payment total, a missing one counting as zero. Totals within `epsilon`
/// of each other count as matched. Payment currencies that no price
/// mentions are never examined, so a stray payment in an untracked currency
/// cannot flip the result on its own.
pub fn compute_payment_status(
    prices: &[CurrencyTotal],
    payments: &[CurrencyTotal],
    epsilon: Decimal,
) -> OrderPaymentStatus {
    // Re-aggregate both sides so duplicate currency entries in the input
    // behave the same as pre-summed ones.
    let mut price_totals: Vec<CurrencyTotal> = Vec::new();
    for price in prices {
        accumulate(&mut price_totals, price.currency_id, price.total);
    }

    let mut paid_totals: Vec<CurrencyTotal> = Vec::new();
    for payment in payments {
        accumulate(&mut paid_totals, payment.currency_id, payment.total);
    }

    let has_payments = paid_totals.iter().any(|t| t.total > Decimal::ZERO);

    let mut all_match = true;
    let mut has_over = false;

    for price in &price_totals {
        let paid = paid_totals
            .iter()
            .find(|t| t.currency_id == price.currency_id)
            .map(|t| t.total)
            .unwrap_or(Decimal::ZERO);

        if (paid - price.total).abs() <= epsilon {
            continue;
        }

        all_match = false;
        if paid > price.total {
            has_over = true;
        }
    }

    if all_match && has_payments {
        OrderPaymentStatus::Paid
    } else if !has_payments {
        OrderPaymentStatus::Unpaid
    } else if has_over {
        OrderPaymentStatus::Overpaid
    } else {
        OrderPaymentStatus::PartiallyPaid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn usd() -> Uuid {
        Uuid::from_u128(1)
    }

    fn eur() -> Uuid {
        Uuid::from_u128(2)
    }

    fn totals(entries: &[(Uuid, Decimal)]) -> Vec<CurrencyTotal> {
        entries
            .iter()
            .map(|(currency_id, total)| CurrencyTotal::new(*currency_id, *total))
            .collect()
    }

    #[test_case(100, 100 => OrderPaymentStatus::Paid ; "exact match is paid")]
    #[test_case(100, 0 => OrderPaymentStatus::Unpaid ; "no payment is unpaid")]
    #[test_case(100, 40 => OrderPaymentStatus::PartiallyPaid ; "underpayment is partially paid")]
    #[test_case(100, 150 => OrderPaymentStatus::Overpaid ; "overpayment is overpaid")]
    fn single_currency_status(price: i64, paid: i64) -> OrderPaymentStatus {
        compute_payment_status(
            &totals(&[(usd(), Decimal::from(price))]),
            &totals(&[(usd(), Decimal::from(paid))]),
            Decimal::ZERO,
        )
    }

    #[test]
    fn missing_payment_side_is_unpaid() {
        let status =
            compute_payment_status(&totals(&[(usd(), dec!(100))]), &[], Decimal::ZERO);
        assert_eq!(status, OrderPaymentStatus::Unpaid);
    }

    #[test]
    fn mixed_currencies_with_one_underpaid_are_partially_paid() {
        let status = compute_payment_status(
            &totals(&[(usd(), dec!(100)), (eur(), dec!(50))]),
            &totals(&[(usd(), dec!(100)), (eur(), dec!(20))]),
            Decimal::ZERO,
        );
        assert_eq!(status, OrderPaymentStatus::PartiallyPaid);
    }

    #[test]
    fn overpaid_currency_outranks_underpaid_one() {
        let status = compute_payment_status(
            &totals(&[(usd(), dec!(100)), (eur(), dec!(50))]),
            &totals(&[(usd(), dec!(150)), (eur(), dec!(20))]),
            Decimal::ZERO,
        );
        assert_eq!(status, OrderPaymentStatus::Overpaid);
    }

    #[test]
    fn epsilon_tolerates_small_differences() {
        let status = compute_payment_status(
            &totals(&[(usd(), dec!(100))]),
            &totals(&[(usd(), dec!(99.995))]),
            dec!(0.01),
        );
        assert_eq!(status, OrderPaymentStatus::Paid);
    }

    #[test]
    fn stray_currency_payment_is_ignored() {
        // USD is settled; the extra EUR payment has no price to compare
        // against and must not force an overpaid result.
        let status = compute_payment_status(
            &totals(&[(usd(), dec!(100))]),
            &totals(&[(usd(), dec!(100)), (eur(), dec!(30))]),
            Decimal::ZERO,
        );
        assert_eq!(status, OrderPaymentStatus::Paid);
    }

    #[test]
    fn duplicate_currency_entries_are_summed() {
        let status = compute_payment_status(
            &totals(&[(usd(), dec!(60)), (usd(), dec!(40))]),
            &totals(&[(usd(), dec!(70)), (usd(), dec!(30))]),
            Decimal::ZERO,
        );
        assert_eq!(status, OrderPaymentStatus::Paid);
    }

    #[test]
    fn no_prices_and_no_payments_is_unpaid() {
        let status = compute_payment_status(&[], &[], Decimal::ZERO);
        assert_eq!(status, OrderPaymentStatus::Unpaid);
    }

    fn item(currency_id: Uuid, quantity: i32, price: Decimal) -> order_item::Model {
        order_item::Model {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity,
            price,
            currency_id,
            discount_amount: None,
            discount_percent: None,
            purchase_price: Decimal::ZERO,
            purchase_currency_id: currency_id,
            profit: Decimal::ZERO,
            exchange_rate: Decimal::ONE,
            removed: false,
            created_by: Uuid::new_v4(),
            removed_by: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn item_totals_use_discounted_line_prices() {
        let mut discounted = item(usd(), 2, dec!(50));
        discounted.discount_percent = Some(dec!(10));

        let items = vec![item(usd(), 1, dec!(30)), discounted, item(eur(), 3, dec!(10))];
        let totals = totals_from_items(&items);

        // 30 + 2 * 45 in USD, 3 * 10 in EUR, in first-seen order.
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0], CurrencyTotal::new(usd(), dec!(120)));
        assert_eq!(totals[1], CurrencyTotal::new(eur(), dec!(30)));
    }

    fn arb_totals() -> impl Strategy<Value = Vec<CurrencyTotal>> {
        prop::collection::vec((0u128..4, -1_000_000i64..1_000_000), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(currency, cents)| {
                    CurrencyTotal::new(Uuid::from_u128(currency), Decimal::new(cents, 2))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn status_is_total_over_arbitrary_inputs(
            prices in arb_totals(),
            payments in arb_totals(),
        ) {
            let status = compute_payment_status(&prices, &payments, Decimal::ZERO);
            prop_assert!(matches!(
                status,
                OrderPaymentStatus::Paid
                    | OrderPaymentStatus::Unpaid
                    | OrderPaymentStatus::PartiallyPaid
                    | OrderPaymentStatus::Overpaid
            ));
        }

        #[test]
        fn paying_exact_price_totals_is_always_paid(
            totals in prop::collection::vec((0u128..4, 1i64..1_000_000), 1..6),
        ) {
            let prices: Vec<CurrencyTotal> = totals
                .iter()
                .map(|(currency, cents)| {
                    CurrencyTotal::new(Uuid::from_u128(*currency), Decimal::new(*cents, 2))
                })
                .collect();

            let status = compute_payment_status(&prices, &prices, Decimal::ZERO);
            prop_assert_eq!(status, OrderPaymentStatus::Paid);
        }
    }
}
