//! Line-item arithmetic shared by quotations and orders.
//!
//! `line_total = unit_price * quantity * (1 - discount / 100)`; a document total is the sum of
//! its line totals. No rounding is applied here; presentation rounds to two places.

use rust_decimal::Decimal;

/// The priced part of a quotation or order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Percentage in `0..=100`
    pub discount: Decimal,
}

impl LineItem {
    pub fn new(quantity: Decimal, unit_price: Decimal, discount: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
            discount,
        }
    }
}

pub fn line_total(item: &LineItem) -> Decimal {
    let factor = Decimal::ONE - item.discount / Decimal::ONE_HUNDRED;
    item.unit_price * item.quantity * factor
}

pub fn calculate_total(items: &[LineItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

impl From<&crate::entities::quotation_item::Model> for LineItem {
    fn from(item: &crate::entities::quotation_item::Model) -> Self {
        LineItem::new(item.quantity, item.unit_price, item.discount)
    }
}

impl From<&crate::entities::order_item::Model> for LineItem {
    fn from(item: &crate::entities::order_item::Model) -> Self {
        LineItem::new(item.quantity, item.unit_price, item.discount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn discounted_lines_sum_to_fixture_total() {
        let items = [
            LineItem::new(dec!(2), dec!(100), dec!(10)),
            LineItem::new(dec!(1), dec!(50), dec!(0)),
        ];
        assert_eq!(line_total(&items[0]), dec!(180));
        assert_eq!(calculate_total(&items), dec!(230));
    }

    #[test]
    fn empty_document_totals_zero() {
        assert_eq!(calculate_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn full_discount_zeroes_the_line() {
        let item = LineItem::new(dec!(3), dec!(19.99), dec!(100));
        assert_eq!(line_total(&item), Decimal::ZERO);
    }

    #[test]
    fn fractional_values_keep_full_precision() {
        let item = LineItem::new(dec!(1.5), dec!(9.99), dec!(12.5));
        // 9.99 * 1.5 * 0.875
        assert_eq!(line_total(&item), dec!(13.111875));
    }
}
