//! Property tests for totals computation

use core_kernel::{ActorId, Money, TenantId};
use domain_invoicing::{DocumentType, Invoice, InvoiceItem};
use proptest::prelude::*;
use test_utils::lines_strategy;

proptest! {
    #[test]
    fn total_equals_sum_of_truncated_line_totals(lines in lines_strategy()) {
        let mut invoice = Invoice::new(
            TenantId::new_v7(),
            "2026-000001",
            DocumentType::Invoice,
            ActorId::new_v7(),
        );

        let mut expected = Money::zero();
        for (quantity, unit_price) in &lines {
            expected = expected + unit_price.times(*quantity).unwrap();
            let item = InvoiceItem::free_text("line", *quantity, *unit_price).unwrap();
            invoice.add_item(item).unwrap();
        }

        prop_assert_eq!(invoice.subtotal(), expected);
        prop_assert_eq!(invoice.total(), expected);
    }

    #[test]
    fn recalculation_is_stable(lines in lines_strategy()) {
        let mut invoice = Invoice::new(
            TenantId::new_v7(),
            "2026-000002",
            DocumentType::Invoice,
            ActorId::new_v7(),
        );
        for (quantity, unit_price) in &lines {
            let item = InvoiceItem::free_text("line", *quantity, *unit_price).unwrap();
            invoice.add_item(item).unwrap();
        }

        let before = invoice.total();
        invoice.recalculate_totals().unwrap();
        invoice.recalculate_totals().unwrap();
        prop_assert_eq!(invoice.total(), before);
    }
}
