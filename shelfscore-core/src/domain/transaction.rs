// shelfscore-core/src/domain/transaction.rs
//
// The canonical, normalized point-of-sale schema every scorer consumes.
// Producing it (column aliasing, coercion) lives in infrastructure::loader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical input columns, in schema order. All of them are required at
/// entry; a header that cannot be resolved to each of these is a hard
/// schema failure.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "store_name",
    "date_of_sale",
    "item_code",
    "item_barcode",
    "description",
    "category",
    "department",
    "sub_department",
    "section",
    "quantity",
    "total_sales",
    "rrp",
    "supplier",
];

/// One row per sale line. Every field is nullable: malformed source cells
/// coerce to `None` at ingestion and propagate as nulls through the
/// scorers, never as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub store_name: Option<String>,
    pub date_of_sale: Option<NaiveDate>,
    pub item_code: Option<String>,
    pub item_barcode: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub sub_department: Option<String>,
    pub section: Option<String>,
    pub quantity: Option<f64>,
    pub total_sales: Option<f64>,
    pub rrp: Option<f64>,
    pub supplier: Option<String>,
    /// Derived: `total_sales / quantity` when `quantity > 0`, else null.
    pub realised_unit_price: Option<f64>,
}

impl Transaction {
    /// Recomputes the derived unit price from the raw fields.
    pub fn derive_unit_price(&mut self) {
        self.realised_unit_price = match (self.total_sales, self.quantity) {
            (Some(sales), Some(qty)) if qty > 0.0 => Some(sales / qty),
            _ => None,
        };
    }

    /// True when any field of the row (including the derived price) is null.
    pub fn has_missing(&self) -> bool {
        self.store_name.is_none()
            || self.date_of_sale.is_none()
            || self.item_code.is_none()
            || self.item_barcode.is_none()
            || self.description.is_none()
            || self.category.is_none()
            || self.department.is_none()
            || self.sub_department.is_none()
            || self.section.is_none()
            || self.quantity.is_none()
            || self.total_sales.is_none()
            || self.rrp.is_none()
            || self.supplier.is_none()
            || self.realised_unit_price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> Transaction {
        let mut t = Transaction {
            store_name: Some("Store A".into()),
            date_of_sale: NaiveDate::from_ymd_opt(2024, 3, 1),
            item_code: Some("SKU1".into()),
            item_barcode: Some("111".into()),
            description: Some("Flour 1kg".into()),
            category: Some("Food".into()),
            department: Some("Dry Goods".into()),
            sub_department: Some("Baking".into()),
            section: Some("Flour".into()),
            quantity: Some(4.0),
            total_sales: Some(10.0),
            rrp: Some(3.0),
            supplier: Some("Bidco".into()),
            realised_unit_price: None,
        };
        t.derive_unit_price();
        t
    }

    #[test]
    fn test_unit_price_derivation() {
        let t = full_row();
        assert_eq!(t.realised_unit_price, Some(2.5));
    }

    #[test]
    fn test_unit_price_null_on_zero_or_negative_quantity() {
        let mut t = full_row();
        t.quantity = Some(0.0);
        t.derive_unit_price();
        assert_eq!(t.realised_unit_price, None);

        t.quantity = Some(-2.0);
        t.derive_unit_price();
        assert_eq!(t.realised_unit_price, None);
    }

    #[test]
    fn test_has_missing_tracks_derived_price() {
        let mut t = full_row();
        assert!(!t.has_missing());

        // Null quantity nulls the derived price too
        t.quantity = None;
        t.derive_unit_price();
        assert!(t.has_missing());
    }
}
