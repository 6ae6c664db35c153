use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The catalog item types the protocol distinguishes.
///
/// Only [`ItemType::Service`] can be *created* through the gateway; the rest
/// exist so a draft can reference already-provisioned items of any type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Service,
    Inventory,
    NonInventory,
    OtherCharge,
    Group,
    FixedAsset,
    Discount,
    Payment,
    SalesTax,
    SalesTaxGroup,
    Subtotal,
}

/// One line on an invoice draft.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    /// Full catalog name of the referenced item.
    pub full_name: String,
    pub description: String,
    pub rate: Decimal,
    pub quantity: Decimal,
    pub item_type: Option<ItemType>,
    /// Posting account for auto-created items.
    pub account: Option<String>,
}

impl LineItem {
    #[must_use]
    pub fn new(
        quantity: Decimal,
        full_name: impl Into<String>,
        description: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            description: description.into(),
            rate,
            quantity,
            item_type: None,
            account: None,
        }
    }

    /// Declare the catalog type and posting account. Both are required on
    /// every line of an invoice that auto-creates missing items.
    #[must_use]
    pub fn with_item(mut self, item_type: ItemType, account: impl Into<String>) -> Self {
        self.item_type = Some(item_type);
        self.account = Some(account.into());
        self
    }
}

/// Quantity wire form: a bare integer when the value has no fractional part,
/// two-decimal fixed otherwise.
pub(crate) fn wire_quantity(quantity: Decimal) -> String {
    if quantity.fract() == Decimal::ZERO {
        quantity.trunc().normalize().to_string()
    } else {
        format!("{quantity:.2}")
    }
}

/// Amount wire form: always two-decimal fixed.
pub(crate) fn wire_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn integral_quantities_serialize_bare() {
        assert_eq!(wire_quantity(dec!(3)), "3");
        assert_eq!(wire_quantity(dec!(3.0)), "3");
        assert_eq!(wire_quantity(dec!(0)), "0");
        assert_eq!(wire_quantity(dec!(12.00)), "12");
    }

    #[test]
    fn fractional_quantities_serialize_two_decimal() {
        assert_eq!(wire_quantity(dec!(3.25)), "3.25");
        assert_eq!(wire_quantity(dec!(0.1)), "0.10");
        assert_eq!(wire_quantity(dec!(2.5)), "2.50");
    }

    #[test]
    fn amounts_always_serialize_two_decimal() {
        assert_eq!(wire_amount(dec!(800)), "800.00");
        assert_eq!(wire_amount(dec!(150.5)), "150.50");
        assert_eq!(wire_amount(dec!(0.1)), "0.10");
    }
}
