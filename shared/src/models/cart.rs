//! Shopping cart models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money;

/// Kind of paid item a cart or order line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Track,
    Album,
}

impl ItemType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemType::Track => "track",
            ItemType::Album => "album",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(ItemType::Track),
            "album" => Ok(ItemType::Album),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

/// One line of the cart, with the price captured when it was added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: i64,
    pub item_type: ItemType,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl CartLine {
    pub fn total(&self) -> Decimal {
        money::line_total(self.price, self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CartView {
    pub fn new(items: Vec<CartLine>) -> Self {
        let total = cart_total(&items);
        Self { items, total }
    }
}

/// Cart total price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartPrice {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Add to cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCart {
    pub item_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Sum of price × quantity over all lines
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::total).sum()
}

/// Collapse lines that point at the same item, summing quantities.
///
/// The first line's price wins. Output is ordered by (type, id).
pub fn merge_lines(lines: &[CartLine]) -> Vec<CartLine> {
    let mut merged: std::collections::BTreeMap<(ItemType, i64), CartLine> =
        std::collections::BTreeMap::new();
    for line in lines {
        merged
            .entry((line.item_type, line.item_id))
            .and_modify(|existing| existing.quantity += line.quantity)
            .or_insert_with(|| line.clone());
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(item_type: ItemType, item_id: i64, quantity: i32, price: &str) -> CartLine {
        CartLine {
            item_id,
            item_type,
            name: format!("{item_type}-{item_id}"),
            quantity,
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn test_cart_total_is_sum_of_price_times_quantity() {
        let lines = vec![
            line(ItemType::Track, 1, 2, "4.99"),
            line(ItemType::Album, 7, 1, "29.90"),
            line(ItemType::Track, 3, 3, "0.10"),
        ];
        assert_eq!(cart_total(&lines), Decimal::from_str("40.18").unwrap());
        assert_eq!(CartView::new(lines).total, Decimal::from_str("40.18").unwrap());
    }

    #[test]
    fn test_cart_total_empty() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_merge_lines_sums_duplicates() {
        let lines = vec![
            line(ItemType::Track, 1, 2, "4.99"),
            line(ItemType::Album, 1, 1, "20.00"),
            line(ItemType::Track, 1, 3, "5.99"),
        ];
        let merged = merge_lines(&lines);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].item_type, ItemType::Track);
        assert_eq!(merged[0].quantity, 5);
        assert_eq!(merged[0].price, Decimal::from_str("4.99").unwrap());
        assert_eq!(merged[1].item_type, ItemType::Album);
    }

    #[test]
    fn test_item_type_text() {
        assert_eq!(ItemType::from_str("album"), Ok(ItemType::Album));
        assert!(ItemType::from_str("Album").is_err());
        assert_eq!(serde_json::to_string(&ItemType::Track).unwrap(), "\"track\"");
    }

    #[test]
    fn test_add_to_cart_defaults_quantity() {
        let add: AddToCart = serde_json::from_str(r#"{"item_id": 5}"#).unwrap();
        assert_eq!(add.quantity, 1);
    }

    #[test]
    fn test_cart_line_price_serializes_as_number() {
        let json = serde_json::to_value(line(ItemType::Track, 1, 1, "4.99")).unwrap();
        assert_eq!(json["price"], serde_json::json!(4.99));
    }
}
