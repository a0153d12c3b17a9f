//! Orders, purchases and downloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cart::ItemType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Balance,
    Paypal,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Balance => "balance",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balance" => Ok(PaymentMethod::Balance),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Order header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
    pub paid_at: Option<i64>,
}

/// Ordered track or album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: i64,
    pub item_type: ItemType,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// A downloadable file of purchased content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Download {
    pub name: String,
    pub blob_url: String,
}

/// Whether the caller owns an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    pub purchased: bool,
}

/// Result of paying a cart with the account balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceCheckout {
    pub order_id: i64,
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// PayPal order waiting for the buyer's approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaypalCheckout {
    pub order_id: String,
    pub approval_url: String,
}

/// Balance top-up request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUp {
    pub amount: Decimal,
}
