//! `custom_id` carried by every PayPal order we create
//!
//! Format: `<Purpose>:<amount>:<user_id>`. The user id is the last field and
//! may itself contain `:`.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use shared::money::format_amount;

const CART_PAYMENT: &str = "CartPayment";
const ADD_BALANCE: &str = "AddBalance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomId {
    /// Payment for the user's cart; the order row already exists
    CartPayment { amount: Decimal, user_id: String },
    /// Balance top-up
    AddBalance { amount: Decimal, user_id: String },
}

impl CustomId {
    pub fn amount(&self) -> Decimal {
        match self {
            CustomId::CartPayment { amount, .. } | CustomId::AddBalance { amount, .. } => *amount,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            CustomId::CartPayment { user_id, .. } | CustomId::AddBalance { user_id, .. } => user_id,
        }
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            CustomId::CartPayment { .. } => CART_PAYMENT,
            CustomId::AddBalance { .. } => ADD_BALANCE,
        };
        write!(f, "{kind}:{}:{}", format_amount(self.amount()), self.user_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomIdError {
    #[error("custom_id has too few fields")]
    MissingField,
    #[error("unknown custom_id purpose: {0}")]
    UnknownPurpose(String),
    #[error("invalid custom_id amount: {0}")]
    InvalidAmount(String),
}

impl FromStr for CustomId {
    type Err = CustomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let kind = parts.next().unwrap_or_default();
        let amount = parts.next().ok_or(CustomIdError::MissingField)?;
        let user_id = parts
            .next()
            .filter(|u| !u.is_empty())
            .ok_or(CustomIdError::MissingField)?
            .to_string();

        let amount = Decimal::from_str(amount)
            .ok()
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| CustomIdError::InvalidAmount(amount.to_string()))?;

        match kind {
            CART_PAYMENT => Ok(CustomId::CartPayment { amount, user_id }),
            ADD_BALANCE => Ok(CustomId::AddBalance { amount, user_id }),
            other => Err(CustomIdError::UnknownPurpose(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_cart_payment() {
        let id = CustomId::CartPayment {
            amount: dec("59.9"),
            user_id: "0b8f7f3e-1c2d-4a5b-9c8d-7e6f5a4b3c2d".into(),
        };
        assert_eq!(
            id.to_string(),
            "CartPayment:59.90:0b8f7f3e-1c2d-4a5b-9c8d-7e6f5a4b3c2d"
        );
    }

    #[test]
    fn test_parse_add_balance() {
        let id: CustomId = "AddBalance:100.00:user-1".parse().unwrap();
        assert_eq!(
            id,
            CustomId::AddBalance {
                amount: dec("100.00"),
                user_id: "user-1".into()
            }
        );
        assert_eq!(id.amount(), dec("100"));
        assert_eq!(id.user_id(), "user-1");
    }

    #[test]
    fn test_user_id_may_contain_colons() {
        let id = CustomId::CartPayment {
            amount: dec("12.50"),
            user_id: "legacy:account:42".into(),
        };
        let parsed: CustomId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "CartPayment:12.00".parse::<CustomId>(),
            Err(CustomIdError::MissingField)
        );
        assert_eq!(
            "CartPayment:12.00:".parse::<CustomId>(),
            Err(CustomIdError::MissingField)
        );
        assert_eq!(
            "Refund:12.00:u1".parse::<CustomId>(),
            Err(CustomIdError::UnknownPurpose("Refund".into()))
        );
        assert_eq!(
            "AddBalance:abc:u1".parse::<CustomId>(),
            Err(CustomIdError::InvalidAmount("abc".into()))
        );
        assert_eq!(
            "AddBalance:-5:u1".parse::<CustomId>(),
            Err(CustomIdError::InvalidAmount("-5".into()))
        );
        assert!("".parse::<CustomId>().is_err());
    }
}
