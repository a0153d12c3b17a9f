//! Money helpers using rust_decimal
//!
//! Prices, balances and totals are `Decimal` end to end (NUMERIC(12,2) in
//! PostgreSQL), rounded to 2 decimal places, half away from zero.

use rust_decimal::prelude::*;

use crate::error::{AppError, ErrorCode};

/// Monetary precision (cents)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum price of a single paid track or album
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Maximum amount of a single balance top-up
pub const MAX_TOP_UP: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Maximum quantity of one cart line
pub const MAX_QUANTITY: i32 = 99;

/// Balance granted to every new account
pub const STARTING_BALANCE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Round to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Price × quantity, rounded
pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    round_money(price * Decimal::from(quantity))
}

/// Render an amount the way payment providers expect it: `"12.50"`
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Validate and normalize the price of a paid item
pub fn validate_price(price: Decimal) -> Result<Decimal, AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price must be positive, got {price}"),
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            format!("price exceeds maximum allowed ({MAX_PRICE}), got {price}"),
        ));
    }
    Ok(round_money(price))
}

/// Validate and normalize a balance top-up amount
pub fn validate_top_up(amount: Decimal) -> Result<Decimal, AppError> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO || amount > MAX_TOP_UP {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("amount must be between 0.01 and {MAX_TOP_UP}, got {amount}"),
        ));
    }
    Ok(amount)
}

/// Validate the quantity of a cart line
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("1.005")), dec("1.01"));
        assert_eq!(round_money(dec("1.004")), dec("1.00"));
        assert_eq!(round_money(dec("2.675")), dec("2.68"));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("19.99"), 3), dec("59.97"));
        assert_eq!(line_total(dec("0.10"), 3), dec("0.30"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("12.5")), "12.50");
        assert_eq!(format_amount(dec("0")), "0.00");
        assert_eq!(format_amount(dec("1000")), "1000.00");
        assert_eq!(format_amount(dec("3.333")), "3.33");
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price(dec("9.999")).unwrap(), dec("10.00"));
        assert_eq!(
            validate_price(Decimal::ZERO).unwrap_err().code,
            ErrorCode::InvalidPrice
        );
        assert!(validate_price(dec("-1")).is_err());
        assert!(validate_price(dec("100000.01")).is_err());
        assert!(validate_price(MAX_PRICE).is_ok());
    }

    #[test]
    fn test_validate_top_up() {
        assert_eq!(validate_top_up(dec("50")).unwrap(), dec("50.00"));
        assert_eq!(
            validate_top_up(dec("0.001")).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
        assert!(validate_top_up(dec("10000.01")).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(0).unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_starting_balance() {
        assert_eq!(format_amount(STARTING_BALANCE), "1000.00");
    }
}
