//! Unified error codes for the Groove marketplace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Cart / order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Studio / artist errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that clients can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Too many requests from this client
    TooManyRequests = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Only the studio owner may do this
    NotStudioOwner = 2004,
    /// Only the studio owner or a studio admin may do this
    NotStudioManager = 2005,
    /// Caller does not own the item
    NotItemOwner = 2006,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Email already registered
    EmailAlreadyExists = 3002,
    /// Password too short
    PasswordTooShort = 3003,
    /// Password must contain a digit
    PasswordMissingDigit = 3004,
    /// Password confirmation does not match
    PasswordMismatch = 3005,
    /// Invalid email address
    InvalidEmail = 3006,
    /// User information not filled in yet
    UserInformationNotFound = 3007,

    // ==================== 4xxx: Cart / Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has not been paid yet
    OrderNotPaid = 4003,
    /// Cart is empty
    CartEmpty = 4004,
    /// Cart line not found
    CartItemNotFound = 4005,
    /// Quantity out of range
    InvalidQuantity = 4006,
    /// Item has not been purchased
    NotPurchased = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Balance does not cover the cart total
    InsufficientBalance = 5002,
    /// Invalid payment amount
    InvalidAmount = 5003,
    /// Payment provider returned an error
    PaymentProviderError = 5004,
    /// Webhook signature verification failed
    WebhookVerificationFailed = 5005,
    /// Paid amount does not match the order total
    PaymentAmountMismatch = 5006,

    // ==================== 6xxx: Catalog ====================
    /// Track not found
    TrackNotFound = 6001,
    /// Album not found
    AlbumNotFound = 6002,
    /// Paid track not found
    PaidTrackNotFound = 6003,
    /// Paid album not found
    PaidAlbumNotFound = 6004,
    /// Artist not found
    ArtistNotFound = 6005,
    /// Item already liked
    AlreadyLiked = 6101,
    /// Item not liked
    NotLiked = 6102,
    /// Invalid price
    InvalidPrice = 6201,

    // ==================== 7xxx: Studio / Artist ====================
    /// Studio not found
    StudioNotFound = 7001,
    /// User already owns or administers a studio
    StudioAlreadyExists = 7002,
    /// User already has an artist profile
    ArtistAlreadyExists = 7003,
    /// Artist already belongs to a studio
    ArtistAlreadyInStudio = 7004,
    /// Artist does not belong to this studio
    ArtistNotInStudio = 7005,
    /// Artist already applied to this studio
    RequestAlreadyExists = 7006,
    /// Artist request not found
    RequestNotFound = 7007,
    /// User is already a studio admin
    StudioAdminExists = 7008,
    /// Studio admin not found
    StudioAdminNotFound = 7009,
    /// Caller has no artist profile
    NotAnArtist = 7010,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Required role is missing",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::NotStudioOwner => "Only the studio owner can do this",
            ErrorCode::NotStudioManager => "Only studio managers can do this",
            ErrorCode::NotItemOwner => "Item belongs to someone else",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyExists => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::PasswordMissingDigit => "Password must contain at least one digit",
            ErrorCode::PasswordMismatch => "Passwords do not match",
            ErrorCode::InvalidEmail => "Invalid email address",
            ErrorCode::UserInformationNotFound => "User information not found",

            // Cart / Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderNotPaid => "Order has not been paid",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartItemNotFound => "Item is not in the cart",
            ErrorCode::InvalidQuantity => "Quantity is out of range",
            ErrorCode::NotPurchased => "Item has not been purchased",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::InsufficientBalance => "Not enough credits",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::PaymentProviderError => "Payment provider error",
            ErrorCode::WebhookVerificationFailed => "Webhook verification failed",
            ErrorCode::PaymentAmountMismatch => "Paid amount does not match order total",

            // Catalog
            ErrorCode::TrackNotFound => "Track not found",
            ErrorCode::AlbumNotFound => "Album not found",
            ErrorCode::PaidTrackNotFound => "Paid track not found",
            ErrorCode::PaidAlbumNotFound => "Paid album not found",
            ErrorCode::ArtistNotFound => "Artist not found",
            ErrorCode::AlreadyLiked => "Already liked",
            ErrorCode::NotLiked => "Not liked",
            ErrorCode::InvalidPrice => "Invalid price",

            // Studio / Artist
            ErrorCode::StudioNotFound => "Studio not found",
            ErrorCode::StudioAlreadyExists => "Studio already exists",
            ErrorCode::ArtistAlreadyExists => "Artist profile already exists",
            ErrorCode::ArtistAlreadyInStudio => "Artist already belongs to a studio",
            ErrorCode::ArtistNotInStudio => "Artist does not belong to this studio",
            ErrorCode::RequestAlreadyExists => "Request already sent",
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::StudioAdminExists => "User is already a studio admin",
            ErrorCode::StudioAdminNotFound => "Studio admin not found",
            ErrorCode::NotAnArtist => "Artist profile required",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::TooManyRequests),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::NotStudioOwner),
            2005 => Ok(ErrorCode::NotStudioManager),
            2006 => Ok(ErrorCode::NotItemOwner),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::EmailAlreadyExists),
            3003 => Ok(ErrorCode::PasswordTooShort),
            3004 => Ok(ErrorCode::PasswordMissingDigit),
            3005 => Ok(ErrorCode::PasswordMismatch),
            3006 => Ok(ErrorCode::InvalidEmail),
            3007 => Ok(ErrorCode::UserInformationNotFound),

            // Cart / Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderNotPaid),
            4004 => Ok(ErrorCode::CartEmpty),
            4005 => Ok(ErrorCode::CartItemNotFound),
            4006 => Ok(ErrorCode::InvalidQuantity),
            4007 => Ok(ErrorCode::NotPurchased),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::InsufficientBalance),
            5003 => Ok(ErrorCode::InvalidAmount),
            5004 => Ok(ErrorCode::PaymentProviderError),
            5005 => Ok(ErrorCode::WebhookVerificationFailed),
            5006 => Ok(ErrorCode::PaymentAmountMismatch),

            // Catalog
            6001 => Ok(ErrorCode::TrackNotFound),
            6002 => Ok(ErrorCode::AlbumNotFound),
            6003 => Ok(ErrorCode::PaidTrackNotFound),
            6004 => Ok(ErrorCode::PaidAlbumNotFound),
            6005 => Ok(ErrorCode::ArtistNotFound),
            6101 => Ok(ErrorCode::AlreadyLiked),
            6102 => Ok(ErrorCode::NotLiked),
            6201 => Ok(ErrorCode::InvalidPrice),

            // Studio / Artist
            7001 => Ok(ErrorCode::StudioNotFound),
            7002 => Ok(ErrorCode::StudioAlreadyExists),
            7003 => Ok(ErrorCode::ArtistAlreadyExists),
            7004 => Ok(ErrorCode::ArtistAlreadyInStudio),
            7005 => Ok(ErrorCode::ArtistNotInStudio),
            7006 => Ok(ErrorCode::RequestAlreadyExists),
            7007 => Ok(ErrorCode::RequestNotFound),
            7008 => Ok(ErrorCode::StudioAdminExists),
            7009 => Ok(ErrorCode::StudioAdminNotFound),
            7010 => Ok(ErrorCode::NotAnArtist),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::TooManyRequests,
        ErrorCode::PermissionDenied,
        ErrorCode::RoleRequired,
        ErrorCode::AdminRequired,
        ErrorCode::NotStudioOwner,
        ErrorCode::NotStudioManager,
        ErrorCode::NotItemOwner,
        ErrorCode::UserNotFound,
        ErrorCode::EmailAlreadyExists,
        ErrorCode::PasswordTooShort,
        ErrorCode::PasswordMissingDigit,
        ErrorCode::PasswordMismatch,
        ErrorCode::InvalidEmail,
        ErrorCode::UserInformationNotFound,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::OrderNotPaid,
        ErrorCode::CartEmpty,
        ErrorCode::CartItemNotFound,
        ErrorCode::InvalidQuantity,
        ErrorCode::NotPurchased,
        ErrorCode::PaymentFailed,
        ErrorCode::InsufficientBalance,
        ErrorCode::InvalidAmount,
        ErrorCode::PaymentProviderError,
        ErrorCode::WebhookVerificationFailed,
        ErrorCode::PaymentAmountMismatch,
        ErrorCode::TrackNotFound,
        ErrorCode::AlbumNotFound,
        ErrorCode::PaidTrackNotFound,
        ErrorCode::PaidAlbumNotFound,
        ErrorCode::ArtistNotFound,
        ErrorCode::AlreadyLiked,
        ErrorCode::NotLiked,
        ErrorCode::InvalidPrice,
        ErrorCode::StudioNotFound,
        ErrorCode::StudioAlreadyExists,
        ErrorCode::ArtistAlreadyExists,
        ErrorCode::ArtistAlreadyInStudio,
        ErrorCode::ArtistNotInStudio,
        ErrorCode::RequestAlreadyExists,
        ErrorCode::RequestNotFound,
        ErrorCode::StudioAdminExists,
        ErrorCode::StudioAdminNotFound,
        ErrorCode::NotAnArtist,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::NetworkError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TooManyRequests.code(), 1005);
        assert_eq!(ErrorCode::NotStudioManager.code(), 2005);
        assert_eq!(ErrorCode::EmailAlreadyExists.code(), 3002);
        assert_eq!(ErrorCode::CartEmpty.code(), 4004);
        assert_eq!(ErrorCode::NotPurchased.code(), 4007);
        assert_eq!(ErrorCode::InsufficientBalance.code(), 5002);
        assert_eq!(ErrorCode::AlreadyLiked.code(), 6101);
        assert_eq!(ErrorCode::StudioAlreadyExists.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_every_code_converts_back() {
        for &code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code), "{code:?}");
        }
    }

    #[test]
    fn test_codes_are_unique() {
        use std::collections::HashSet;
        let values: HashSet<u16> = ALL.iter().map(|c| c.code()).collect();
        assert_eq!(values.len(), ALL.len());
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::CartEmpty.is_success());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(8001), Err(InvalidErrorCode(8001)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::InsufficientBalance).unwrap(),
            "5002"
        );
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4004").unwrap();
        assert_eq!(code, ErrorCode::CartEmpty);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::AlreadyLiked), "6101");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::InsufficientBalance.message(), "Not enough credits");
        assert_eq!(ErrorCode::StudioAlreadyExists.message(), "Studio already exists");
        for &code in ALL {
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_invalid_error_code_display() {
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
