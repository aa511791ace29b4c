//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation. Storefront prices arrive as
//! decimal strings and are parsed digit by digit, never through `f64`.
//! Amounts that do not parse are kept verbatim as a [`Price::Raw`].

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies, by ISO 4217 code.
///
/// Codes without a dedicated entry are carried as [`Currency::Other`] so a
/// store priced in any currency still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    CNY,
    INR,
    MXN,
    /// Any other code, upper-cased.
    Other(String),
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::MXN => "MXN",
            Currency::Other(code) => code,
        }
    }

    /// Get the currency symbol (e.g., "$"), if it has one.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::CNY => "\u{00a5}",
            Currency::INR => "\u{20b9}",
            Currency::MXN => "MX$",
            Currency::Other(_) => return None,
        };
        Some(symbol)
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code with a dedicated entry.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            "CNY" => Some(Currency::CNY),
            "INR" => Some(Currency::INR),
            "MXN" => Some(Currency::MXN),
            _ => None,
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Currency::from_code(&code).unwrap_or_else(|| Currency::Other(code.trim().to_uppercase()))
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Currency::from(code.to_string())
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Parse a storefront decimal amount such as `"29.99"` or `"30.0"`.
    ///
    /// Extra fractional digits are accepted only when they are zeros, so
    /// `"30.000"` parses but `"30.005"` does not.
    ///
    /// ```
    /// use upsell_commerce::money::{Money, Currency};
    /// let price = Money::parse_decimal("49.9", Currency::USD).unwrap();
    /// assert_eq!(price.amount_cents, 4990);
    /// ```
    pub fn parse_decimal(amount: &str, currency: Currency) -> Result<Self, CommerceError> {
        let invalid = || CommerceError::InvalidAmount(amount.to_string());
        let trimmed = amount.trim();

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let places = currency.decimal_places() as usize;
        let (kept, dropped) = fraction.split_at(fraction.len().min(places));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let mut minor: i64 = if kept.is_empty() {
            0
        } else {
            kept.parse().map_err(|_| invalid())?
        };
        for _ in kept.len()..places {
            minor *= 10;
        }

        let amount_cents = whole
            .checked_mul(10_i64.pow(places as u32))
            .and_then(|w| w.checked_add(minor))
            .ok_or(CommerceError::Overflow)?;

        Ok(Self::new(amount_cents, currency))
    }

    /// Format as a display string (e.g., "$49.99", or "129.00 SEK" for
    /// currencies without a symbol).
    pub fn display(&self) -> String {
        match self.currency.symbol() {
            Some(symbol) => format!("{}{}", symbol, self.display_amount()),
            None => format!("{} {}", self.display_amount(), self.currency.code()),
        }
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let minor = self.amount_cents.unsigned_abs();
        if places == 0 {
            return format!("{}{}", sign, minor);
        }

        let divisor = 10_u64.pow(places);
        format!(
            "{}{}.{:0width$}",
            sign,
            minor / divisor,
            minor % divisor,
            width = places as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A variant price as the storefront reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// Parsed into minor units.
    Money(Money),
    /// The amount string did not parse and is shown as sent.
    Raw { amount: String, currency: Currency },
}

impl Price {
    /// Build a price from a storefront amount string. Never fails: an amount
    /// that does not parse is kept verbatim.
    pub fn from_storefront(amount: &str, currency: Currency) -> Self {
        match Money::parse_decimal(amount, currency.clone()) {
            Ok(money) => Price::Money(money),
            Err(_) => Price::Raw {
                amount: amount.trim().to_string(),
                currency,
            },
        }
    }

    /// The parsed value, if the amount parsed.
    pub fn as_money(&self) -> Option<&Money> {
        match self {
            Price::Money(money) => Some(money),
            Price::Raw { .. } => None,
        }
    }

    pub fn currency(&self) -> &Currency {
        match self {
            Price::Money(money) => &money.currency,
            Price::Raw { currency, .. } => currency,
        }
    }

    /// Format for display. Raw amounts print as `"<amount> <code>"`.
    pub fn display(&self) -> String {
        match self {
            Price::Money(money) => money.display(),
            Price::Raw { amount, currency } => format!("{} {}", amount, currency.code()),
        }
    }
}

impl From<Money> for Price {
    fn from(money: Money) -> Self {
        Price::Money(money)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
