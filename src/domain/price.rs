use std::fmt;

/// A strictly positive amount held in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a finite number")]
    NotFinite,
    #[error("price must be positive, got {0}")]
    NotPositive(String),
}

impl Price {
    /// For compile-time catalog entries only; callers guarantee `cents > 0`.
    pub(crate) const fn catalog(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents <= 0 {
            return Err(PriceError::NotPositive(cents.to_string()));
        }
        Ok(Self(cents))
    }

    /// Rounds to the nearest cent, half away from zero.
    pub fn from_amount(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        let cents = (amount * 100.0).round();
        if cents <= 0.0 {
            return Err(PriceError::NotPositive(amount.to_string()));
        }
        Ok(Self(cents as i64))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
