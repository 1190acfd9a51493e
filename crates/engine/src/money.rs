use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::format::format_idr;

/// Signed money amount represented as **whole rupiah**.
///
/// Use this type for all monetary values in the engine (amounts, balances,
/// monthly sums). Rupiah are displayed without decimals, so the engine keeps
/// integers end to end.
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// Stored transaction amounts are always non-negative; the sign is carried by
/// the transaction type and only shows up in running balances.
///
/// # Examples
///
/// ```rust
/// use engine::Rupiah;
///
/// let balance = Rupiah::new(100_000) - Rupiah::new(40_000);
/// assert_eq!(balance.value(), 60_000);
/// assert_eq!(balance.to_string(), "Rp\u{a0}60.000");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Rupiah(i64);

impl Rupiah {
    pub const ZERO: Rupiah = Rupiah(0);
    pub const MAX: Rupiah = Rupiah(i64::MAX);
    pub const MIN: Rupiah = Rupiah(i64::MIN);

    /// Creates a new amount from whole rupiah.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value in rupiah.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Rupiah) -> Option<Rupiah> {
        self.0.checked_add(rhs.0).map(Rupiah)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Rupiah) -> Option<Rupiah> {
        self.0.checked_sub(rhs.0).map(Rupiah)
    }

    /// Checked negation (returns `None` for [`Rupiah::MIN`]).
    #[must_use]
    pub fn checked_neg(self) -> Option<Rupiah> {
        self.0.checked_neg().map(Rupiah)
    }

    /// Addition clamped to [`Rupiah::MIN`]..=[`Rupiah::MAX`].
    #[must_use]
    pub fn saturating_add(self, rhs: Rupiah) -> Rupiah {
        Rupiah(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_idr(*self))
    }
}

impl From<i64> for Rupiah {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Rupiah> for i64 {
    fn from(value: Rupiah) -> Self {
        value.0
    }
}

impl Add for Rupiah {
    type Output = Rupiah;

    fn add(self, rhs: Rupiah) -> Self::Output {
        Rupiah(self.0 + rhs.0)
    }
}

impl AddAssign for Rupiah {
    fn add_assign(&mut self, rhs: Rupiah) {
        self.0 += rhs.0;
    }
}

impl Sub for Rupiah {
    type Output = Rupiah;

    fn sub(self, rhs: Rupiah) -> Self::Output {
        Rupiah(self.0 - rhs.0)
    }
}

impl SubAssign for Rupiah {
    fn sub_assign(&mut self, rhs: Rupiah) {
        self.0 -= rhs.0;
    }
}

impl Neg for Rupiah {
    type Output = Rupiah;

    fn neg(self) -> Self::Output {
        Rupiah(-self.0)
    }
}

impl Sum for Rupiah {
    fn sum<I: Iterator<Item = Rupiah>>(iter: I) -> Self {
        iter.fold(Rupiah::ZERO, Rupiah::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_keeps_sign() {
        let mut balance = Rupiah::ZERO;
        balance += Rupiah::new(100_000);
        balance -= Rupiah::new(140_000);
        assert_eq!(balance, Rupiah::new(-40_000));
        assert!(balance.is_negative());
        assert_eq!(-balance, Rupiah::new(40_000));
    }

    #[test]
    fn checked_ops_report_overflow() {
        let big = Rupiah::new(5_000_000_000_000_000_000);
        assert_eq!(big.checked_add(big), None);
        assert_eq!(Rupiah::MIN.checked_sub(Rupiah::new(1)), None);
        assert_eq!(Rupiah::MIN.checked_neg(), None);
        assert_eq!(
            Rupiah::new(7).checked_sub(Rupiah::new(10)),
            Some(Rupiah::new(-3))
        );
        assert_eq!(big.saturating_add(big), Rupiah::MAX);
    }

    #[test]
    fn sum_saturates() {
        let total: Rupiah = [Rupiah::MAX, Rupiah::new(1)].into_iter().sum();
        assert_eq!(total, Rupiah::MAX);
    }

    #[test]
    fn sum_of_empty_is_zero() {
        let total: Rupiah = Vec::<Rupiah>::new().into_iter().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Rupiah::new(2_500)).unwrap();
        assert_eq!(json, "2500");
        let back: Rupiah = serde_json::from_str("2500").unwrap();
        assert_eq!(back, Rupiah::new(2_500));
    }
}
