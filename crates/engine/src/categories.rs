//! Category sets per transaction type.
//!
//! The sets are a form rule: the store accepts any non-empty category, the
//! HTTP boundary rejects categories outside the set for the chosen type.

use crate::TransactionType;

pub const INCOME_CATEGORIES: &[&str] = &["Setoran", "Jasa", "Lain-lain"];

pub const EXPENSE_CATEGORIES: &[&str] = &["Operasional", "Gaji", "Perlengkapan", "Sewa", "Lain-lain"];

impl TransactionType {
    /// Categories a transaction of this type may use.
    #[must_use]
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            Self::Debit => INCOME_CATEGORIES,
            Self::Credit => EXPENSE_CATEGORIES,
        }
    }

    #[must_use]
    pub fn allows_category(self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}
