//! Caller-side currency exclusion rules.

use std::collections::BTreeSet;

use ratekeeper_common::{ValidationError, ValidationResult};

/// Rejects conversions that involve an excluded currency.
#[derive(Debug, Clone, Default)]
pub struct CurrencyGuard {
    excluded: BTreeSet<String>,
}

impl CurrencyGuard {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn is_excluded(&self, code: &str) -> bool {
        self.excluded.contains(&code.trim().to_ascii_uppercase())
    }

    /// Check both sides of a conversion.
    pub fn check_pair(&self, from: &str, to: &str) -> ValidationResult<()> {
        for code in [from, to] {
            if self.is_excluded(code) {
                return Err(ValidationError::ExcludedCurrency(
                    code.trim().to_ascii_uppercase(),
                ));
            }
        }
        Ok(())
    }
}
