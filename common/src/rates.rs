//! Rate snapshots, conversion results and historical pages.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::monetary::{convert_amount, CurrencyCode};

/// Currency code to rate, ordered by code.
pub type RateTable = BTreeMap<String, Decimal>;

/// Latest rates for one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    pub base_currency: CurrencyCode,
    /// Exactly the codes the upstream returned; the base is never added.
    pub rates: RateTable,
    pub as_of: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    pub fn new(base_currency: CurrencyCode, rates: RateTable, as_of: DateTime<Utc>) -> Self {
        Self {
            base_currency,
            rates,
            as_of,
        }
    }

    /// Look up the rate for one target currency.
    pub fn rate(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(target.code()).copied()
    }
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: Decimal,
    pub converted_amount: Decimal,
    pub rate: Decimal,
    pub as_of: DateTime<Utc>,
}

impl ConversionResult {
    /// Build a result; `converted_amount` is always derived from `amount` and `rate`.
    pub fn new(
        from: CurrencyCode,
        to: CurrencyCode,
        amount: Decimal,
        rate: Decimal,
        as_of: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        Ok(Self {
            from,
            to,
            amount,
            converted_amount: convert_amount(amount, rate)?,
            rate,
            as_of,
        })
    }
}

/// Rates for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRates {
    pub date: NaiveDate,
    pub rates: RateTable,
}

/// One page of historical rates, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRatesPage {
    pub base_currency: CurrencyCode,
    pub page: u32,
    pub page_size: u32,
    pub entries: Vec<DailyRates>,
}

impl HistoricalRatesPage {
    /// A page past the end of the data.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// One-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn new(page: u32, page_size: u32) -> ValidationResult<Self> {
        if page < 1 || page_size < 1 {
            return Err(ValidationError::InvalidPagination { page, page_size });
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first entry on this page, `None` if it overflows.
    pub fn offset(&self) -> Option<usize> {
        let page_index = usize::try_from(self.page - 1).ok()?;
        page_index.checked_mul(self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}
