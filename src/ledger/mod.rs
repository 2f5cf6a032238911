// ledger/mod.rs - Monthly payment ledger arithmetic
//
// Pure functions only. The payment service feeds rows in and persists what comes out,
// so everything here is testable without a database.

pub mod period;

pub use period::Period;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Advance payment must cover at least one month")]
    NoMonths,

    #[error("Advance payment cannot cover more than {max} months, got {requested}")]
    TooManyMonths { requested: u32, max: u32 },

    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Amount must not exceed {max}")]
    AmountTooLarge { max: i64 },
}

/// Upper bound for a single advance payment
pub const MAX_ADVANCE_MONTHS: u32 = 24;

/// Largest amount (so'm) accepted for rent, expected or paid figures
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Reject amounts outside `0..=MAX_AMOUNT`
pub fn check_amount(amount: i64) -> Result<i64, LedgerError> {
    if amount < 0 {
        return Err(LedgerError::NegativeAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

/// Settlement state of one ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

/// The three amounts the ledger arithmetic works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub expected_amount: i64,
    pub paid_amount: i64,
    pub carry_over_debt: i64,
}

impl Entry {
    pub fn new(expected_amount: i64, paid_amount: i64, carry_over_debt: i64) -> Self {
        Self {
            expected_amount,
            paid_amount,
            carry_over_debt,
        }
    }

    /// This month's charge plus whatever was left over from the month before
    pub fn total_due(&self) -> i64 {
        self.expected_amount.saturating_add(self.carry_over_debt)
    }

    /// Negative when the tenant overpaid
    pub fn remaining(&self) -> i64 {
        self.total_due().saturating_sub(self.paid_amount)
    }

    pub fn status(&self) -> PaymentStatus {
        if self.paid_amount >= self.total_due() {
            PaymentStatus::Paid
        } else if self.paid_amount > 0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Shortfall that rolls forward into the next month
    pub fn shortfall(&self) -> i64 {
        self.remaining().max(0)
    }
}

/// Carry-over for a new row, derived from the previous month's row if there is one.
///
/// Captured once at creation time; later edits of the previous month do not flow forward.
pub fn carry_over_from(previous: Option<&Entry>) -> i64 {
    previous.map(Entry::shortfall).unwrap_or(0)
}

/// Split a lump sum over `months` consecutive months.
///
/// Every month gets `amount / months`; the last one also takes the remainder so the
/// shares always add up to exactly `amount`.
pub fn split_advance(amount: i64, months: u32) -> Result<Vec<i64>, LedgerError> {
    if months == 0 {
        return Err(LedgerError::NoMonths);
    }
    if months > MAX_ADVANCE_MONTHS {
        return Err(LedgerError::TooManyMonths {
            requested: months,
            max: MAX_ADVANCE_MONTHS,
        });
    }
    check_amount(amount)?;

    let n = i64::from(months);
    let share = amount / n;
    let remainder = amount - share * n;

    let mut shares = vec![share; months as usize];
    if let Some(last) = shares.last_mut() {
        *last += remainder;
    }
    Ok(shares)
}

/// Totals over a set of rows, as shown under the payments table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_due: i64,
    pub total_paid: i64,
    pub remaining: i64,
}

pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Summary {
    let mut summary = Summary::default();
    for entry in entries {
        summary.total_due = summary.total_due.saturating_add(entry.total_due());
        summary.total_paid = summary.total_paid.saturating_add(entry.paid_amount);
    }
    summary.remaining = summary.total_due.saturating_sub(summary.total_paid);
    summary
}
