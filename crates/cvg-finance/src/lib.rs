//! cvg-finance
//!
//! Money views over a reconciled period set:
//! - Aggregate totals split by payment method, insurer vs patient
//! - Per-period detailed summary with inclusive day counts
//! - Gap amount audit against the co-payment pricing rule
//!
//! Sums accumulate in i128 micros and clamp once at the end; nothing is
//! rounded before summation. Pure deterministic logic (no IO, no time).

mod aggregate;
mod gap_audit;
mod summary;

pub use aggregate::{aggregate, FinancialAggregate};
pub use gap_audit::{audit_gap_amounts, gap_daily_rate, GapAmountAudit, GapAmountCorrection, GapAuditPolicy};
pub use summary::{summarize, FinancialSummary, PeriodLine};

pub(crate) fn i128_to_micros_clamp(x: i128) -> cvg_schemas::Micros {
    if x > i64::MAX as i128 {
        cvg_schemas::Micros::MAX
    } else if x < i64::MIN as i128 {
        cvg_schemas::Micros::MIN
    } else {
        cvg_schemas::Micros::new(x as i64)
    }
}
