//! Audit views over an already-chosen period list. Nothing here suggests or
//! inserts periods; callers decide what to do with the holes.

use chrono::NaiveDate;
use cvg_schemas::{Micros, PaymentPeriod, Severity};
use serde::Serialize;
use tracing::debug;

use crate::{Gap, GapKind};

/// Uncovered calendar days between adjacent periods, sorted by start date.
///
/// `duration_days` is `next.start - prev.end`, so two periods one day apart
/// (`prev.end + 1 == next.start`) are contiguous and produce nothing.
pub fn scan(periods: &[PaymentPeriod], daily_rate: Micros) -> Vec<Gap> {
    let mut sorted: Vec<&PaymentPeriod> = periods.iter().collect();
    sorted.sort_by_key(|p| p.start_date);

    let mut out = Vec::new();
    for pair in sorted.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let gap = (next.start_date - prev.end_date).num_days();
        if gap <= 1 {
            continue;
        }
        let (Some(start), Some(end)) = (prev.end_date.succ_opt(), next.start_date.pred_opt()) else {
            continue;
        };
        out.push(Gap {
            kind: GapKind::PaymentGap,
            title: "payment gap".to_string(),
            description: format!("{gap} days without a payment period between {start} and {end}"),
            start_date: Some(start),
            end_date: Some(end),
            date: None,
            duration_days: gap,
            amount: daily_rate.checked_mul_days(gap),
            severity: Severity::Medium,
            bond_ref: None,
        });
    }
    debug!(periods = periods.len(), gaps = out.len(), "timeline scan");
    out
}

// ---------------------------------------------------------------------------
// Boundary-aware detection
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapPosition {
    /// Between rental start and the first billing period.
    Start,
    Middle,
    /// Between the last billing period and rental end.
    End,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingGap {
    pub position: GapPosition,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    /// `None` when `daily_rate × days` overflows.
    pub estimated_amount: Option<Micros>,
}

impl BillingGap {
    fn new(position: GapPosition, start: NaiveDate, end: NaiveDate, days: i64, rate: Micros) -> Self {
        Self {
            position,
            start_date: start,
            end_date: end,
            days,
            estimated_amount: rate.checked_mul_days(days),
        }
    }
}

/// Rental days not billed by any non-gap period, including the stretches
/// before the first and after the last one.
///
/// Gap periods are ignored: a day billed to the patient as a coverage gap is
/// still a day without a regular billing period. With no `rental_end` the
/// trailing stretch is not reported.
pub fn detect_billing_gaps(
    periods: &[PaymentPeriod],
    rental_start: NaiveDate,
    rental_end: Option<NaiveDate>,
    daily_rate: Micros,
    today: NaiveDate,
) -> Vec<BillingGap> {
    let mut billing: Vec<&PaymentPeriod> = periods.iter().filter(|p| !p.is_gap_period).collect();
    billing.sort_by_key(|p| p.start_date);

    let mut out = Vec::new();
    let (Some(first), Some(last)) = (billing.first(), billing.last()) else {
        let end = rental_end.unwrap_or(today);
        let days = (end - rental_start).num_days() + 1;
        if days > 0 {
            out.push(BillingGap::new(GapPosition::Start, rental_start, end, days, daily_rate));
        }
        return out;
    };

    // Leading stretch; day count excludes the first billed day.
    let lead = (first.start_date - rental_start).num_days();
    if lead > 0 {
        if let Some(end) = first.start_date.pred_opt() {
            out.push(BillingGap::new(GapPosition::Start, rental_start, end, lead, daily_rate));
        }
    }

    for pair in billing.windows(2) {
        let (Some(start), Some(end)) = (pair[0].end_date.succ_opt(), pair[1].start_date.pred_opt()) else {
            continue;
        };
        let days = (end - start).num_days() + 1;
        if days > 0 {
            out.push(BillingGap::new(GapPosition::Middle, start, end, days, daily_rate));
        }
    }

    if let (Some(rental_end), Some(start)) = (rental_end, last.end_date.succ_opt()) {
        let days = (rental_end - start).num_days() + 1;
        if days > 0 {
            out.push(BillingGap::new(GapPosition::End, start, rental_end, days, daily_rate));
        }
    }
    out
}
