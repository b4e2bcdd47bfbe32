use chrono::NaiveDate;
use cvg_schemas::{Micros, PaymentMethod, PaymentPeriod};
use serde::Serialize;

use crate::i128_to_micros_clamp;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLine {
    pub period_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive: a period starting and ending the same day counts 1.
    pub days: i64,
    pub amount: Micros,
    pub payment_method: PaymentMethod,
    pub is_gap_period: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub lines: Vec<PeriodLine>,
    pub total_amount: Micros,
    pub coverage_amount: Micros,
    /// Non-gap periods paid by any method other than COVERAGE.
    pub patient_amount: Micros,
    pub gap_amount: Micros,
    pub total_days: i64,
    pub billable_days: i64,
    pub gap_days: i64,
    pub period_count: usize,
    pub coverage_period_count: usize,
    pub gap_period_count: usize,
}

/// Detailed breakdown in input order.
///
/// Every amount lands in exactly one of coverage, patient or gap, so
/// `coverage_amount + patient_amount + gap_amount == total_amount`.
pub fn summarize(periods: &[PaymentPeriod]) -> FinancialSummary {
    let mut total: i128 = 0;
    let mut coverage: i128 = 0;
    let mut patient: i128 = 0;
    let mut gap: i128 = 0;
    let mut s = FinancialSummary {
        period_count: periods.len(),
        ..FinancialSummary::default()
    };

    for p in periods {
        let days = p.inclusive_days();
        let amount = p.amount.raw() as i128;
        total += amount;
        s.total_days += days;

        if p.is_gap_period {
            gap += amount;
            s.gap_days += days;
            s.gap_period_count += 1;
        } else {
            s.billable_days += days;
            if p.payment_method == PaymentMethod::Coverage {
                coverage += amount;
                s.coverage_period_count += 1;
            } else {
                patient += amount;
            }
        }

        s.lines.push(PeriodLine {
            period_id: p.id.clone(),
            start_date: p.start_date,
            end_date: p.end_date,
            days,
            amount: p.amount,
            payment_method: p.payment_method,
            is_gap_period: p.is_gap_period,
        });
    }

    s.total_amount = i128_to_micros_clamp(total);
    s.coverage_amount = i128_to_micros_clamp(coverage);
    s.patient_amount = i128_to_micros_clamp(patient);
    s.gap_amount = i128_to_micros_clamp(gap);
    s
}
