use std::collections::BTreeMap;

use cvg_schemas::{Micros, PaymentMethod, PaymentPeriod};
use serde::Serialize;

use crate::i128_to_micros_clamp;

/// Reporting totals for one rental.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAggregate {
    /// Σ period amounts + deposit.
    pub total: Micros,
    pub by_method: BTreeMap<PaymentMethod, Micros>,
    /// Insurer-paid amount expressed in days at `daily_rate`.
    pub coverage_days: f64,
    /// Gap amount expressed in days at `daily_rate`.
    pub gap_days: f64,
    /// Everything except insurer-paid, non-gap periods. Deposit excluded.
    pub patient_payable_total: Micros,
}

fn is_insurer_paid(p: &PaymentPeriod) -> bool {
    p.payment_method == PaymentMethod::Coverage && !p.is_gap_period
}

/// Totals over `periods`. Day figures are 0 when `daily_rate` is zero.
pub fn aggregate(periods: &[PaymentPeriod], deposit: Micros, daily_rate: Micros) -> FinancialAggregate {
    let mut total: i128 = deposit.raw() as i128;
    let mut coverage: i128 = 0;
    let mut gap: i128 = 0;
    let mut patient: i128 = 0;
    let mut by_method: BTreeMap<PaymentMethod, i128> = BTreeMap::new();

    for p in periods {
        let amount = p.amount.raw() as i128;
        total += amount;
        *by_method.entry(p.payment_method).or_insert(0) += amount;
        if is_insurer_paid(p) {
            coverage += amount;
        } else {
            patient += amount;
        }
        if p.is_gap_period {
            gap += amount;
        }
    }

    let days = |sum: i128| i128_to_micros_clamp(sum).ratio(daily_rate).unwrap_or(0.0);
    FinancialAggregate {
        total: i128_to_micros_clamp(total),
        by_method: by_method
            .into_iter()
            .map(|(m, v)| (m, i128_to_micros_clamp(v)))
            .collect(),
        coverage_days: days(coverage),
        gap_days: days(gap),
        patient_payable_total: i128_to_micros_clamp(patient),
    }
}
