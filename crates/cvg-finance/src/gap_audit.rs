//! Gap amount audit.
//!
//! Gap periods are billed to the patient at a co-payment rate, not at the
//! full equipment rate. Earlier generation rounds priced some of them at the
//! full rate; this module recomputes what each gap should cost and reports
//! the ones that drifted past a tolerance. It never rewrites the input.

use chrono::NaiveDate;
use cvg_schemas::{CoverageBond, Micros, PaymentPeriod};
use serde::Serialize;
use tracing::{debug, warn};

use crate::i128_to_micros_clamp;

const BPS: i128 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapAuditPolicy {
    /// Monthly prices are converted to daily rates over this many days.
    pub days_per_month: i64,
    /// Patient share of the equipment rate during a gap, in basis points.
    pub copay_ratio_bps: i64,
    /// Relative difference (basis points of the current amount) above which
    /// a correction is proposed.
    pub correction_threshold_bps: i64,
}

impl Default for GapAuditPolicy {
    fn default() -> Self {
        Self {
            days_per_month: 30,
            copay_ratio_bps: 2_000,
            correction_threshold_bps: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAmountCorrection {
    pub period_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub old_amount: Micros,
    pub new_amount: Micros,
    pub difference: Micros,
    pub days: i64,
    /// Gap daily rate, rounded to cents for display.
    pub daily_rate: Micros,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAmountAudit {
    pub gap_daily_rate: Micros,
    pub corrections: Vec<GapAmountCorrection>,
    /// Σ old amounts over corrected periods only.
    pub total_old: Micros,
    /// Σ new amounts over corrected periods only.
    pub total_new: Micros,
}

impl GapAmountAudit {
    /// Copy of `periods` with the corrections applied.
    pub fn apply(&self, periods: &[PaymentPeriod]) -> Vec<PaymentPeriod> {
        periods
            .iter()
            .map(|p| {
                let mut p = p.clone();
                if let Some(c) = self.corrections.iter().find(|c| c.period_id == p.id) {
                    p.amount = c.new_amount;
                }
                p
            })
            .collect()
    }
}

fn div_round(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if 2 * r.abs() >= den.abs() {
        q + num.signum() * den.signum()
    } else {
        q
    }
}

/// Patient daily rate during a gap:
/// `min(monthly_price / days_per_month × copay, first_bond_monthly / days_per_month)`.
///
/// The bond ceiling applies only when a first bond exists and carries a
/// positive monthly amount (falling back to `total / covered_months`).
pub fn gap_daily_rate(policy: &GapAuditPolicy, monthly_price: Micros, bonds: &[CoverageBond]) -> Micros {
    let dpm = policy.days_per_month.max(1) as i128;
    let copay = div_round(
        monthly_price.raw() as i128 * policy.copay_ratio_bps as i128,
        dpm * BPS,
    );

    let bond_monthly = bonds.first().map_or(0, |b| {
        if b.monthly_amount.is_positive() {
            b.monthly_amount.raw() as i128
        } else if b.covered_months > 0 {
            div_round(b.total_amount.raw() as i128, b.covered_months as i128)
        } else {
            0
        }
    });

    let rate = if bond_monthly > 0 {
        copay.min(div_round(bond_monthly, dpm))
    } else {
        copay
    };
    i128_to_micros_clamp(rate)
}

/// Proposed corrections for gap periods priced away from the co-payment rule.
pub fn audit_gap_amounts(
    policy: &GapAuditPolicy,
    periods: &[PaymentPeriod],
    monthly_price: Micros,
    bonds: &[CoverageBond],
) -> GapAmountAudit {
    let rate = gap_daily_rate(policy, monthly_price, bonds);
    let mut corrections = Vec::new();
    let mut total_old: i128 = 0;
    let mut total_new: i128 = 0;

    for p in periods.iter().filter(|p| p.is_gap_period) {
        let days = p.inclusive_days();
        let Some(expected) = rate.checked_mul_days(days) else {
            warn!(period_id = %p.id, days, "gap amount overflows, not audited");
            continue;
        };
        let expected = expected.round_to_cents();
        let old = p.amount.raw() as i128;
        let diff = (old - expected.raw() as i128).abs();
        if diff * BPS <= policy.correction_threshold_bps as i128 * old.abs() {
            continue;
        }

        debug!(period_id = %p.id, old = %p.amount, new = %expected, "gap amount drift");
        total_old += old;
        total_new += expected.raw() as i128;
        corrections.push(GapAmountCorrection {
            period_id: p.id.clone(),
            start_date: p.start_date,
            end_date: p.end_date,
            old_amount: p.amount,
            new_amount: expected,
            difference: i128_to_micros_clamp(diff),
            days,
            daily_rate: rate.round_to_cents(),
        });
    }

    GapAmountAudit {
        gap_daily_rate: rate,
        corrections,
        total_old: i128_to_micros_clamp(total_old),
        total_new: i128_to_micros_clamp(total_new),
    }
}
