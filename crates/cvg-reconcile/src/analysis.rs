use chrono::{Days, NaiveDate};
use cvg_coverage::{days_until, AlertPolicy};
use cvg_schemas::{AlertContext, BondStatus, CoverageBond, PaymentPeriod, RentalTimeline, Severity};
use tracing::debug;

use crate::{scan, Gap, GapKind};

/// Days the insurer usually takes to approve a submitted bond.
const ASSUMED_APPROVAL_DELAY_DAYS: u64 = 7;

/// Every hole worth showing for one rental, in three groups:
///
/// 1. pre-approval gap of an urgent rental (first bond only),
/// 2. in-progress bonds expiring within their reminder window,
/// 3. payment gaps from [`scan`].
pub fn analyze_gaps(
    bonds: &[CoverageBond],
    timeline: &RentalTimeline,
    periods: &[PaymentPeriod],
    ctx: &AlertContext,
    policy: &AlertPolicy,
    today: NaiveDate,
) -> Vec<Gap> {
    let mut gaps = Vec::new();

    if ctx.urgent_rental {
        if let Some(gap) = bonds.first().and_then(|b| pre_coverage_gap(b, timeline)) {
            gaps.push(gap);
        }
    }

    for bond in bonds.iter().filter(|b| b.status == BondStatus::InProgress) {
        let Some(end) = bond.coverage_end else {
            continue;
        };
        let days = days_until(end, today);
        if days <= 0 || days > bond.renewal_reminder_days {
            continue;
        }
        gaps.push(Gap {
            kind: GapKind::CoverageExpiring,
            title: "coverage expiring soon".to_string(),
            description: format!("bond {} expires in {days} days", bond.label()),
            start_date: None,
            end_date: None,
            date: Some(end),
            duration_days: days,
            amount: None,
            severity: policy.priority_for(days),
            bond_ref: Some(bond.id.clone()),
        });
    }

    gaps.extend(scan(periods, timeline.daily_rate));
    debug!(gaps = gaps.len(), urgent = ctx.urgent_rental, "gap analysis");
    gaps
}

/// Days between rental start and the first bond's (expected) approval.
fn pre_coverage_gap(bond: &CoverageBond, timeline: &RentalTimeline) -> Option<Gap> {
    let submitted = bond.submission_date?;
    let approved = match bond.approval_date {
        Some(d) => d,
        None => submitted.checked_add_days(Days::new(ASSUMED_APPROVAL_DELAY_DAYS))?,
    };
    let start = timeline.effective_start_date;
    let days = (approved - start).num_days();
    if days <= 0 {
        return None;
    }
    Some(Gap {
        kind: GapKind::PreCoverageGap,
        title: "gap before coverage approval".to_string(),
        description: "urgent rental started before the insurer approved coverage".to_string(),
        start_date: Some(start),
        end_date: Some(approved),
        date: None,
        duration_days: days,
        amount: timeline.daily_rate.checked_mul_days(days),
        severity: Severity::High,
        bond_ref: Some(bond.id.clone()),
    })
}
