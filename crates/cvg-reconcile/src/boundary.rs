//! Gap periods derived from bond dates and from displayed gaps.
//!
//! Both entry points only propose periods to append. Candidates go through
//! the same overlap guard as the synthesizer, so running them after manual
//! edits or after [`crate::synthesize`] never double-charges a day.

use cvg_schemas::{derive_id, CoverageBond, GapReason, PaymentPeriod, RentalTimeline};
use tracing::debug;

use crate::engine::{AppendPlan, Pass};
use crate::{DateSpan, Gap, GapKind, PeriodOrigin, SynthesisDiagnostic};

/// Uncovered stretches around each bond's coverage window.
///
/// - before: `[rental start, coverage_start - 1]`, COVERAGE_PENDING, when the
///   bond starts after the rental does;
/// - after: `[coverage_end + 1, rental end]`, COVERAGE_EXPIRED, when the rental
///   has an end date past the bond's.
///
/// Each is priced at `daily_rate × (later date - earlier date)` days.
/// Bonds are taken as given; their status is not consulted.
pub fn bond_boundary_gaps(
    bonds: &[CoverageBond],
    timeline: &RentalTimeline,
    existing: &[PaymentPeriod],
) -> AppendPlan {
    let rental_start = timeline.effective_start_date;
    let mut pass = Pass::new(timeline, existing);

    for bond in bonds {
        if let Some(bond_start) = bond.coverage_start.filter(|s| *s > rental_start) {
            if let Some(end) = bond_start.pred_opt() {
                let origin = PeriodOrigin::PreBond {
                    bond_id: bond.id.clone(),
                };
                let days = (bond_start - rental_start).num_days();
                if let Some(amount) = pass.amount_for(&origin, days) {
                    let period = PaymentPeriod::gap(
                        derive_id("pre-bond", &[&bond.id, &rental_start.to_string(), &end.to_string()]),
                        rental_start,
                        end,
                        amount,
                        GapReason::CoveragePending,
                    )
                    .with_notes(format!("gap before coverage of bond {}", bond.label()));
                    pass.push(origin, DateSpan::new(rental_start, end), period);
                }
            }
        }

        let (Some(bond_end), Some(rental_end)) = (bond.coverage_end, timeline.end_date) else {
            continue;
        };
        if rental_end <= bond_end {
            continue;
        }
        let Some(start) = bond_end.succ_opt() else {
            continue;
        };
        let origin = PeriodOrigin::PostBond {
            bond_id: bond.id.clone(),
        };
        let Some(amount) = pass.amount_for(&origin, (rental_end - bond_end).num_days()) else {
            continue;
        };
        let period = PaymentPeriod::gap(
            derive_id("post-bond", &[&bond.id, &start.to_string(), &rental_end.to_string()]),
            start,
            rental_end,
            amount,
            GapReason::CoverageExpired,
        )
        .with_notes(format!("gap after coverage of bond {}", bond.label()));
        pass.push(origin, DateSpan::new(start, rental_end), period);
    }

    let plan = pass.finish();
    debug!(bonds = bonds.len(), appended = plan.periods.len(), "bond boundary gaps");
    plan
}

/// Turn one displayed [`Gap`] into a patient-payable gap period.
///
/// Single-day gaps bill their `date`. The amount is the gap's estimate (zero
/// when it has none); pre-approval gaps are COVERAGE_PENDING, the rest OTHER.
pub fn period_for_gap(gap: &Gap, timeline: &RentalTimeline, existing: &[PaymentPeriod]) -> AppendPlan {
    let mut pass = Pass::new(timeline, existing);

    let span = match (gap.start_date, gap.end_date, gap.date) {
        (Some(start), Some(end), _) => Some(DateSpan::new(start, end)),
        (_, _, Some(day)) => Some(DateSpan::new(day, day)),
        _ => None,
    };
    let Some(span) = span else {
        pass.diagnose(SynthesisDiagnostic::UndatedGap {
            title: gap.title.clone(),
        });
        return pass.finish();
    };

    let reason = match gap.kind {
        GapKind::PreCoverageGap => GapReason::CoveragePending,
        GapKind::PaymentGap | GapKind::CoverageExpiring => GapReason::Other,
    };
    let period = PaymentPeriod::gap(
        derive_id("gap-payment", &[&span.start.to_string(), &span.end.to_string()]),
        span.start,
        span.end,
        gap.amount.unwrap_or_default(),
        reason,
    )
    .with_notes(gap.description.clone());
    pass.push(PeriodOrigin::DisplayedGap, span, period);
    pass.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cvg_schemas::{BondStatus, BondType, Micros, PaymentMethod, Severity};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn first_quarter() -> RentalTimeline {
        RentalTimeline::new(ymd(2024, 1, 1), Some(ymd(2024, 3, 31)), Micros::from_units(10))
    }

    fn bond_covering(start: NaiveDate, end: NaiveDate) -> CoverageBond {
        let mut b = CoverageBond::new("b1", BondType::OxygenConcentrator, BondStatus::Approved);
        b.coverage_start = Some(start);
        b.coverage_end = Some(end);
        b
    }

    #[test]
    fn bond_inside_rental_gets_gaps_on_both_sides() {
        let bond = bond_covering(ymd(2024, 1, 11), ymd(2024, 2, 29));
        let plan = bond_boundary_gaps(&[bond], &first_quarter(), &[]);

        assert_eq!(plan.periods.len(), 2);
        let (pre, post) = (&plan.periods[0], &plan.periods[1]);
        assert_eq!((pre.start_date, pre.end_date), (ymd(2024, 1, 1), ymd(2024, 1, 10)));
        assert_eq!(pre.gap_reason, Some(GapReason::CoveragePending));
        assert_eq!(pre.amount, Micros::from_units(100));
        assert_eq!((post.start_date, post.end_date), (ymd(2024, 3, 1), ymd(2024, 3, 31)));
        assert_eq!(post.gap_reason, Some(GapReason::CoverageExpired));
        assert_eq!(post.amount, Micros::from_units(310));
    }

    #[test]
    fn open_ended_rental_has_no_post_bond_gap() {
        let timeline = RentalTimeline::new(ymd(2024, 1, 1), None, Micros::from_units(10));
        let bond = bond_covering(ymd(2024, 1, 1), ymd(2024, 2, 29));
        assert!(bond_boundary_gaps(&[bond], &timeline, &[]).periods.is_empty());
    }

    #[test]
    fn boundary_gap_over_existing_period_is_rejected() {
        let existing = vec![PaymentPeriod::standard(
            "manual",
            ymd(2024, 1, 5),
            ymd(2024, 1, 8),
            Micros::from_units(40),
            PaymentMethod::Cash,
        )];
        let bond = bond_covering(ymd(2024, 1, 11), ymd(2024, 3, 31));
        let plan = bond_boundary_gaps(&[bond], &first_quarter(), &existing);
        assert!(plan.periods.is_empty());
        assert!(matches!(
            plan.diagnostics.as_slice(),
            [SynthesisDiagnostic::OverlapRejected { origin: PeriodOrigin::PreBond { .. }, .. }]
        ));
    }

    #[test]
    fn two_bonds_sharing_a_start_yield_one_pre_gap() {
        let a = bond_covering(ymd(2024, 2, 1), ymd(2024, 3, 31));
        let mut b = a.clone();
        b.id = "b2".to_string();
        let plan = bond_boundary_gaps(&[a, b], &first_quarter(), &[]);
        assert_eq!(plan.periods.len(), 1);
        assert_eq!(plan.diagnostics.len(), 1);
    }

    fn displayed(kind: GapKind, start: Option<NaiveDate>, end: Option<NaiveDate>, date: Option<NaiveDate>) -> Gap {
        Gap {
            kind,
            title: "gap".to_string(),
            description: "shown to the user".to_string(),
            start_date: start,
            end_date: end,
            date,
            duration_days: 0,
            amount: Some(Micros::from_units(70)),
            severity: Severity::High,
            bond_ref: None,
        }
    }

    #[test]
    fn pre_coverage_gap_becomes_pending_period() {
        let gap = displayed(GapKind::PreCoverageGap, Some(ymd(2024, 1, 1)), Some(ymd(2024, 1, 8)), None);
        let plan = period_for_gap(&gap, &first_quarter(), &[]);
        assert_eq!(plan.periods.len(), 1);
        let p = &plan.periods[0];
        assert!(p.is_gap_period);
        assert_eq!(p.gap_reason, Some(GapReason::CoveragePending));
        assert_eq!(p.amount, Micros::from_units(70));
        assert_eq!(p.notes.as_deref(), Some("shown to the user"));
    }

    #[test]
    fn single_day_gap_bills_its_date() {
        let gap = displayed(GapKind::CoverageExpiring, None, None, Some(ymd(2024, 2, 29)));
        let plan = period_for_gap(&gap, &first_quarter(), &[]);
        let p = &plan.periods[0];
        assert_eq!((p.start_date, p.end_date), (ymd(2024, 2, 29), ymd(2024, 2, 29)));
        assert_eq!(p.gap_reason, Some(GapReason::Other));
    }

    #[test]
    fn undated_gap_is_diagnosed() {
        let gap = displayed(GapKind::PaymentGap, None, None, None);
        let plan = period_for_gap(&gap, &first_quarter(), &[]);
        assert!(plan.periods.is_empty());
        assert!(matches!(plan.diagnostics.as_slice(), [SynthesisDiagnostic::UndatedGap { .. }]));
    }
}
