//! Scenario: generation can be re-run after manual edits.
//!
//! # Invariants under test
//!
//! 1. Non-overlap: synthesized periods merged with a non-overlapping existing
//!    set never overlap pairwise (closed intervals).
//! 2. Idempotence: feeding the first run's output back as existing periods
//!    makes the second run append nothing.
//! 3. Bond-driven gaps are priced exactly at `daily_rate × span_days`.

use chrono::{Duration, NaiveDate};
use cvg_reconcile::*;
use cvg_schemas::{
    BondStatus, BondType, CoverageBond, ExistingRentalImport, Micros, PaymentMethod,
    PaymentPeriod, RentalTimeline,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    base() + Duration::days(offset)
}

fn bond_strategy() -> impl Strategy<Value = CoverageBond> {
    (
        prop::sample::select(vec![
            BondStatus::PendingApproval,
            BondStatus::Approved,
            BondStatus::InProgress,
            BondStatus::Terminated,
            BondStatus::Refused,
            BondStatus::Unknown,
        ]),
        prop::option::of(0i64..120),
        prop::option::of(0i64..120),
        0u32..1000,
    )
        .prop_map(|(status, start, end, n)| {
            let mut b = CoverageBond::new(format!("bond-{n}"), BondType::Other, status);
            b.coverage_start = start.map(day);
            b.coverage_end = end.map(day);
            b
        })
}

/// Non-overlapping existing periods laid out left to right.
fn existing_strategy() -> impl Strategy<Value = Vec<PaymentPeriod>> {
    prop::collection::vec((1i64..20, 0i64..15), 0..4).prop_map(|steps| {
        let mut cursor = -10;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (skip, len))| {
                let start = cursor + skip;
                let end = start + len;
                cursor = end;
                PaymentPeriod::standard(
                    format!("existing-{i}"),
                    day(start),
                    day(end),
                    Micros::from_units(len),
                    PaymentMethod::Cash,
                )
            })
            .collect()
    })
}

fn timeline_strategy() -> impl Strategy<Value = RentalTimeline> {
    (0i64..30, prop::option::of(0i64..90), 0i64..50).prop_map(|(start, len, rate)| {
        RentalTimeline::new(
            day(start),
            len.map(|l| day(start + l)),
            Micros::from_units(rate),
        )
    })
}

fn import_strategy() -> impl Strategy<Value = Option<ExistingRentalImport>> {
    prop::option::of((any::<bool>(), 0i64..40, 0i64..500).prop_map(|(is_existing, at, unpaid)| {
        ExistingRentalImport {
            is_existing,
            import_date: day(at),
            has_active_coverage: false,
            coverage_expiration_date: None,
            current_unpaid_amount: Micros::from_units(unpaid),
        }
    }))
}

fn assert_pairwise_disjoint(periods: &[PaymentPeriod]) -> Result<(), TestCaseError> {
    for (i, a) in periods.iter().enumerate() {
        for b in &periods[i + 1..] {
            prop_assert!(
                !DateSpan::from(a).intersects(&DateSpan::from(b)),
                "{} [{}, {}] overlaps {} [{}, {}]",
                a.id,
                a.start_date,
                a.end_date,
                b.id,
                b.start_date,
                b.end_date
            );
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_merged_periods_never_overlap(
        bonds in prop::collection::vec(bond_strategy(), 0..5),
        existing in existing_strategy(),
        timeline in timeline_strategy(),
        import in import_strategy(),
        today in 0i64..150,
    ) {
        let added = synthesize(&bonds, &timeline, import.as_ref(), &existing, day(today));
        let mut merged = existing.clone();
        merged.extend(added);
        assert_pairwise_disjoint(&merged)?;
    }

    #[test]
    fn prop_second_run_appends_nothing(
        bonds in prop::collection::vec(bond_strategy(), 0..5),
        existing in existing_strategy(),
        timeline in timeline_strategy(),
        import in import_strategy(),
        today in 0i64..150,
    ) {
        let first = synthesize(&bonds, &timeline, import.as_ref(), &existing, day(today));
        let mut merged = existing.clone();
        merged.extend(first);
        let second = synthesize(&bonds, &timeline, import.as_ref(), &merged, day(today));
        prop_assert!(second.is_empty(), "second run appended {:?}", second);
    }

    #[test]
    fn prop_bond_gaps_are_priced_exactly(
        bonds in prop::collection::vec(bond_strategy(), 1..5),
        timeline in timeline_strategy(),
        today in 0i64..150,
    ) {
        let report = synthesize_with_policy(
            &SynthesisPolicy::default(),
            &bonds,
            &timeline,
            None,
            &[],
            day(today),
        );
        for p in report.periods.iter().filter(|p| p.is_gap_period) {
            prop_assert_eq!(Some(p.amount), timeline.daily_rate.checked_mul_days(p.span_days()));
        }
    }
}
