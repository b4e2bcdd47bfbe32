//! Scenario: the validity decision table is total and ordered.
//!
//! # Invariants under test
//!
//! 1. Every (bond, today) pair maps to exactly one rule; `validate` never panics.
//! 2. `is_valid` holds only for the `Active` rule.
//! 3. `should_create_gap` holds iff a gap reason code is present.
//! 4. Validation is idempotent: same inputs, same verdict.

use chrono::{Duration, NaiveDate};
use cvg_coverage::{classify, validate, CoverageRule};
use cvg_schemas::{BondStatus, BondType, CoverageBond, GapReason};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn status_strategy() -> impl Strategy<Value = BondStatus> {
    prop::sample::select(vec![
        BondStatus::PendingApproval,
        BondStatus::Approved,
        BondStatus::InProgress,
        BondStatus::Terminated,
        BondStatus::Refused,
        BondStatus::Unknown,
    ])
}

fn date_strategy() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((0i64..400).prop_map(|d| base() + Duration::days(d)))
}

proptest! {
    #[test]
    fn prop_every_bond_maps_to_one_consistent_verdict(
        status in status_strategy(),
        start in date_strategy(),
        end in date_strategy(),
        today_offset in 0i64..400,
    ) {
        let mut bond = CoverageBond::new("b", BondType::Other, status);
        bond.coverage_start = start;
        bond.coverage_end = end;
        let today = base() + Duration::days(today_offset);

        let v = validate(&bond, today);
        prop_assert_eq!(v.rule, classify(&bond, today));
        prop_assert_eq!(v.is_valid, v.rule == CoverageRule::Active);
        prop_assert_eq!(v.should_create_gap, v.gap_reason_code.is_some());
        prop_assert_eq!(v.should_create_gap, !v.is_valid);
        prop_assert_eq!(&v, &validate(&bond, today));

        if v.is_valid {
            let (s, e) = (start.unwrap(), end.unwrap());
            prop_assert!(s <= today && today <= e);
        }
    }
}

#[test]
fn scenario_table_rows_in_order() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2024, m, day);

    let cases = [
        (BondStatus::Refused, d(1, 1), d(2, 1), CoverageRule::Refused, GapReason::CoveragePending),
        (BondStatus::PendingApproval, None, None, CoverageRule::PendingApproval, GapReason::CoveragePending),
        (BondStatus::Approved, d(1, 20), d(2, 1), CoverageRule::NotYetStarted, GapReason::CoveragePending),
        (BondStatus::Terminated, d(1, 1), d(2, 1), CoverageRule::Expired, GapReason::CoverageExpired),
        (BondStatus::InProgress, d(1, 1), d(1, 14), CoverageRule::Expired, GapReason::CoverageExpired),
        (BondStatus::InProgress, d(1, 1), None, CoverageRule::DatesUndefined, GapReason::CoveragePending),
        (BondStatus::Unknown, None, None, CoverageRule::UnknownStatus, GapReason::CoveragePending),
    ];

    for (status, start, end, rule, reason) in cases {
        let mut bond = CoverageBond::new("b", BondType::Cpap, status);
        bond.coverage_start = start;
        bond.coverage_end = end;
        let v = validate(&bond, today);
        assert_eq!(v.rule, rule, "status {status:?}");
        assert_eq!(v.gap_reason_code, Some(reason), "status {status:?}");
    }
}
