use std::collections::HashSet;

use cvg_schemas::PaymentPeriod;

/// Collapse structurally identical periods (same start, end, amount and gap
/// flag). First occurrence wins; order is otherwise preserved.
///
/// Remediation for earlier generation rounds or concurrent edits. Callers run
/// it on demand, not after every edit.
pub fn dedupe(periods: &[PaymentPeriod]) -> Vec<PaymentPeriod> {
    let mut seen = HashSet::with_capacity(periods.len());
    periods
        .iter()
        .filter(|p| seen.insert(p.identity()))
        .cloned()
        .collect()
}

/// Number of periods [`dedupe`] would drop.
pub fn duplicate_count(periods: &[PaymentPeriod]) -> usize {
    let unique: HashSet<_> = periods.iter().map(PaymentPeriod::identity).collect();
    periods.len() - unique.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cvg_schemas::{GapReason, Micros, PaymentMethod};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_occurrence_wins() {
        let a = PaymentPeriod::gap("a", ymd(2024, 1, 1), ymd(2024, 1, 31), Micros::from_units(300), GapReason::CoveragePending);
        let b = PaymentPeriod::gap("b", ymd(2024, 1, 1), ymd(2024, 1, 31), Micros::from_units(300), GapReason::Other);
        let out = dedupe(&[a.clone(), b]);
        assert_eq!(out, vec![a]);
    }

    #[test]
    fn gap_flag_is_part_of_identity() {
        let gap = PaymentPeriod::gap("g", ymd(2024, 1, 1), ymd(2024, 1, 31), Micros::from_units(300), GapReason::Other);
        let billing = PaymentPeriod::standard("s", ymd(2024, 1, 1), ymd(2024, 1, 31), Micros::from_units(300), PaymentMethod::Cash);
        assert_eq!(dedupe(&[gap, billing]).len(), 2);
    }

    #[test]
    fn order_is_preserved() {
        let p = |id: &str, d: u32| {
            PaymentPeriod::standard(id, ymd(2024, 1, d), ymd(2024, 1, d), Micros::ZERO, PaymentMethod::Cash)
        };
        let out = dedupe(&[p("3", 3), p("1", 1), p("3b", 3), p("2", 2)]);
        let ids: Vec<&str> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(duplicate_count(&[p("3", 3), p("1", 1), p("3b", 3)]), 1);
    }
}
