use cvg_schemas::PaymentPeriod;

use crate::DateSpan;

/// True iff any existing period's `[start, end]` intersects `candidate`.
///
/// Closed intervals: a period ending on the day another starts overlaps it.
pub fn overlaps(candidate: DateSpan, existing: &[PaymentPeriod]) -> bool {
    overlaps_any(candidate, existing)
}

/// Same test over any sequence of periods, e.g. existing periods chained with
/// the ones added earlier in the same pass.
pub fn overlaps_any<'a, I>(candidate: DateSpan, periods: I) -> bool
where
    I: IntoIterator<Item = &'a PaymentPeriod>,
{
    periods
        .into_iter()
        .any(|p| candidate.intersects(&DateSpan::from(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cvg_schemas::{Micros, PaymentMethod};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate) -> PaymentPeriod {
        PaymentPeriod::standard("p", start, end, Micros::ZERO, PaymentMethod::Cash)
    }

    #[test]
    fn touching_endpoints_overlap() {
        let existing = vec![period(ymd(2024, 1, 1), ymd(2024, 1, 10))];
        assert!(overlaps(DateSpan::new(ymd(2024, 1, 10), ymd(2024, 1, 20)), &existing));
        assert!(overlaps(DateSpan::new(ymd(2023, 12, 20), ymd(2024, 1, 1)), &existing));
    }

    #[test]
    fn adjacent_days_do_not_overlap() {
        let existing = vec![period(ymd(2024, 1, 1), ymd(2024, 1, 10))];
        assert!(!overlaps(DateSpan::new(ymd(2024, 1, 11), ymd(2024, 1, 20)), &existing));
    }

    #[test]
    fn containment_overlaps_both_ways() {
        let existing = vec![period(ymd(2024, 1, 5), ymd(2024, 1, 6))];
        assert!(overlaps(DateSpan::new(ymd(2024, 1, 1), ymd(2024, 1, 31)), &existing));
        let wide = vec![period(ymd(2024, 1, 1), ymd(2024, 1, 31))];
        assert!(overlaps(DateSpan::new(ymd(2024, 1, 5), ymd(2024, 1, 6)), &wide));
    }

    #[test]
    fn empty_set_never_overlaps() {
        assert!(!overlaps(DateSpan::new(ymd(2024, 1, 1), ymd(2024, 1, 31)), &[]));
    }

    #[test]
    fn chained_sources_are_checked() {
        let a = vec![period(ymd(2024, 1, 1), ymd(2024, 1, 5))];
        let b = vec![period(ymd(2024, 2, 1), ymd(2024, 2, 5))];
        let probe = DateSpan::new(ymd(2024, 2, 3), ymd(2024, 2, 4));
        assert!(!overlaps(probe, &a));
        assert!(overlaps_any(probe, a.iter().chain(b.iter())));
    }
}
