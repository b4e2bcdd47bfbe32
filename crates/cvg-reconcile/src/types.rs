use chrono::NaiveDate;
use cvg_schemas::{Micros, PaymentPeriod, Severity};
use serde::Serialize;

/// Closed calendar interval `[start, end]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Closed-interval intersection; touching endpoints count.
    pub fn intersects(&self, other: &DateSpan) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// `end - start` in calendar days.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl From<&PaymentPeriod> for DateSpan {
    fn from(p: &PaymentPeriod) -> Self {
        Self::new(p.start_date, p.end_date)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapKind {
    /// Uncovered days between two chosen periods.
    PaymentGap,
    /// Urgent rental started before the insurer approved the first bond.
    PreCoverageGap,
    /// In-progress coverage about to end.
    CoverageExpiring,
}

/// A coverage hole or upcoming hole, for display only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    #[serde(rename = "type")]
    pub kind: GapKind,
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Single-day gaps (expiry markers) carry a date instead of a range.
    pub date: Option<NaiveDate>,
    pub duration_days: i64,
    pub amount: Option<Micros>,
    pub severity: Severity,
    pub bond_ref: Option<String>,
}
