use chrono::NaiveDate;
use cvg_schemas::{Micros, PaymentPeriod};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// What is wrong with a period (or a pair of periods).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum IssueKind {
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    InvalidAmount {
        amount: Micros,
    },
    StartsBeforeRental {
        #[serde(rename = "rentalStart")]
        rental_start: NaiveDate,
    },
    EndsAfterRental {
        #[serde(rename = "rentalEnd")]
        rental_end: NaiveDate,
    },
    Overlap {
        first: String,
        second: String,
        #[serde(rename = "overlapDays")]
        overlap_days: i64,
    },
}

impl IssueKind {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            IssueKind::InvalidRange { .. }
            | IssueKind::InvalidAmount { .. }
            | IssueKind::Overlap { .. } => IssueSeverity::Error,
            IssueKind::StartsBeforeRental { .. } | IssueKind::EndsAfterRental { .. } => {
                IssueSeverity::Warning
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodIssue {
    /// Period the issue was found on; for overlaps, the earlier one.
    pub period_id: String,
    pub severity: IssueSeverity,
    pub issue: IssueKind,
}

impl PeriodIssue {
    fn new(period_id: &str, issue: IssueKind) -> Self {
        Self {
            period_id: period_id.to_string(),
            severity: issue.severity(),
            issue,
        }
    }
}

/// Consistency check over a hand-edited period list. Read-only.
///
/// Periods are visited in start-date order. Per-period checks come first,
/// then the overlap check against the next period in that order.
pub fn audit_periods(
    periods: &[PaymentPeriod],
    rental_start: Option<NaiveDate>,
    rental_end: Option<NaiveDate>,
) -> Vec<PeriodIssue> {
    let mut sorted: Vec<&PaymentPeriod> = periods.iter().collect();
    sorted.sort_by_key(|p| p.start_date);

    let mut issues = Vec::new();
    for (i, p) in sorted.iter().enumerate() {
        if p.end_date < p.start_date {
            issues.push(PeriodIssue::new(
                &p.id,
                IssueKind::InvalidRange {
                    start: p.start_date,
                    end: p.end_date,
                },
            ));
        }
        if p.amount.is_negative() {
            issues.push(PeriodIssue::new(&p.id, IssueKind::InvalidAmount { amount: p.amount }));
        }
        if let Some(rental_start) = rental_start.filter(|s| p.start_date < *s) {
            issues.push(PeriodIssue::new(&p.id, IssueKind::StartsBeforeRental { rental_start }));
        }
        if let Some(rental_end) = rental_end.filter(|e| p.end_date > *e) {
            issues.push(PeriodIssue::new(&p.id, IssueKind::EndsAfterRental { rental_end }));
        }

        if let Some(next) = sorted.get(i + 1) {
            if next.start_date <= p.end_date {
                issues.push(PeriodIssue::new(
                    &p.id,
                    IssueKind::Overlap {
                        first: p.id.clone(),
                        second: next.id.clone(),
                        overlap_days: (p.end_date - next.start_date).num_days().abs(),
                    },
                ));
            }
        }
    }
    issues
}
