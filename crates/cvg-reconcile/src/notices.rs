use chrono::NaiveDate;
use cvg_schemas::{GapReason, Micros, PaymentPeriod, Severity};
use serde::Serialize;

/// Payload for telling staff a gap period is now billed to the patient.
/// Delivery is the caller's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapNotice {
    pub period_id: String,
    pub due_date: NaiveDate,
    pub amount: Micros,
    pub reason: Option<GapReason>,
    pub severity: Severity,
}

/// One notice per gap period; standard periods are ignored.
pub fn gap_notifications(periods: &[PaymentPeriod]) -> Vec<GapNotice> {
    periods
        .iter()
        .filter(|p| p.is_gap_period)
        .map(|p| GapNotice {
            period_id: p.id.clone(),
            due_date: p.start_date,
            amount: p.amount,
            reason: p.gap_reason,
            severity: match p.gap_reason {
                Some(GapReason::CoveragePending | GapReason::CoverageExpired) => Severity::High,
                _ => Severity::Medium,
            },
        })
        .collect()
}
