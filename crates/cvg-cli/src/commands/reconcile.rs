//! `cvg reconcile`: one full generation round for a rental.
//!
//! synthesize -> merge -> scan -> alerts -> aggregate
//!
//! The merged list is returned as-is. Deduplication is a separate, explicit
//! step (`cvg dedupe`).

use chrono::NaiveDate;
use cvg_coverage::{alerts_with_context, RenewalAlert};
use cvg_finance::{aggregate, FinancialAggregate};
use cvg_reconcile::{
    gap_notifications, scan, synthesize_with_policy, Gap, GapNotice, SynthesisDiagnostic,
};
use cvg_schemas::{PaymentPeriod, ReconcileRequest};
use serde::Serialize;
use tracing::info;

use super::Policies;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub today: NaiveDate,
    pub config_hash: Option<String>,
    pub effective_start: NaiveDate,
    pub rental_end: NaiveDate,
    pub any_valid_bond: bool,
    /// Periods the caller should append.
    pub new_periods: Vec<PaymentPeriod>,
    pub diagnostics: Vec<SynthesisDiagnostic>,
    /// Existing periods followed by the new ones.
    pub periods: Vec<PaymentPeriod>,
    pub payment_gaps: Vec<Gap>,
    pub alerts: Vec<RenewalAlert>,
    pub notices: Vec<GapNotice>,
    pub aggregate: FinancialAggregate,
}

pub fn run_reconcile(req: &ReconcileRequest, policies: &Policies) -> ReconcileResponse {
    let report = synthesize_with_policy(
        &policies.synthesis,
        &req.bonds,
        &req.timeline,
        req.import.as_ref(),
        &req.periods,
        req.today,
    );

    let mut periods = req.periods.clone();
    periods.extend(report.periods.iter().cloned());

    if report.periods.is_empty() {
        info!("no periods generated, rental already covered");
    } else {
        info!(appended = report.periods.len(), "periods generated");
    }

    let payment_gaps = scan(&periods, req.timeline.daily_rate);
    let alerts = alerts_with_context(
        &policies.alerts,
        &req.bonds,
        &req.timeline,
        &req.alert_context,
        req.today,
    );
    let notices = gap_notifications(&report.periods);
    let aggregate = aggregate(&periods, req.deposit_amount, req.timeline.daily_rate);

    ReconcileResponse {
        today: req.today,
        config_hash: policies.config_hash.clone(),
        effective_start: report.effective_start,
        rental_end: report.rental_end,
        any_valid_bond: report.any_valid_bond,
        new_periods: report.periods,
        diagnostics: report.diagnostics,
        periods,
        payment_gaps,
        alerts,
        notices,
        aggregate,
    }
}
