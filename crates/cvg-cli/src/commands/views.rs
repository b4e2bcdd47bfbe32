//! Read-only single-component views over a request.

use anyhow::{bail, Context, Result};
use cvg_coverage::{draft_renewal, validate, CoverageValidation};
use cvg_finance::{aggregate, summarize, FinancialAggregate, FinancialSummary};
use cvg_reconcile::{
    analyze_gaps, detect_billing_gaps, dedupe, period_for_gap, scan, AppendPlan, BillingGap, Gap,
};
use cvg_schemas::{CoverageBond, PaymentPeriod, ReconcileRequest};
use serde::Serialize;

use super::Policies;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondVerdict {
    pub bond_id: String,
    #[serde(flatten)]
    pub validation: CoverageValidation,
}

pub fn validate_bonds(req: &ReconcileRequest) -> Vec<BondVerdict> {
    req.bonds
        .iter()
        .map(|b| BondVerdict {
            bond_id: b.id.clone(),
            validation: validate(b, req.today),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanView {
    pub payment_gaps: Vec<Gap>,
    pub billing_gaps: Vec<BillingGap>,
}

pub fn scan_view(req: &ReconcileRequest) -> ScanView {
    ScanView {
        payment_gaps: scan(&req.periods, req.timeline.daily_rate),
        billing_gaps: detect_billing_gaps(
            &req.periods,
            req.timeline.effective_start_date,
            req.timeline.end_date,
            req.timeline.daily_rate,
            req.today,
        ),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeView {
    pub removed: usize,
    pub periods: Vec<PaymentPeriod>,
}

pub fn dedupe_view(req: &ReconcileRequest) -> DedupeView {
    let periods = dedupe(&req.periods);
    DedupeView {
        removed: req.periods.len() - periods.len(),
        periods,
    }
}

#[derive(Debug, Serialize)]
pub struct AggregateView {
    pub aggregate: FinancialAggregate,
    pub summary: FinancialSummary,
}

pub fn aggregate_view(req: &ReconcileRequest) -> AggregateView {
    AggregateView {
        aggregate: aggregate(&req.periods, req.deposit_amount, req.timeline.daily_rate),
        summary: summarize(&req.periods),
    }
}

pub fn renewal_draft(req: &ReconcileRequest, bond_id: &str) -> Result<CoverageBond> {
    draft_renewal(&req.bonds, bond_id, req.today)
        .with_context(|| format!("unknown bond id: {bond_id}"))
}

/// Gap period for the `index`-th entry of the gap analysis.
pub fn bill_gap(req: &ReconcileRequest, policies: &Policies, index: usize) -> Result<AppendPlan> {
    let gaps = analyze_gaps(
        &req.bonds,
        &req.timeline,
        &req.periods,
        &req.alert_context,
        &policies.alerts,
        req.today,
    );
    let Some(gap) = gaps.get(index) else {
        bail!("gap index {index} out of range ({} gaps)", gaps.len());
    };
    Ok(period_for_gap(gap, &req.timeline, &req.periods))
}
