use chrono::NaiveDate;
use cvg_schemas::{BondStatus, CoverageBond, GapReason};
use serde::Serialize;
use tracing::debug;

/// One row of the validity decision table, evaluated top to bottom.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageRule {
    /// 1. Refused. The patient keeps paying until a new bond is filed.
    Refused,
    /// 2. Still waiting for insurer approval.
    PendingApproval,
    /// 3. Approved, coverage starts after `today`.
    NotYetStarted,
    /// 4. Terminated, or coverage ended before `today`.
    Expired,
    /// 5. Approved / in progress and `start <= today <= end`.
    Active,
    /// 6. Approved / in progress but the coverage window is missing or does not contain `today`.
    DatesUndefined,
    /// 7. Anything else.
    UnknownStatus,
}

impl CoverageRule {
    pub fn is_valid(&self) -> bool {
        matches!(self, CoverageRule::Active)
    }

    /// Gap reason for every invalid rule. Refusals are billed as pending.
    pub fn gap_reason(&self) -> Option<GapReason> {
        match self {
            CoverageRule::Active => None,
            CoverageRule::Expired => Some(GapReason::CoverageExpired),
            CoverageRule::Refused
            | CoverageRule::PendingApproval
            | CoverageRule::NotYetStarted
            | CoverageRule::DatesUndefined
            | CoverageRule::UnknownStatus => Some(GapReason::CoveragePending),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            CoverageRule::Refused => "coverage bond refused",
            CoverageRule::PendingApproval => "coverage bond awaiting approval",
            CoverageRule::NotYetStarted => "coverage approved but not yet started",
            CoverageRule::Expired => "coverage expired",
            CoverageRule::Active => "coverage active",
            CoverageRule::DatesUndefined => "coverage dates not defined",
            CoverageRule::UnknownStatus => "invalid coverage status",
        }
    }
}

/// Validity verdict for one bond at one reference date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageValidation {
    pub rule: CoverageRule,
    pub is_valid: bool,
    pub reason: String,
    pub should_create_gap: bool,
    /// Present iff `should_create_gap`.
    pub gap_reason_code: Option<GapReason>,
}

impl From<CoverageRule> for CoverageValidation {
    fn from(rule: CoverageRule) -> Self {
        let gap_reason_code = rule.gap_reason();
        Self {
            rule,
            is_valid: rule.is_valid(),
            reason: rule.reason().to_string(),
            should_create_gap: gap_reason_code.is_some(),
            gap_reason_code,
        }
    }
}

/// Map a bond to its decision-table row. First match wins.
pub fn classify(bond: &CoverageBond, today: NaiveDate) -> CoverageRule {
    match bond.status {
        BondStatus::Refused => return CoverageRule::Refused,
        BondStatus::PendingApproval => return CoverageRule::PendingApproval,
        _ => {}
    }

    if bond.status == BondStatus::Approved && bond.coverage_start.is_some_and(|s| s > today) {
        return CoverageRule::NotYetStarted;
    }

    if bond.status == BondStatus::Terminated || bond.coverage_end.is_some_and(|e| e < today) {
        return CoverageRule::Expired;
    }

    match bond.status {
        BondStatus::Approved | BondStatus::InProgress => {
            match (bond.coverage_start, bond.coverage_end) {
                (Some(start), Some(end)) if start <= today && today <= end => CoverageRule::Active,
                _ => CoverageRule::DatesUndefined,
            }
        }
        BondStatus::Unknown
        | BondStatus::Refused
        | BondStatus::PendingApproval
        | BondStatus::Terminated => CoverageRule::UnknownStatus,
    }
}

/// Validate a bond's coverage at `today`.
pub fn validate(bond: &CoverageBond, today: NaiveDate) -> CoverageValidation {
    let rule = classify(bond, today);
    debug!(bond_id = %bond.id, ?rule, %today, "coverage validated");
    CoverageValidation::from(rule)
}

/// True if at least one bond currently provides coverage.
pub fn any_valid(bonds: &[CoverageBond], today: NaiveDate) -> bool {
    bonds.iter().any(|b| classify(b, today).is_valid())
}
