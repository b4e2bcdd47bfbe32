//! cvg-schemas
//!
//! Shared data model for the coverage & payment period reconciliation engine:
//! rental timeline, legacy import, insurance coverage bonds, payment periods,
//! and the request envelope the caller hands to the engine.
//!
//! Plain data only. No IO, no wall-clock. Every date is a local calendar day
//! (`NaiveDate`); every amount is fixed-point [`Micros`].
//!
//! Status-like fields are closed enums. Legacy records written by the
//! administration front-end use French wire names (`EN_COURS`, `CNAM`, ...);
//! those are accepted as serde aliases so imported rentals deserialize as-is.

mod money;
mod request;

pub use money::{Micros, MoneyParseError, MICROS_SCALE};
pub use request::{AlertContext, PatientStatus, ReconcileRequest};

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BondType {
    #[serde(alias = "CONCENTRATEUR_OXYGENE")]
    OxygenConcentrator,
    Vni,
    #[serde(alias = "MASQUE")]
    Mask,
    Cpap,
    #[serde(alias = "AUTRE")]
    Other,
}

/// Approval state of a coverage bond. Transitions are driven by the external
/// approval workflow; the engine only reads this.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BondStatus {
    #[serde(alias = "EN_ATTENTE_APPROBATION")]
    PendingApproval,
    #[serde(alias = "APPROUVE")]
    Approved,
    #[serde(alias = "EN_COURS")]
    InProgress,
    #[serde(alias = "TERMINE")]
    Terminated,
    #[serde(alias = "REFUSE")]
    Refused,
    /// Any status string this build does not know (legacy or newer records).
    /// Never treated as coverage.
    #[serde(other)]
    Unknown,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[serde(alias = "ESPECES")]
    Cash,
    Cheque,
    /// Paid directly by the national insurer.
    #[serde(alias = "CNAM")]
    Coverage,
    #[serde(alias = "VIREMENT")]
    Transfer,
    #[serde(alias = "TRAITE")]
    Draft,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Cheque => "CHEQUE",
            PaymentMethod::Coverage => "COVERAGE",
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Draft => "DRAFT",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapReason {
    #[serde(alias = "CNAM_PENDING")]
    CoveragePending,
    #[serde(alias = "CNAM_EXPIRED")]
    CoverageExpired,
    PatientPause,
    Maintenance,
    Other,
}

impl GapReason {
    /// Stable machine label; user-facing translation belongs to the caller.
    pub fn as_str(&self) -> &'static str {
        match self {
            GapReason::CoveragePending => "COVERAGE_PENDING",
            GapReason::CoverageExpired => "COVERAGE_EXPIRED",
            GapReason::PatientPause => "PATIENT_PAUSE",
            GapReason::Maintenance => "MAINTENANCE",
            GapReason::Other => "OTHER",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Rental span and pricing supplied per invocation. Never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalTimeline {
    pub effective_start_date: NaiveDate,
    /// `None` = open-ended rental.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub daily_rate: Micros,
    /// Informational; copied onto every period the engine creates.
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
}

impl RentalTimeline {
    pub fn new(effective_start_date: NaiveDate, end_date: Option<NaiveDate>, daily_rate: Micros) -> Self {
        Self {
            effective_start_date,
            end_date,
            daily_rate,
            product_ids: BTreeSet::new(),
        }
    }
}

/// A rental migrated from legacy records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingRentalImport {
    pub is_existing: bool,
    pub import_date: NaiveDate,
    #[serde(default)]
    pub has_active_coverage: bool,
    #[serde(default)]
    pub coverage_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_unpaid_amount: Micros,
}

fn default_renewal_reminder_days() -> i64 {
    30
}

fn default_covered_months() -> u32 {
    1
}

/// Insurance reimbursement authorization for part of a rental.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageBond {
    pub id: String,
    /// Insurer-side reference; empty until the bond is filed.
    #[serde(default)]
    pub bond_number: String,
    pub bond_type: BondType,
    pub status: BondStatus,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub approval_date: Option<NaiveDate>,
    #[serde(default, alias = "startDate")]
    pub coverage_start: Option<NaiveDate>,
    #[serde(default, alias = "endDate")]
    pub coverage_end: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_amount: Micros,
    #[serde(default = "default_covered_months")]
    pub covered_months: u32,
    /// Kept consistent with `monthly_amount × covered_months` by the editing
    /// screen; not enforced here.
    #[serde(default)]
    pub total_amount: Micros,
    #[serde(default = "default_renewal_reminder_days")]
    pub renewal_reminder_days: i64,
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CoverageBond {
    pub fn new(id: impl Into<String>, bond_type: BondType, status: BondStatus) -> Self {
        Self {
            id: id.into(),
            bond_number: String::new(),
            bond_type,
            status,
            submission_date: None,
            approval_date: None,
            coverage_start: None,
            coverage_end: None,
            monthly_amount: Micros::ZERO,
            covered_months: 1,
            total_amount: Micros::ZERO,
            renewal_reminder_days: default_renewal_reminder_days(),
            product_ids: BTreeSet::new(),
            notes: None,
        }
    }

    /// Human reference used in messages: the bond number when filed, the id otherwise.
    pub fn label(&self) -> &str {
        if self.bond_number.is_empty() {
            &self.id
        } else {
            &self.bond_number
        }
    }
}

// ---------------------------------------------------------------------------
// Payment periods
// ---------------------------------------------------------------------------

/// A billed span of the rental. `gap_reason` is set iff `is_gap_period`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPeriod {
    pub id: String,
    #[serde(default)]
    pub product_ids: BTreeSet<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: Micros,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub is_gap_period: bool,
    #[serde(default)]
    pub gap_reason: Option<GapReason>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentPeriod {
    /// A regular (non-gap) billing period.
    pub fn standard(
        id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        amount: Micros,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id: id.into(),
            product_ids: BTreeSet::new(),
            start_date,
            end_date,
            amount,
            payment_method,
            is_gap_period: false,
            gap_reason: None,
            notes: None,
        }
    }

    /// A patient-payable gap period (always billed in cash until edited).
    pub fn gap(
        id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        amount: Micros,
        reason: GapReason,
    ) -> Self {
        Self {
            id: id.into(),
            product_ids: BTreeSet::new(),
            start_date,
            end_date,
            amount,
            payment_method: PaymentMethod::Cash,
            is_gap_period: true,
            gap_reason: Some(reason),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_products(mut self, product_ids: BTreeSet<String>) -> Self {
        self.product_ids = product_ids;
        self
    }

    /// Calendar-day difference `end - start` (not inclusive).
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Inclusive day count `end - start + 1`.
    pub fn inclusive_days(&self) -> i64 {
        self.span_days() + 1
    }

    /// Structural identity used for deduplication: start, end, amount and gap
    /// flag. Reason, notes, method and ids are deliberately not part of it.
    pub fn identity(&self) -> (NaiveDate, NaiveDate, Micros, bool) {
        (self.start_date, self.end_date, self.amount, self.is_gap_period)
    }
}

/// Namespace for deterministic period/bond identifiers generated by the engine.
const ENGINE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b0e_4c7d_4a35_9a0b_7e0c_5d2f_c0de);

/// Deterministic identifier for an engine-created record.
///
/// Identical inputs always produce the identical id, so re-running generation
/// on the same snapshot yields byte-identical output.
pub fn derive_id(kind: &str, parts: &[&str]) -> String {
    let mut name = String::from(kind);
    for p in parts {
        name.push(':');
        name.push_str(p);
    }
    format!("{kind}-{}", Uuid::new_v5(&ENGINE_ID_NAMESPACE, name.as_bytes()))
}
