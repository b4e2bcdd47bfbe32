use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CoverageBond, ExistingRentalImport, Micros, PaymentPeriod, RentalTimeline};

/// Patient state as tracked by the administration side.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    #[default]
    Active,
    Hospitalized,
    Deceased,
    Paused,
}

/// Rental facts used by the non-bond alerts and the comprehensive gap view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertContext {
    #[serde(default)]
    pub patient_status: PatientStatus,
    /// Rental started before insurer approval (urgent installation).
    #[serde(default)]
    pub urgent_rental: bool,
}

/// Everything one engine invocation needs, as supplied by the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// Reference date for every validity and alert decision.
    pub today: NaiveDate,
    pub timeline: RentalTimeline,
    #[serde(default, rename = "existingRentalImport")]
    pub import: Option<ExistingRentalImport>,
    #[serde(default)]
    pub bonds: Vec<CoverageBond>,
    #[serde(default)]
    pub periods: Vec<PaymentPeriod>,
    #[serde(default)]
    pub deposit_amount: Micros,
    #[serde(default)]
    pub alert_context: AlertContext,
}
