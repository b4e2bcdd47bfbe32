//! Renewal & alert analysis.
//!
//! Bond alerts fire when a coverage end date is strictly in the future and
//! within the bond's own `renewal_reminder_days`. Rental-level alerts
//! (device return, hospitalized patient follow-up) are independent of
//! coverage validity and use a fixed look-ahead window from [`AlertPolicy`].

use chrono::NaiveDate;
use cvg_schemas::{AlertContext, CoverageBond, PatientStatus, RentalTimeline, Severity};
use serde::Serialize;

/// Thresholds shared by every alert kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlertPolicy {
    /// Alerts due within this many days are `HIGH`, later ones `MEDIUM`.
    pub high_priority_within_days: i64,
    /// Look-ahead window for the device-return reminder.
    pub device_return_lookahead_days: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            high_priority_within_days: 7,
            device_return_lookahead_days: 30,
        }
    }
}

impl AlertPolicy {
    pub fn priority_for(&self, days_until: i64) -> Severity {
        if days_until <= self.high_priority_within_days {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertAction {
    RenewCoverage,
    PrepareReturn,
    PatientFollowUp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalAlert {
    pub days_until_expiry: i64,
    pub message: String,
    pub priority: Severity,
    pub action: AlertAction,
    /// Set for bond alerts only.
    pub bond_ref: Option<String>,
}

/// Calendar days from `today` to `date` (negative when `date` is past).
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

fn bond_alert(policy: &AlertPolicy, bond: &CoverageBond, today: NaiveDate) -> Option<RenewalAlert> {
    let end = bond.coverage_end?;
    let days = days_until(end, today);
    if days <= 0 || days > bond.renewal_reminder_days {
        return None;
    }
    Some(RenewalAlert {
        days_until_expiry: days,
        message: format!("renew coverage bond {} (expires in {days} days)", bond.label()),
        priority: policy.priority_for(days),
        action: AlertAction::RenewCoverage,
        bond_ref: Some(bond.id.clone()),
    })
}

/// Upcoming bond-expiry alerts with the default policy, soonest first.
pub fn alerts(bonds: &[CoverageBond], today: NaiveDate) -> Vec<RenewalAlert> {
    let policy = AlertPolicy::default();
    let mut out: Vec<RenewalAlert> = bonds
        .iter()
        .filter_map(|b| bond_alert(&policy, b, today))
        .collect();
    // Stable: equal days keep bond order.
    out.sort_by_key(|a| a.days_until_expiry);
    out
}

/// Bond alerts plus rental-level reminders, soonest first.
pub fn alerts_with_context(
    policy: &AlertPolicy,
    bonds: &[CoverageBond],
    timeline: &RentalTimeline,
    ctx: &AlertContext,
    today: NaiveDate,
) -> Vec<RenewalAlert> {
    let mut out: Vec<RenewalAlert> = bonds
        .iter()
        .filter_map(|b| bond_alert(policy, b, today))
        .collect();

    // Open-ended rentals have no return date to prepare for.
    if let Some(end) = timeline.end_date {
        let days = days_until(end, today);
        if days > 0 && days <= policy.device_return_lookahead_days {
            out.push(RenewalAlert {
                days_until_expiry: days,
                message: format!("prepare device return (rental ends in {days} days)"),
                priority: policy.priority_for(days),
                action: AlertAction::PrepareReturn,
                bond_ref: None,
            });
        }
    }

    if ctx.patient_status == PatientStatus::Hospitalized {
        out.push(RenewalAlert {
            days_until_expiry: 0,
            message: "follow up on hospitalized patient".to_string(),
            priority: Severity::High,
            action: AlertAction::PatientFollowUp,
            bond_ref: None,
        });
    }

    out.sort_by_key(|a| a.days_until_expiry);
    out
}
