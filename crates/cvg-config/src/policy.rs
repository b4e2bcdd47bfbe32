use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use serde_json::Value;

/// Tunables the CLI feeds into the engine crates. Every field has a default,
/// so an empty config is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnginePolicy {
    /// `synthesis.open_ended_horizon_months`
    pub open_ended_horizon_months: u32,
    /// `alerts.high_priority_within_days`
    pub high_priority_within_days: i64,
    /// `alerts.device_return_lookahead_days`
    pub device_return_lookahead_days: i64,
    /// `gap_audit.days_per_month`
    pub days_per_month: i64,
    /// `gap_audit.copay_ratio_bps`
    pub copay_ratio_bps: i64,
    /// `gap_audit.correction_threshold_bps`
    pub correction_threshold_bps: i64,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            open_ended_horizon_months: 1,
            high_priority_within_days: 7,
            device_return_lookahead_days: 30,
            days_per_month: 30,
            copay_ratio_bps: 2_000,
            correction_threshold_bps: 1_000,
        }
    }
}

/// Integer at `ptr`: a number or a numeric string. Absent or null -> `None`.
fn int_at(cfg: &Value, ptr: &str) -> Result<Option<i64>> {
    match cfg.pointer(ptr) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| anyhow!("CONFIG_TYPE {ptr}: expected an integer, got {n}")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| anyhow!("CONFIG_TYPE {ptr}: expected an integer, got {s:?}")),
        Some(other) => bail!("CONFIG_TYPE {ptr}: expected an integer, got {other}"),
    }
}

fn bounded(cfg: &Value, ptr: &str, default: i64, range: std::ops::RangeInclusive<i64>) -> Result<i64> {
    let v = int_at(cfg, ptr)?.unwrap_or(default);
    if !range.contains(&v) {
        bail!(
            "CONFIG_RANGE {ptr}: {v} out of bounds ({}..={})",
            range.start(),
            range.end()
        );
    }
    Ok(v)
}

impl EnginePolicy {
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let d = Self::default();
        let horizon = bounded(
            cfg,
            "/synthesis/open_ended_horizon_months",
            d.open_ended_horizon_months as i64,
            1..=24,
        )?;
        Ok(Self {
            open_ended_horizon_months: horizon as u32,
            high_priority_within_days: bounded(
                cfg,
                "/alerts/high_priority_within_days",
                d.high_priority_within_days,
                0..=365,
            )?,
            device_return_lookahead_days: bounded(
                cfg,
                "/alerts/device_return_lookahead_days",
                d.device_return_lookahead_days,
                0..=365,
            )?,
            days_per_month: bounded(cfg, "/gap_audit/days_per_month", d.days_per_month, 28..=31)?,
            copay_ratio_bps: bounded(cfg, "/gap_audit/copay_ratio_bps", d.copay_ratio_bps, 0..=10_000)?,
            correction_threshold_bps: bounded(
                cfg,
                "/gap_audit/correction_threshold_bps",
                d.correction_threshold_bps,
                0..=10_000,
            )?,
        })
    }
}
