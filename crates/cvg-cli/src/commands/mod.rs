//! Command handler modules for cvg-cli.
//!
//! Shared input/config/output helpers live here. Command-specific logic lives
//! in the submodules.

pub mod reconcile;
pub mod views;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cvg_config::{report_unused_keys, EnginePolicy, UnusedKeyPolicy};
use cvg_coverage::AlertPolicy;
use cvg_finance::GapAuditPolicy;
use cvg_reconcile::SynthesisPolicy;
use cvg_schemas::ReconcileRequest;
use serde::Serialize;
use std::fs;
use std::io::Read;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Read a request document from a path, or stdin when the path is `-`.
/// `today` overrides the document's reference date.
pub fn load_request(path: &str, today: Option<NaiveDate>) -> Result<ReconcileRequest> {
    let bytes = if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("read request from stdin failed")?;
        buf
    } else {
        fs::read(path).with_context(|| format!("read input failed: {}", path))?
    };
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).context("input must be UTF-8 text")?;
    let mut req: ReconcileRequest =
        serde_json::from_str(raw.trim()).with_context(|| format!("invalid request JSON: {}", path))?;
    if let Some(t) = today {
        req.today = t;
    }
    info!(
        today = %req.today,
        bonds = req.bonds.len(),
        periods = req.periods.len(),
        "request loaded"
    );
    Ok(req)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Engine policies resolved from layered config (or defaults).
#[derive(Debug, Clone)]
pub struct Policies {
    pub config_hash: Option<String>,
    pub synthesis: SynthesisPolicy,
    pub alerts: AlertPolicy,
    pub gap_audit: GapAuditPolicy,
}

impl From<EnginePolicy> for Policies {
    fn from(p: EnginePolicy) -> Self {
        Self {
            config_hash: None,
            synthesis: SynthesisPolicy {
                open_ended_horizon_months: p.open_ended_horizon_months,
            },
            alerts: AlertPolicy {
                high_priority_within_days: p.high_priority_within_days,
                device_return_lookahead_days: p.device_return_lookahead_days,
            },
            gap_audit: GapAuditPolicy {
                days_per_month: p.days_per_month,
                copay_ratio_bps: p.copay_ratio_bps,
                correction_threshold_bps: p.correction_threshold_bps,
            },
        }
    }
}

pub fn load_policies(config_paths: &[String], strict: bool) -> Result<Policies> {
    if config_paths.is_empty() {
        return Ok(Policies::from(EnginePolicy::default()));
    }

    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = cvg_config::load_layered_yaml(&path_refs)?;

    let unused_policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, unused_policy)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "unused config key");
    }

    let engine = EnginePolicy::from_config_json(&loaded.config_json)?;
    info!(config_hash = %loaded.config_hash, "config loaded");
    Ok(Policies {
        config_hash: Some(loaded.config_hash),
        ..Policies::from(engine)
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output json failed")?;
    println!("{json}");
    Ok(())
}
