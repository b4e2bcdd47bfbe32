//! cvg-testkit
//!
//! Fixture builders and loaders shared by scenario tests.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use cvg_schemas::{
    derive_id, BondStatus, BondType, CoverageBond, GapReason, Micros, PaymentMethod,
    PaymentPeriod, ReconcileRequest, RentalTimeline,
};
use serde::Deserialize;
use std::fs;

/// Panics on an invalid calendar date; fixtures only.
pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("invalid fixture date {y}-{m}-{d}"))
}

pub fn units(n: i64) -> Micros {
    Micros::from_units(n)
}

pub fn timeline(start: NaiveDate, end: Option<NaiveDate>, daily_rate: i64) -> RentalTimeline {
    RentalTimeline::new(start, end, units(daily_rate))
}

/// Cash billing period with a deterministic id.
pub fn period(start: NaiveDate, end: NaiveDate, amount: i64) -> PaymentPeriod {
    PaymentPeriod::standard(
        derive_id("fixture", &[&start.to_string(), &end.to_string()]),
        start,
        end,
        units(amount),
        PaymentMethod::Cash,
    )
}

pub fn gap_period(start: NaiveDate, end: NaiveDate, amount: i64, reason: GapReason) -> PaymentPeriod {
    PaymentPeriod::gap(
        derive_id("fixture-gap", &[&start.to_string(), &end.to_string()]),
        start,
        end,
        units(amount),
        reason,
    )
}

// ---------------------------------------------------------------------------
// Bond builder
// ---------------------------------------------------------------------------

pub struct BondBuilder {
    bond: CoverageBond,
}

pub fn bond(id: &str, status: BondStatus) -> BondBuilder {
    BondBuilder {
        bond: CoverageBond::new(id, BondType::OxygenConcentrator, status),
    }
}

impl BondBuilder {
    pub fn number(mut self, n: &str) -> Self {
        self.bond.bond_number = n.to_string();
        self
    }

    pub fn covering(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.bond.coverage_start = Some(start);
        self.bond.coverage_end = Some(end);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.bond.coverage_end = Some(end);
        self
    }

    pub fn submitted(mut self, d: NaiveDate) -> Self {
        self.bond.submission_date = Some(d);
        self
    }

    pub fn approved(mut self, d: NaiveDate) -> Self {
        self.bond.approval_date = Some(d);
        self
    }

    pub fn reminder_days(mut self, days: i64) -> Self {
        self.bond.renewal_reminder_days = days;
        self
    }

    pub fn monthly(mut self, amount: i64) -> Self {
        self.bond.monthly_amount = units(amount);
        self
    }

    pub fn build(self) -> CoverageBond {
        self.bond
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

pub fn load_request_json(path: &str) -> Result<ReconcileRequest> {
    let s = fs::read_to_string(path).with_context(|| format!("read request: {path}"))?;
    let req: ReconcileRequest = serde_json::from_str(&s).context("parse request json")?;
    Ok(req)
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    amount: Micros,
    payment_method: PaymentMethod,
    is_gap_period: bool,
    gap_reason: Option<GapReason>,
    notes: Option<String>,
}

/// Periods from a CSV with header
/// `id,start_date,end_date,amount,payment_method,is_gap_period,gap_reason,notes`.
pub fn load_periods_csv(path: &str) -> Result<Vec<PaymentPeriod>> {
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open periods csv: {path}"))?;
    let mut out = Vec::new();

    for (i, row) in rdr.deserialize::<PeriodRow>().enumerate() {
        let row = row.with_context(|| format!("parse periods csv row {}", i + 1))?;
        if row.is_gap_period != row.gap_reason.is_some() {
            bail!("periods csv row {}: gap_reason must be set iff is_gap_period", i + 1);
        }
        out.push(PaymentPeriod {
            id: row.id,
            product_ids: Default::default(),
            start_date: row.start_date,
            end_date: row.end_date,
            amount: row.amount,
            payment_method: row.payment_method,
            is_gap_period: row.is_gap_period,
            gap_reason: row.gap_reason,
            notes: row.notes,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builder_sets_fields() {
        let b = bond("b1", BondStatus::InProgress)
            .number("CNAM-001")
            .covering(ymd(2024, 1, 1), ymd(2024, 3, 31))
            .reminder_days(15)
            .monthly(150)
            .build();
        assert_eq!(b.label(), "CNAM-001");
        assert_eq!(b.coverage_end, Some(ymd(2024, 3, 31)));
        assert_eq!(b.renewal_reminder_days, 15);
        assert_eq!(b.monthly_amount, units(150));
    }

    #[test]
    fn csv_rows_become_periods() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "id,start_date,end_date,amount,payment_method,is_gap_period,gap_reason,notes").unwrap();
        writeln!(f, "p1,2024-01-01,2024-01-31,300,COVERAGE,false,,").unwrap();
        writeln!(f, "p2,2024-02-01,2024-02-10,12.5,CASH,true,CNAM_PENDING,legacy").unwrap();
        let periods = load_periods_csv(f.path().to_str().unwrap()).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].payment_method, PaymentMethod::Coverage);
        assert_eq!(periods[0].notes, None);
        assert_eq!(periods[1].gap_reason, Some(GapReason::CoveragePending));
        assert_eq!(periods[1].amount, Micros::new(12_500_000));
    }

    #[test]
    fn csv_gap_flag_mismatch_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "id,start_date,end_date,amount,payment_method,is_gap_period,gap_reason,notes").unwrap();
        writeln!(f, "p1,2024-01-01,2024-01-31,300,CASH,true,,").unwrap();
        assert!(load_periods_csv(f.path().to_str().unwrap()).is_err());
    }
}
