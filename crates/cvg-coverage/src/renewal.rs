use chrono::NaiveDate;
use cvg_schemas::{derive_id, BondStatus, CoverageBond};

/// Draft a renewal for `bond_id`: same type, products and amounts, filed
/// today, awaiting approval, with no coverage window yet.
///
/// Returns `None` if no bond has that id. The caller decides whether to keep
/// the draft; nothing is appended here.
pub fn draft_renewal(
    bonds: &[CoverageBond],
    bond_id: &str,
    today: NaiveDate,
) -> Option<CoverageBond> {
    let source = bonds.iter().find(|b| b.id == bond_id)?;
    let today_s = today.to_string();
    Some(CoverageBond {
        id: derive_id("bond-renewal", &[&source.id, &today_s]),
        bond_number: String::new(),
        bond_type: source.bond_type,
        status: BondStatus::PendingApproval,
        submission_date: Some(today),
        approval_date: None,
        coverage_start: None,
        coverage_end: None,
        monthly_amount: source.monthly_amount,
        covered_months: source.covered_months,
        total_amount: source.total_amount,
        renewal_reminder_days: source.renewal_reminder_days,
        product_ids: source.product_ids.clone(),
        notes: Some(format!("renewal of bond {}", source.label())),
    })
}
