//! Gap synthesizer.
//!
//! Produces the payment periods missing from a rental, in three passes:
//!
//! 1. Legacy seeding: a one-day gap period for the unpaid balance at the
//!    effective start, and, when the legacy coverage is still active, a
//!    COVERAGE_EXPIRED gap from the day after it expires to rental end.
//! 2. One gap period per bond that is not currently valid, spanning the
//!    bond's coverage window (falling back to the rental span).
//! 3. If neither a bond nor the legacy coverage is valid, one standard period
//!    over the whole rental span.
//!
//! Each candidate is appended only if it overlaps neither the caller's
//! existing periods nor anything appended earlier in the same pass. That is
//! what makes re-running generation after manual edits safe: a second run over
//! the merged result appends nothing.

use chrono::{Days, Months, NaiveDate};
use cvg_coverage::{any_valid, validate, CoverageValidation};
use cvg_schemas::{
    derive_id, CoverageBond, ExistingRentalImport, GapReason, Micros, PaymentMethod,
    PaymentPeriod, RentalTimeline,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{dedupe, overlaps_any, DateSpan};

// ---------------------------------------------------------------------------
// Policy / report types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynthesisPolicy {
    /// Horizon used when the rental has no end date. The caller re-invokes
    /// generation as time advances.
    pub open_ended_horizon_months: u32,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            open_ended_horizon_months: 1,
        }
    }
}

/// Which pass proposed a candidate period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum PeriodOrigin {
    UnpaidBalance,
    ImportedCoverageExpiry,
    BondGap {
        #[serde(rename = "bondId")]
        bond_id: String,
    },
    Standard,
    PreBond {
        #[serde(rename = "bondId")]
        bond_id: String,
    },
    PostBond {
        #[serde(rename = "bondId")]
        bond_id: String,
    },
    DisplayedGap,
}

/// Why a candidate was not appended. Informational; the output is the same
/// with or without them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(
    tag = "kind",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum SynthesisDiagnostic {
    /// Bond window has `end <= start` (usually a data-entry error). Skipped.
    EmptyBondRange {
        bond_id: String,
        start: NaiveDate,
        end: NaiveDate,
        days: i64,
    },
    /// Rental span ends before it starts (e.g. import date after rental end).
    EmptyRentalSpan { start: NaiveDate, end: NaiveDate },
    /// Candidate already covered by an existing or freshly added period.
    OverlapRejected {
        origin: PeriodOrigin,
        span: DateSpan,
    },
    /// `daily_rate × days` does not fit the fixed-point range.
    AmountOverflow { origin: PeriodOrigin, days: i64 },
    /// Displayed gap carries no dates to bill.
    UndatedGap { title: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisReport {
    pub effective_start: NaiveDate,
    pub rental_end: NaiveDate,
    pub any_valid_bond: bool,
    /// Legacy coverage from an import is active and suppresses the standard
    /// period.
    pub imported_coverage: bool,
    /// Periods to append, deduplicated, in generation order.
    pub periods: Vec<PaymentPeriod>,
    pub diagnostics: Vec<SynthesisDiagnostic>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Periods to append for this rental, with the default policy.
///
/// The caller merges the result into its own list (and may dedupe it).
pub fn synthesize(
    bonds: &[CoverageBond],
    timeline: &RentalTimeline,
    import: Option<&ExistingRentalImport>,
    existing: &[PaymentPeriod],
    today: NaiveDate,
) -> Vec<PaymentPeriod> {
    synthesize_with_policy(&SynthesisPolicy::default(), bonds, timeline, import, existing, today)
        .periods
}

/// Full synthesis run with diagnostics.
pub fn synthesize_with_policy(
    policy: &SynthesisPolicy,
    bonds: &[CoverageBond],
    timeline: &RentalTimeline,
    import: Option<&ExistingRentalImport>,
    existing: &[PaymentPeriod],
    today: NaiveDate,
) -> SynthesisReport {
    let import = import.filter(|i| i.is_existing);
    let effective_start = import.map_or(timeline.effective_start_date, |i| i.import_date);
    let rental_end = timeline.end_date.unwrap_or_else(|| {
        effective_start
            .checked_add_months(Months::new(policy.open_ended_horizon_months))
            .unwrap_or(effective_start)
    });

    let mut pass = Pass::new(timeline, existing);

    // 1) Legacy unpaid balance.
    if let Some(imp) = import.filter(|i| i.current_unpaid_amount.is_positive()) {
        if let Some(next_day) = effective_start.checked_add_days(Days::new(1)) {
            let span = DateSpan::new(effective_start, next_day);
            // Checked against existing periods only; nothing was added yet.
            pass.push(
                PeriodOrigin::UnpaidBalance,
                span,
                PaymentPeriod::gap(
                    derive_id("unpaid", &[&effective_start.to_string()]),
                    span.start,
                    span.end,
                    imp.current_unpaid_amount,
                    GapReason::Other,
                )
                .with_notes("existing unpaid balance to settle"),
            );
        }
    }

    // Legacy coverage still running: bill only what follows its expiry.
    let imported_expiry = import
        .filter(|i| i.has_active_coverage)
        .and_then(|i| i.coverage_expiration_date);
    if let Some(expiry) = imported_expiry {
        pass.imported_coverage_expiry(expiry, rental_end);
    }

    // 2) One gap per invalid bond.
    for bond in bonds {
        let validation = validate(bond, today);
        if validation.should_create_gap {
            pass.bond_gap(bond, &validation, effective_start, rental_end);
        }
    }

    // 3) No valid coverage at all: bill the whole span.
    let any_valid_bond = any_valid(bonds, today);
    let imported_coverage = imported_expiry.is_some();
    if !any_valid_bond && !imported_coverage {
        pass.standard(effective_start, rental_end);
    }

    let plan = pass.finish();
    debug!(
        appended = plan.periods.len(),
        diagnostics = plan.diagnostics.len(),
        any_valid_bond,
        imported_coverage,
        %effective_start,
        %rental_end,
        "synthesis finished"
    );

    SynthesisReport {
        effective_start,
        rental_end,
        any_valid_bond,
        imported_coverage,
        periods: plan.periods,
        diagnostics: plan.diagnostics,
    }
}

// ---------------------------------------------------------------------------
// Pass state
// ---------------------------------------------------------------------------

/// Periods to append plus the reasons any candidate was dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendPlan {
    /// Deduplicated, in generation order.
    pub periods: Vec<PaymentPeriod>,
    pub diagnostics: Vec<SynthesisDiagnostic>,
}

pub(crate) struct Pass<'a> {
    timeline: &'a RentalTimeline,
    existing: &'a [PaymentPeriod],
    added: Vec<PaymentPeriod>,
    diagnostics: Vec<SynthesisDiagnostic>,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(timeline: &'a RentalTimeline, existing: &'a [PaymentPeriod]) -> Self {
        Self {
            timeline,
            existing,
            added: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> AppendPlan {
        AppendPlan {
            periods: dedupe(&self.added),
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn diagnose(&mut self, diagnostic: SynthesisDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append `period` unless its span overlaps anything known so far.
    pub(crate) fn push(&mut self, origin: PeriodOrigin, span: DateSpan, period: PaymentPeriod) {
        if overlaps_any(span, self.existing.iter().chain(self.added.iter())) {
            debug!(?origin, start = %span.start, end = %span.end, "candidate overlaps, skipped");
            self.diagnostics
                .push(SynthesisDiagnostic::OverlapRejected { origin, span });
            return;
        }
        self.added
            .push(period.with_products(self.timeline.product_ids.clone()));
    }

    pub(crate) fn amount_for(&mut self, origin: &PeriodOrigin, days: i64) -> Option<Micros> {
        let amount = self.timeline.daily_rate.checked_mul_days(days);
        if amount.is_none() {
            warn!(?origin, days, "period amount overflows, skipped");
            self.diagnostics.push(SynthesisDiagnostic::AmountOverflow {
                origin: origin.clone(),
                days,
            });
        }
        amount
    }

    fn bond_gap(
        &mut self,
        bond: &CoverageBond,
        validation: &CoverageValidation,
        effective_start: NaiveDate,
        rental_end: NaiveDate,
    ) {
        let span = DateSpan::new(
            bond.coverage_start.unwrap_or(effective_start),
            bond.coverage_end.unwrap_or(rental_end),
        );
        let days = span.days();
        if days <= 0 {
            warn!(
                bond_id = %bond.id,
                start = %span.start,
                end = %span.end,
                days,
                "bond coverage window is empty or inverted, no gap generated"
            );
            self.diagnostics.push(SynthesisDiagnostic::EmptyBondRange {
                bond_id: bond.id.clone(),
                start: span.start,
                end: span.end,
                days,
            });
            return;
        }

        let origin = PeriodOrigin::BondGap {
            bond_id: bond.id.clone(),
        };
        let Some(amount) = self.amount_for(&origin, days) else {
            return;
        };
        let reason = validation
            .gap_reason_code
            .unwrap_or(GapReason::CoveragePending);
        let period = PaymentPeriod::gap(
            derive_id(
                "coverage-gap",
                &[&bond.id, &span.start.to_string(), &span.end.to_string()],
            ),
            span.start,
            span.end,
            amount,
            reason,
        )
        .with_notes(format!("coverage gap: {}", validation.reason));
        self.push(origin, span, period);
    }

    /// `[expiry + 1, rental_end]`, priced at `rental_end - expiry` days.
    fn imported_coverage_expiry(&mut self, expiry: NaiveDate, rental_end: NaiveDate) {
        if expiry >= rental_end {
            debug!(%expiry, %rental_end, "imported coverage runs past rental end");
            return;
        }
        let Some(start) = expiry.succ_opt() else {
            return;
        };
        let origin = PeriodOrigin::ImportedCoverageExpiry;
        let Some(amount) = self.amount_for(&origin, (rental_end - expiry).num_days()) else {
            return;
        };
        let period = PaymentPeriod::gap(
            derive_id("imported-expiry", &[&start.to_string(), &rental_end.to_string()]),
            start,
            rental_end,
            amount,
            GapReason::CoverageExpired,
        )
        .with_notes("period after imported coverage expiry");
        self.push(origin, DateSpan::new(start, rental_end), period);
    }

    fn standard(&mut self, effective_start: NaiveDate, rental_end: NaiveDate) {
        let span = DateSpan::new(effective_start, rental_end);
        let days = span.days();
        if days < 0 {
            warn!(start = %span.start, end = %span.end, "rental span is inverted, no standard period generated");
            self.diagnostics.push(SynthesisDiagnostic::EmptyRentalSpan {
                start: span.start,
                end: span.end,
            });
            return;
        }

        let origin = PeriodOrigin::Standard;
        let Some(amount) = self.amount_for(&origin, days) else {
            return;
        };
        let period = PaymentPeriod::standard(
            derive_id(
                "standard",
                &[&span.start.to_string(), &span.end.to_string()],
            ),
            span.start,
            span.end,
            amount,
            PaymentMethod::Cash,
        )
        .with_notes("standard rental period");
        self.push(origin, span, period);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
