//! cvg-reconcile
//!
//! Payment period reconciliation: turns a rental span plus a set of coverage
//! bonds into the non-overlapping periods that account for every rental day,
//! and audits period sets the user has edited by hand.
//!
//! Architectural decisions:
//! - Closed-interval overlap test; touching endpoints overlap
//! - Every insertion path goes through the overlap guard, so generation can
//!   be re-run after manual edits without double-charging
//! - Existing periods are never rewritten; the synthesizer only returns
//!   periods to append
//! - Degradations (inverted ranges, overflow, rejected candidates) are
//!   reported as diagnostics, never as errors
//!
//! Deterministic, pure logic. No IO, no wall-clock.

mod analysis;
mod audit;
mod boundary;
mod dedupe;
mod engine;
mod notices;
mod overlap;
mod scanner;
mod timeline;
mod types;

pub use analysis::analyze_gaps;
pub use audit::{audit_periods, IssueKind, IssueSeverity, PeriodIssue};
pub use boundary::{bond_boundary_gaps, period_for_gap};
pub use dedupe::{dedupe, duplicate_count};
pub use engine::{
    synthesize, synthesize_with_policy, AppendPlan, PeriodOrigin, SynthesisDiagnostic,
    SynthesisPolicy, SynthesisReport,
};
pub use notices::{gap_notifications, GapNotice};
pub use overlap::{overlaps, overlaps_any};
pub use scanner::{detect_billing_gaps, scan, BillingGap, GapPosition};
pub use timeline::{build_timeline, EventKind, EventSeverity, TimelineEvent};
pub use types::{DateSpan, Gap, GapKind};
