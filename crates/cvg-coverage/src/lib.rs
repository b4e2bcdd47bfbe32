//! cvg-coverage
//!
//! Bond-side logic of the reconciliation engine.
//!
//! Architectural decisions:
//! - Validity is a pure function of (bond, today); `today` is always supplied
//!   by the caller, never read from the clock
//! - The validity decision table is a closed enum ([`CoverageRule`]); every
//!   bond maps to exactly one rule
//! - Unknown or incomplete data never counts as coverage
//! - Renewal alerts use each bond's own reminder threshold
//!
//! Deterministic, pure logic. No IO.

mod alerts;
mod renewal;
mod validator;

pub use alerts::{alerts, alerts_with_context, days_until, AlertAction, AlertPolicy, RenewalAlert};
pub use renewal::draft_renewal;
pub use validator::{any_valid, classify, validate, CoverageRule, CoverageValidation};
