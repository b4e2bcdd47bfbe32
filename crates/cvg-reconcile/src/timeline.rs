use chrono::NaiveDate;
use cvg_coverage::days_until;
use cvg_schemas::{CoverageBond, Micros, PaymentPeriod, RentalTimeline};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    RentalStart,
    BondSubmitted,
    BondApproved,
    BondExpiry,
    Gap,
    Payment,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub description: String,
    pub severity: EventSeverity,
    /// Bond or period the event came from.
    pub related_id: Option<String>,
    pub amount: Option<Micros>,
}

impl TimelineEvent {
    fn new(date: NaiveDate, kind: EventKind, severity: EventSeverity, description: String) -> Self {
        Self {
            date,
            kind,
            description,
            severity,
            related_id: None,
            amount: None,
        }
    }

    fn related(mut self, id: &str) -> Self {
        self.related_id = Some(id.to_string());
        self
    }
}

/// Chronological history of a rental for display.
///
/// Bond expiry only appears once it is inside the bond's reminder window
/// (or already past). Events on the same date keep insertion order: rental
/// start, then bonds in input order, then periods in input order.
pub fn build_timeline(
    timeline: &RentalTimeline,
    bonds: &[CoverageBond],
    periods: &[PaymentPeriod],
    today: NaiveDate,
) -> Vec<TimelineEvent> {
    let mut events = vec![TimelineEvent::new(
        timeline.effective_start_date,
        EventKind::RentalStart,
        EventSeverity::Info,
        "rental started".to_string(),
    )];

    for bond in bonds {
        if let Some(date) = bond.submission_date {
            events.push(
                TimelineEvent::new(
                    date,
                    EventKind::BondSubmitted,
                    EventSeverity::Info,
                    format!("bond {} submitted", bond.label()),
                )
                .related(&bond.id),
            );
        }
        if let Some(date) = bond.approval_date {
            events.push(
                TimelineEvent::new(
                    date,
                    EventKind::BondApproved,
                    EventSeverity::Info,
                    format!("bond {} approved", bond.label()),
                )
                .related(&bond.id),
            );
        }
        if let Some(end) = bond.coverage_end {
            let days = days_until(end, today);
            if days <= bond.renewal_reminder_days {
                let severity = if days <= 0 {
                    EventSeverity::Error
                } else {
                    EventSeverity::Warning
                };
                events.push(
                    TimelineEvent::new(
                        end,
                        EventKind::BondExpiry,
                        severity,
                        format!("bond {} expires", bond.label()),
                    )
                    .related(&bond.id),
                );
            }
        }
    }

    for p in periods {
        let event = if p.is_gap_period {
            let reason = p.gap_reason.map_or("UNSPECIFIED", |r| r.as_str());
            TimelineEvent::new(p.start_date, EventKind::Gap, EventSeverity::Warning, format!("gap: {reason}"))
        } else {
            TimelineEvent::new(
                p.start_date,
                EventKind::Payment,
                EventSeverity::Info,
                format!("payment {} {}", p.payment_method.as_str(), p.amount.round_to_cents()),
            )
        };
        let mut event = event.related(&p.id);
        event.amount = Some(p.amount);
        events.push(event);
    }

    events.sort_by_key(|e| e.date);
    events
}
