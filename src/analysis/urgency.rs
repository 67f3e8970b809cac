//! Urgency tiering from deadline proximity, amount and document kind.

use chrono::NaiveDate;

use crate::models::{ExtractedFields, UrgencyLevel};

pub const CRITICAL_WITHIN_DAYS: i64 = 7;
pub const HIGH_WITHIN_DAYS: i64 = 14;
pub const MEDIUM_WITHIN_DAYS: i64 = 30;

/// Settlement demands above this are high urgency absent a deadline.
pub const HIGH_AMOUNT_THRESHOLD: f64 = 10_000.0;

/// Urgency tier for a deadline `deadline` seen on `today`.
///
/// Past deadlines are critical.
pub fn deadline_urgency(deadline: NaiveDate, today: NaiveDate) -> UrgencyLevel {
    let days = (deadline - today).num_days();
    if days <= CRITICAL_WITHIN_DAYS {
        UrgencyLevel::Critical
    } else if days <= HIGH_WITHIN_DAYS {
        UrgencyLevel::High
    } else if days <= MEDIUM_WITHIN_DAYS {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

/// Classify urgency. A deadline decides outright; otherwise a large
/// settlement amount means high, any legal document medium, else low.
pub fn classify_urgency(fields: &ExtractedFields, is_legal: bool, today: NaiveDate) -> UrgencyLevel {
    if let Some(deadline) = &fields.response_deadline {
        return deadline_urgency(deadline.value, today);
    }
    if fields
        .settlement_amount
        .as_ref()
        .is_some_and(|a| a.value > HIGH_AMOUNT_THRESHOLD)
    {
        return UrgencyLevel::High;
    }
    if is_legal {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}
