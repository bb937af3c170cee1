//! Plan projection and payment-standing classification.
//!
//! Everything here is pure: callers pass the current instant in, and the same
//! inputs always give the same answer.

mod projection;
mod standing;
mod status;

pub use projection::{
    add_months, months_elapsed, parse_plan_date, project_end_date, EndDate, NOT_AVAILABLE,
};
pub use standing::{build_standings, paid_by_client, total_paid, ClientStanding};
pub use status::{classify_status, expected_amount, StatusColor, Tier};

#[cfg(test)]
mod tests;
