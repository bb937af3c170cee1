use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::projection::{months_elapsed, parse_plan_date};
use crate::config::Locale;
use crate::models::Client;

/// Payment standing of a client. Exactly one applies at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Paid,
    Current,
    Late,
}

/// Presentation token attached to each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Blue,
    Red,
}

impl StatusColor {
    /// CSS color used by the web and spreadsheet exports.
    pub fn hsl(&self) -> &'static str {
        match self {
            Self::Green => "hsl(142.1 76.2% 36.3%)",
            Self::Blue => "hsl(205 90% 40%)",
            Self::Red => "hsl(0 84.2% 60.2%)",
        }
    }
}

impl Tier {
    pub fn color(&self) -> StatusColor {
        match self {
            Self::Paid => StatusColor::Green,
            Self::Current => StatusColor::Blue,
            Self::Late => StatusColor::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Current => "Current",
            Self::Late => "Late",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.as_str(),
            Locale::Ar => match self {
                Self::Paid => "مدفوع",
                Self::Current => "ساري",
                Self::Late => "متأخر",
            },
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "paid" | "مدفوع" => Some(Self::Paid),
            "current" | "on-track" | "ontrack" | "ساري" => Some(Self::Current),
            "late" | "متأخر" => Some(Self::Late),
            _ => None,
        }
    }

    pub fn all() -> &'static [Tier] {
        &[Self::Paid, Self::Current, Self::Late]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cumulative amount due by the end of the period containing month `elapsed`.
///
/// Payments are due at the start of each period, so month 0 already owes one
/// installment. Returns `None` if the amount does not fit in a `Decimal`.
pub fn expected_amount(total: Decimal, months: u32, elapsed: i64) -> Option<Decimal> {
    let periods = Decimal::from(elapsed.checked_add(1)?);
    let months = Decimal::from(months.max(1));
    total.checked_mul(periods)?.checked_div(months)
}

/// Classify a client's standing as of `now`.
///
/// Rules, first match wins:
/// 1. nothing remaining -> `Paid` (before any date logic)
/// 2. start date unparseable -> `Current`
/// 3. plan not started yet -> `Current`
/// 4. paid less than the expected amount -> `Late`
/// 5. otherwise `Current`
///
/// Both dates are compared as calendar days.
pub fn classify_status(client: &Client, paid: Decimal, now: NaiveDateTime) -> Tier {
    if client.total - paid <= Decimal::ZERO {
        return Tier::Paid;
    }

    let Some(start) = parse_plan_date(&client.start_date) else {
        return Tier::Current;
    };

    let elapsed = months_elapsed(start, now.date());
    if elapsed < 0 {
        return Tier::Current;
    }

    match expected_amount(client.total, client.months, elapsed) {
        Some(expected) if paid >= expected => Tier::Current,
        _ => Tier::Late,
    }
}
