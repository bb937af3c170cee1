use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::projection::{months_elapsed, parse_plan_date, EndDate};
use super::status::{classify_status, expected_amount, Tier};
use crate::models::{Client, Installment};

/// Sum of installment amounts per client, computed once per refresh.
/// Sums saturate at `Decimal::MAX`.
pub fn paid_by_client(installments: &[Installment]) -> HashMap<i64, Decimal> {
    let mut totals: HashMap<i64, Decimal> = HashMap::new();
    for inst in installments {
        let paid = totals.entry(inst.client_id).or_default();
        *paid = paid.saturating_add(inst.amount);
    }
    totals
}

/// Everything a row of the client table needs, derived for a fixed `now`.
#[derive(Debug, Clone)]
pub struct ClientStanding {
    pub client: Client,
    pub paid: Decimal,
    pub remaining: Decimal,
    /// Amount due so far. `None` before the plan starts or when the start date is unusable.
    pub expected: Option<Decimal>,
    pub end_date: EndDate,
    pub tier: Tier,
}

impl ClientStanding {
    pub fn new(client: Client, paid: Decimal, now: NaiveDateTime) -> Self {
        let tier = classify_status(&client, paid, now);
        let expected = parse_plan_date(&client.start_date)
            .map(|start| months_elapsed(start, now.date()))
            .filter(|elapsed| *elapsed >= 0)
            .and_then(|elapsed| expected_amount(client.total, client.months, elapsed))
            .map(|amount| amount.min(client.total));
        Self {
            remaining: client.total.saturating_sub(paid),
            end_date: client.end_date(),
            paid,
            expected,
            tier,
            client,
        }
    }

    /// Amount behind schedule; zero when up to date.
    pub fn arrears(&self) -> Decimal {
        self.expected
            .map(|e| e.saturating_sub(self.paid).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Saturating total of a client's payments.
pub fn total_paid(installments: &[Installment]) -> Decimal {
    installments
        .iter()
        .fold(Decimal::ZERO, |acc, inst| acc.saturating_add(inst.amount))
}

/// Standings for every client, preserving input order.
pub fn build_standings(
    clients: &[Client],
    installments: &[Installment],
    now: NaiveDateTime,
) -> Vec<ClientStanding> {
    let paid = paid_by_client(installments);
    clients
        .iter()
        .map(|c| {
            let amount = c
                .id
                .and_then(|id| paid.get(&id).copied())
                .unwrap_or(Decimal::ZERO);
            ClientStanding::new(c.clone(), amount, now)
        })
        .collect()
}
