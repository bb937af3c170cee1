#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::config::Locale;
use crate::models::{Client, Installment};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    date(s).and_hms_opt(0, 0, 0).unwrap()
}

fn at_time(s: &str, h: u32, m: u32) -> NaiveDateTime {
    date(s).and_hms_opt(h, m, 0).unwrap()
}

fn plan(total: Decimal, months: u32, start: &str) -> Client {
    let mut c = Client::new(
        "Test".into(),
        "01012345678".into(),
        total,
        months,
        start.into(),
    );
    c.id = Some(1);
    c
}

fn reference_plan() -> Client {
    plan(dec!(1200), 12, "2024-01-01")
}

// ── project_end_date ──────────────────────────────────────────

#[test]
fn test_end_date_simple() {
    assert_eq!(project_end_date("2024-01-15", 12.0).to_string(), "2025-01-15");
}

#[test]
fn test_end_date_clamps_to_leap_day() {
    assert_eq!(project_end_date("2024-01-31", 1.0).to_string(), "2024-02-29");
}

#[test]
fn test_end_date_clamps_non_leap() {
    assert_eq!(project_end_date("2023-01-31", 1.0).to_string(), "2023-02-28");
    assert_eq!(project_end_date("2024-03-31", 1.0).to_string(), "2024-04-30");
}

#[test]
fn test_end_date_empty_start() {
    assert_eq!(project_end_date("", 5.0), EndDate::NotAvailable);
    assert_eq!(project_end_date("", 5.0).to_string(), "N/A");
}

#[test]
fn test_end_date_nan_months() {
    assert_eq!(project_end_date("2024-01-01", f64::NAN).to_string(), "N/A");
    assert_eq!(
        project_end_date("2024-01-01", f64::INFINITY),
        EndDate::NotAvailable
    );
}

#[test]
fn test_end_date_unparseable_start() {
    assert_eq!(project_end_date("not a date", 3.0), EndDate::NotAvailable);
    assert_eq!(project_end_date("2024-02-30", 3.0), EndDate::NotAvailable);
}

#[test]
fn test_end_date_zero_months() {
    assert_eq!(project_end_date("2024-06-10", 0.0).to_string(), "2024-06-10");
}

#[test]
fn test_end_date_fractional_months_truncate() {
    assert_eq!(project_end_date("2024-01-10", 2.9).to_string(), "2024-03-10");
}

#[test]
fn test_end_date_negative_months() {
    assert_eq!(project_end_date("2024-03-31", -1.0).to_string(), "2024-02-29");
}

#[test]
fn test_end_date_out_of_range() {
    assert_eq!(project_end_date("2024-01-01", 1e12), EndDate::NotAvailable);
    let limit = f64::from(u32::MAX);
    assert_eq!(project_end_date("2024-01-01", limit), EndDate::NotAvailable);
    assert_eq!(project_end_date("2024-01-01", -limit), EndDate::NotAvailable);
    assert_eq!(project_end_date("2024-01-01", limit + 1.0), EndDate::NotAvailable);
    assert_eq!(
        project_end_date("2024-01-01", 1200.9),
        EndDate::Date(date("2124-01-01"))
    );
}

#[test]
fn test_end_date_accepts_timestamps() {
    assert_eq!(
        project_end_date("2024-01-31T18:30:00", 1.0).to_string(),
        "2024-02-29"
    );
    assert_eq!(
        project_end_date("2024-01-31T23:30:00+02:00", 1.0).to_string(),
        "2024-02-29"
    );
}

#[test]
fn test_end_date_accessor() {
    assert_eq!(
        project_end_date("2024-01-01", 1.0).date(),
        Some(date("2024-02-01"))
    );
    assert_eq!(EndDate::NotAvailable.date(), None);
}

// ── months_elapsed ────────────────────────────────────────────

#[test]
fn test_months_elapsed_same_day() {
    assert_eq!(months_elapsed(date("2024-01-01"), date("2024-01-01")), 0);
}

#[test]
fn test_months_elapsed_within_first_month() {
    assert_eq!(months_elapsed(date("2024-01-01"), date("2024-01-15")), 0);
    assert_eq!(months_elapsed(date("2024-01-15"), date("2024-02-14")), 0);
}

#[test]
fn test_months_elapsed_full_months() {
    assert_eq!(months_elapsed(date("2024-01-15"), date("2024-02-15")), 1);
    assert_eq!(months_elapsed(date("2024-01-01"), date("2024-04-20")), 3);
    assert_eq!(months_elapsed(date("2023-11-20"), date("2025-01-19")), 13);
}

#[test]
fn test_months_elapsed_month_end_clamping() {
    assert_eq!(months_elapsed(date("2024-01-31"), date("2024-02-29")), 1);
    assert_eq!(months_elapsed(date("2024-01-31"), date("2024-02-28")), 0);
    assert_eq!(months_elapsed(date("2024-01-31"), date("2024-03-30")), 1);
    assert_eq!(months_elapsed(date("2024-01-31"), date("2024-03-31")), 2);
}

#[test]
fn test_months_elapsed_negative_before_start() {
    assert_eq!(months_elapsed(date("2024-03-15"), date("2024-03-14")), -1);
    assert_eq!(months_elapsed(date("2024-03-15"), date("2024-02-15")), -1);
    assert_eq!(months_elapsed(date("2024-03-15"), date("2024-02-14")), -2);
}

#[test]
fn test_add_months_both_directions() {
    assert_eq!(add_months(date("2024-01-31"), 1), Some(date("2024-02-29")));
    assert_eq!(add_months(date("2024-03-31"), -1), Some(date("2024-02-29")));
    assert_eq!(add_months(date("2024-05-05"), 0), Some(date("2024-05-05")));
}

// ── parse_plan_date ───────────────────────────────────────────

#[test]
fn test_parse_plan_date_variants() {
    assert_eq!(parse_plan_date("2024-05-06"), Some(date("2024-05-06")));
    assert_eq!(parse_plan_date("  2024-05-06 "), Some(date("2024-05-06")));
    assert_eq!(parse_plan_date("2024-05-06T10:11:12"), Some(date("2024-05-06")));
    assert_eq!(parse_plan_date(""), None);
    assert_eq!(parse_plan_date("06/05/2024"), None);
}

// ── classify_status ───────────────────────────────────────────

#[test]
fn test_reference_first_month() {
    let client = reference_plan();
    let now = at("2024-01-15");
    assert_eq!(classify_status(&client, dec!(50), now), Tier::Late);
    assert_eq!(classify_status(&client, dec!(100), now), Tier::Current);
    assert_eq!(classify_status(&client, dec!(1200), now), Tier::Paid);
}

#[test]
fn test_reference_fourth_month() {
    let client = reference_plan();
    let now = at("2024-04-20");
    assert_eq!(classify_status(&client, dec!(399), now), Tier::Late);
    assert_eq!(classify_status(&client, dec!(400), now), Tier::Current);
}

#[test]
fn test_exact_expected_amount_is_current() {
    let client = reference_plan();
    for (now, paid) in [
        ("2024-01-01", dec!(100)),
        ("2024-02-01", dec!(200)),
        ("2024-12-31", dec!(1200) - dec!(0.01)),
    ] {
        let expected = if now == "2024-12-31" {
            Tier::Late
        } else {
            Tier::Current
        };
        assert_eq!(classify_status(&client, paid, at(now)), expected, "{now}");
    }
    assert_eq!(
        classify_status(&client, dec!(1100), at("2024-11-30")),
        Tier::Current
    );
}

#[test]
fn test_nothing_paid_on_start_day_is_late() {
    let client = reference_plan();
    assert_eq!(
        classify_status(&client, Decimal::ZERO, at("2024-01-01")),
        Tier::Late
    );
}

#[test]
fn test_paid_ignores_dates() {
    let mut client = reference_plan();
    assert_eq!(
        classify_status(&client, dec!(1200), at("2023-01-01")),
        Tier::Paid
    );
    assert_eq!(
        classify_status(&client, dec!(1500), at("2030-01-01")),
        Tier::Paid
    );
    client.start_date = "garbage".into();
    assert_eq!(
        classify_status(&client, dec!(1200), at("2024-06-01")),
        Tier::Paid
    );
}

#[test]
fn test_before_start_is_current() {
    let client = plan(dec!(600), 6, "2024-03-15");
    assert_eq!(
        classify_status(&client, Decimal::ZERO, at("2024-03-14")),
        Tier::Current
    );
    assert_eq!(
        classify_status(&client, Decimal::ZERO, at("2023-12-01")),
        Tier::Current
    );
}

#[test]
fn test_unparseable_start_defaults_to_current() {
    let mut client = reference_plan();
    client.start_date = "31/31/2024".into();
    assert_eq!(
        classify_status(&client, Decimal::ZERO, at("2024-06-01")),
        Tier::Current
    );
    client.start_date = String::new();
    assert_eq!(
        classify_status(&client, Decimal::ZERO, at("2024-06-01")),
        Tier::Current
    );
}

#[test]
fn test_time_of_day_does_not_matter() {
    let client = plan(dec!(300), 3, "2024-02-10");
    for (h, m) in [(0, 0), (0, 1), (12, 0), (23, 59)] {
        assert_eq!(
            classify_status(&client, dec!(100), at_time("2024-03-09", h, m)),
            Tier::Current
        );
        assert_eq!(
            classify_status(&client, dec!(100), at_time("2024-03-10", h, m)),
            Tier::Late
        );
    }
}

#[test]
fn test_past_end_date_with_balance_is_late() {
    let client = reference_plan();
    assert_eq!(
        classify_status(&client, dec!(1199.99), at("2026-01-01")),
        Tier::Late
    );
}

#[test]
fn test_uneven_split_not_late_when_on_schedule() {
    let client = plan(dec!(1000), 3, "2024-01-01");
    assert_eq!(
        classify_status(&client, dec!(666.67), at("2024-02-10")),
        Tier::Current
    );
    assert_eq!(
        classify_status(&client, dec!(666.66), at("2024-02-10")),
        Tier::Late
    );
}

#[test]
fn test_zero_months_does_not_divide_by_zero() {
    let client = plan(dec!(500), 0, "2024-01-01");
    assert_eq!(
        classify_status(&client, dec!(100), at("2024-01-05")),
        Tier::Late
    );
    assert_eq!(
        classify_status(&client, dec!(500), at("2024-01-05")),
        Tier::Paid
    );
}

#[test]
fn test_classification_is_idempotent() {
    let client = reference_plan();
    let now = at_time("2024-04-20", 13, 37);
    let first = classify_status(&client, dec!(399), now);
    let second = classify_status(&client, dec!(399), now);
    assert_eq!(first, second);
}

// ── expected_amount ───────────────────────────────────────────

#[test]
fn test_expected_amount() {
    assert_eq!(expected_amount(dec!(1200), 12, 0), Some(dec!(100)));
    assert_eq!(expected_amount(dec!(1200), 12, 3), Some(dec!(400)));
    assert_eq!(expected_amount(dec!(1000), 3, 2), Some(dec!(1000)));
}

#[test]
fn test_expected_amount_overflow_is_none() {
    assert_eq!(expected_amount(Decimal::MAX, 1, 5), None);
    assert_eq!(expected_amount(dec!(1), 1, i64::MAX), None);
}

// ── Tier ──────────────────────────────────────────────────────

#[test]
fn test_tier_colors() {
    assert_eq!(Tier::Paid.color(), StatusColor::Green);
    assert_eq!(Tier::Current.color(), StatusColor::Blue);
    assert_eq!(Tier::Late.color(), StatusColor::Red);
    assert_eq!(StatusColor::Red.hsl(), "hsl(0 84.2% 60.2%)");
}

#[test]
fn test_tier_labels() {
    assert_eq!(Tier::Late.label(Locale::En), "Late");
    assert_eq!(Tier::Late.label(Locale::Ar), "متأخر");
    assert_eq!(Tier::Paid.label(Locale::Ar), "مدفوع");
    assert_eq!(format!("{}", Tier::Current), "Current");
}

#[test]
fn test_tier_parse_roundtrip() {
    for t in Tier::all() {
        assert_eq!(Tier::parse(t.as_str()), Some(*t));
        assert_eq!(Tier::parse(t.label(Locale::Ar)), Some(*t));
    }
    assert_eq!(Tier::parse("LATE"), Some(Tier::Late));
    assert_eq!(Tier::parse("on-track"), Some(Tier::Current));
    assert_eq!(Tier::parse("overdue"), None);
}

// ── Standings ─────────────────────────────────────────────────

fn payment(client_id: i64, amount: Decimal) -> Installment {
    Installment::new(client_id, amount, "2024-01-05".into())
}

#[test]
fn test_paid_by_client_sums() {
    let paid = paid_by_client(&[
        payment(1, dec!(100)),
        payment(2, dec!(40)),
        payment(1, dec!(50.25)),
    ]);
    assert_eq!(paid.get(&1), Some(&dec!(150.25)));
    assert_eq!(paid.get(&2), Some(&dec!(40)));
    assert_eq!(paid.get(&3), None);
}

#[test]
fn test_paid_sums_saturate() {
    let huge = dec!(50000000000000000000000000000);
    let installments = [payment(1, huge), payment(1, huge)];
    assert_eq!(paid_by_client(&installments).get(&1), Some(&Decimal::MAX));
    assert_eq!(total_paid(&installments), Decimal::MAX);
    assert_eq!(total_paid(&[]), Decimal::ZERO);
    assert_eq!(total_paid(&[payment(1, dec!(10)), payment(1, dec!(2.5))]), dec!(12.5));
}

#[test]
fn test_standing_with_oversized_total() {
    let client = plan(dec!(50000000000000000000000000000), 12, "2024-01-01");
    let s = ClientStanding::new(client, Decimal::ZERO, at("2024-04-20"));
    assert_eq!(s.tier, Tier::Late);
    assert_eq!(s.expected, None);
    assert_eq!(s.arrears(), Decimal::ZERO);
}

#[test]
fn test_build_standings() {
    let a = reference_plan();
    let mut b = plan(dec!(300), 3, "2024-01-01");
    b.id = Some(2);
    b.name = "B".into();
    let mut c = plan(dec!(900), 9, "2025-01-01");
    c.id = Some(3);

    let installments = vec![
        payment(1, dec!(100)),
        payment(1, dec!(100)),
        payment(2, dec!(300)),
    ];
    let rows = build_standings(&[a, b, c], &installments, at("2024-02-15"));

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].paid, dec!(200));
    assert_eq!(rows[0].remaining, dec!(1000));
    assert_eq!(rows[0].expected, Some(dec!(200)));
    assert_eq!(rows[0].tier, Tier::Current);
    assert_eq!(rows[0].end_date.to_string(), "2025-01-01");

    assert_eq!(rows[1].tier, Tier::Paid);
    assert_eq!(rows[1].remaining, Decimal::ZERO);

    assert_eq!(rows[2].paid, Decimal::ZERO);
    assert_eq!(rows[2].expected, None);
    assert_eq!(rows[2].tier, Tier::Current);
}

#[test]
fn test_standing_arrears() {
    let row = ClientStanding::new(reference_plan(), dec!(150), at("2024-03-01"));
    assert_eq!(row.tier, Tier::Late);
    assert_eq!(row.expected, Some(dec!(300)));
    assert_eq!(row.arrears(), dec!(150));

    let ahead = ClientStanding::new(reference_plan(), dec!(500), at("2024-03-01"));
    assert_eq!(ahead.arrears(), Decimal::ZERO);
}

#[test]
fn test_standing_expected_capped_at_total() {
    let row = ClientStanding::new(reference_plan(), dec!(10), at("2027-01-01"));
    assert_eq!(row.expected, Some(dec!(1200)));
    assert_eq!(row.arrears(), dec!(1190));
}

#[test]
fn test_client_without_id_has_nothing_paid() {
    let mut client = reference_plan();
    client.id = None;
    let rows = build_standings(&[client], &[payment(1, dec!(100))], at("2024-01-02"));
    assert_eq!(rows[0].paid, Decimal::ZERO);
    assert_eq!(rows[0].tier, Tier::Late);
}
