#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn make_client(name: &str, phone: &str) -> Client {
    Client::new(
        name.into(),
        phone.into(),
        dec!(1200),
        12,
        "2024-01-01".into(),
    )
}

fn setup_test_data(db: &mut Database) -> (i64, i64) {
    let a = db
        .insert_client(&make_client("Samir Fathy", "01012345678"))
        .unwrap();
    let b = db
        .insert_client(&make_client("Amal Hassan", "01198765432"))
        .unwrap();

    for (client_id, amount, date) in [
        (a, dec!(100), "2024-01-05"),
        (a, dec!(100), "2024-02-05"),
        (b, dec!(300.50), "2024-01-20"),
    ] {
        db.insert_installment(&Installment::new(client_id, amount, date.into()))
            .unwrap();
    }
    (a, b)
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_schema_version_set() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_double_migrate_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let rows: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_open_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_client(&make_client("Persisted", "01012345678"))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_client_count().unwrap(), 1);
}

// ── Client CRUD ───────────────────────────────────────────────

#[test]
fn test_client_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_client(&make_client("Nour", "01012345678"))
        .unwrap();

    let fetched = db.get_client_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.name, "Nour");
    assert_eq!(fetched.total, dec!(1200));
    assert_eq!(fetched.months, 12);
    assert_eq!(fetched.start_date, "2024-01-01");

    let mut edited = fetched.clone();
    edited.name = "Nour Ali".into();
    edited.total = dec!(1500.75);
    edited.months = 15;
    assert!(db.update_client(&edited).unwrap());

    let again = db.get_client_by_id(id).unwrap().unwrap();
    assert_eq!(again.name, "Nour Ali");
    assert_eq!(again.total, dec!(1500.75));
    assert_eq!(again.months, 15);
    assert_eq!(again.created_at, fetched.created_at);
}

#[test]
fn test_client_by_id_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_client_by_id(99999).unwrap().is_none());
}

#[test]
fn test_update_client_without_id_fails() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.update_client(&make_client("X", "01012345678")).is_err());
}

#[test]
fn test_update_missing_client_returns_false() {
    let db = Database::open_in_memory().unwrap();
    let mut ghost = make_client("Ghost", "01012345678");
    ghost.id = Some(42);
    assert!(!db.update_client(&ghost).unwrap());
}

#[test]
fn test_zero_months_rejected_by_schema() {
    let db = Database::open_in_memory().unwrap();
    let mut client = make_client("Bad", "01012345678");
    client.months = 0;
    assert!(db.insert_client(&client).is_err());
}

#[test]
fn test_clients_sorted_by_name() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    db.insert_client(&make_client("basma", "01212345678"))
        .unwrap();

    let names: Vec<String> = db
        .get_clients(None)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Amal Hassan", "basma", "Samir Fathy"]);
}

#[test]
fn test_client_search_by_name_and_phone() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);

    let by_name = db.get_clients(Some("samir")).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Samir Fathy");

    let by_phone = db.get_clients(Some("98765")).unwrap();
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].name, "Amal Hassan");

    assert!(db.get_clients(Some("nobody")).unwrap().is_empty());
    assert_eq!(db.get_clients(Some("   ")).unwrap().len(), 2);
}

#[test]
fn test_client_count() {
    let mut db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_client_count().unwrap(), 0);
    setup_test_data(&mut db);
    assert_eq!(db.get_client_count().unwrap(), 2);
}

#[test]
fn test_batch_insert() {
    let mut db = Database::open_in_memory().unwrap();
    let clients = vec![
        make_client("One", "01012345678"),
        make_client("Two", "01112345678"),
        make_client("Three", "01212345678"),
    ];
    assert_eq!(db.insert_clients_batch(&clients).unwrap(), 3);
    assert_eq!(db.get_client_count().unwrap(), 3);
}

#[test]
fn test_batch_insert_is_atomic() {
    let mut db = Database::open_in_memory().unwrap();
    let mut bad = make_client("Bad", "01012345678");
    bad.months = 0;
    let clients = vec![make_client("Good", "01012345678"), bad];
    assert!(db.insert_clients_batch(&clients).is_err());
    assert_eq!(db.get_client_count().unwrap(), 0);
}

#[test]
fn test_corrupt_total_is_an_error() {
    let mut db = Database::open_in_memory().unwrap();
    let (a, _) = setup_test_data(&mut db);
    db.conn
        .execute("UPDATE clients SET total = 'n/a' WHERE id = ?1", params![a])
        .unwrap();

    assert!(db.get_clients(None).is_err());
    assert!(db.get_client_by_id(a).is_err());
}

#[test]
fn test_corrupt_amount_is_an_error() {
    let mut db = Database::open_in_memory().unwrap();
    let (_, b) = setup_test_data(&mut db);
    db.conn
        .execute("UPDATE installments SET amount = '' WHERE client_id = ?1", params![b])
        .unwrap();

    assert!(db.get_installments().is_err());
    assert!(db.get_installments_for_client(b).is_err());
}

// ── Installments ──────────────────────────────────────────────

#[test]
fn test_installments_for_client_newest_first() {
    let mut db = Database::open_in_memory().unwrap();
    let (a, b) = setup_test_data(&mut db);

    let history = db.get_installments_for_client(a).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, "2024-02-05");
    assert_eq!(history[1].date, "2024-01-05");

    let other = db.get_installments_for_client(b).unwrap();
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].amount, dec!(300.50));
}

#[test]
fn test_all_installments_oldest_first() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let dates: Vec<String> = db
        .get_installments()
        .unwrap()
        .into_iter()
        .map(|i| i.date)
        .collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-20", "2024-02-05"]);
}

#[test]
fn test_installment_requires_existing_client() {
    let db = Database::open_in_memory().unwrap();
    let orphan = Installment::new(12345, dec!(10), "2024-01-01".into());
    assert!(db.insert_installment(&orphan).is_err());
}

#[test]
fn test_delete_installment() {
    let mut db = Database::open_in_memory().unwrap();
    let (a, _) = setup_test_data(&mut db);
    let history = db.get_installments_for_client(a).unwrap();
    let id = history[0].id.unwrap();

    assert!(db.delete_installment(id).unwrap());
    assert!(!db.delete_installment(id).unwrap());
    assert_eq!(db.get_installments_for_client(a).unwrap().len(), 1);
}

#[test]
fn test_delete_client_cascades() {
    let mut db = Database::open_in_memory().unwrap();
    let (a, b) = setup_test_data(&mut db);

    assert!(db.delete_client(a).unwrap());
    assert!(db.get_client_by_id(a).unwrap().is_none());
    assert!(db.get_installments_for_client(a).unwrap().is_empty());
    assert_eq!(db.get_installments_for_client(b).unwrap().len(), 1);
    assert_eq!(db.get_installments().unwrap().len(), 1);
}

#[test]
fn test_delete_missing_client() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.delete_client(7).unwrap());
}

#[test]
fn test_decimal_precision_preserved() {
    let db = Database::open_in_memory().unwrap();
    let mut client = make_client("Precise", "01012345678");
    client.total = dec!(1234567.89);
    let id = db.insert_client(&client).unwrap();
    db.insert_installment(&Installment::new(id, dec!(0.01), "2024-01-01".into()))
        .unwrap();

    assert_eq!(
        db.get_client_by_id(id).unwrap().unwrap().total,
        dec!(1234567.89)
    );
    assert_eq!(
        db.get_installments_for_client(id).unwrap()[0].amount,
        dec!(0.01)
    );
}
