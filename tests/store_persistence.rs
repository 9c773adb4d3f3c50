use chrono::NaiveDate;
use recurria::{
    compute_totals, rank_upcoming, Cadence, ExpenseStore, ExpenseUpdate, NewExpense, StoreError,
};
use rusqlite::Connection;
use tempfile::TempDir;

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recurria.db");
    (dir, path)
}

fn open(path: &std::path::Path) -> ExpenseStore {
    let store = ExpenseStore::open(path).unwrap();
    store.initialize_schema().unwrap();
    store
}

#[test]
fn data_survives_close_and_reopen() {
    let (_dir, path) = temp_db();

    let store = open(&path);
    let id = store
        .create(&NewExpense::new("Car Insurance", 180.0, Cadence::Quarterly, "2024-02-15").with_category("auto"))
        .unwrap();
    store.update(id, &ExpenseUpdate::new().paused(true)).unwrap();
    store.close().unwrap();

    let reopened = open(&path);
    let all = reopened.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].name, "Car Insurance");
    assert!(all[0].paused);
}

#[test]
fn seeding_on_every_start_only_happens_once() {
    let (_dir, path) = temp_db();

    for _ in 0..3 {
        let mut store = open(&path);
        store.seed_if_empty().unwrap();
        store.close().unwrap();
    }

    let store = open(&path);
    let all = store.list().unwrap();
    assert_eq!(all.len(), recurria::seed_expenses().len());

    let mut ids: Vec<i64> = all.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), all.len());
}

#[test]
fn legacy_file_is_migrated_without_data_loss() {
    let (_dir, path) = temp_db();
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                cadence TEXT NOT NULL,
                starts_on TEXT NOT NULL,
                category TEXT
            );
            INSERT INTO expenses (name, amount, cadence, starts_on, category)
                VALUES ('Domain renewals', 36.0, 'yearly', '2020-10-28', 'web'),
                       ('AWS Lightsail', 5.0, 'monthly', '2023-05-10', NULL);",
        )
        .unwrap();
    }

    let mut store = open(&path);
    assert_eq!(store.seed_if_empty().unwrap(), 0, "existing rows block seeding");

    let all = store.list().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|e| !e.paused));
    assert_eq!(all[1].category, None);

    store.update(all[0].id, &ExpenseUpdate::new().paused(true)).unwrap();
    assert!(store.get(all[0].id).unwrap().unwrap().paused);
}

#[test]
fn read_after_write_feeds_the_engine() {
    let (_dir, path) = temp_db();
    let store = open(&path);
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    let monthly = store
        .create(&NewExpense::new("Netflix", 12.0, Cadence::Monthly, "2024-01-20"))
        .unwrap();
    let yearly = store
        .create(&NewExpense::new("Domain", 24.0, Cadence::Yearly, "2023-06-11"))
        .unwrap();

    let items = store.list().unwrap();
    assert_eq!(compute_totals(&items).yearly, 168.0);

    let upcoming = rank_upcoming(&items, as_of, 10);
    let order: Vec<i64> = upcoming.iter().map(|u| u.expense.id).collect();
    assert_eq!(order, vec![yearly, monthly]);

    store.delete(yearly).unwrap();
    let items = store.list().unwrap();
    assert_eq!(compute_totals(&items).yearly, 144.0);
    assert_eq!(rank_upcoming(&items, as_of, 10).len(), 1);
}

#[test]
fn open_on_unwritable_path_reports_storage_error() {
    let (dir, _) = temp_db();
    // A directory cannot be opened as a database file
    let err = ExpenseStore::open(dir.path()).and_then(|store| store.initialize_schema().map(|_| store));

    match err {
        Err(StoreError::Storage { .. }) => {}
        Err(other) => panic!("expected a storage error, got {}", other),
        Ok(_) => panic!("opening a directory should fail"),
    }
}
