// 🗄️ Expense Store - SQLite persistence for recurring expenses
// One table, one writer. Schema setup is idempotent and migrations are additive.

use crate::error::{op, StoreError, StoreResult};
use crate::expense::{Cadence, ExpenseUpdate, NewExpense, RecurringExpense};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, name, amount, cadence, starts_on, category, paused FROM expenses";

const INSERT_EXPENSE: &str = "INSERT INTO expenses (name, amount, cadence, starts_on, category, paused)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Columns introduced after the first release, added in place on open
const ADDITIVE_COLUMNS: &[(&str, &str)] = &[("paused", "INTEGER NOT NULL DEFAULT 0")];

/// First-run demo data: (name, amount, cadence, starts_on, category)
const SEED_EXPENSES: &[(&str, f64, Cadence, &str, &str)] = &[
    ("Spotify Premium", 9.99, Cadence::Monthly, "2024-01-15", "music"),
    ("iCloud+ 200GB", 2.99, Cadence::Monthly, "2023-06-03", "storage"),
    ("Netflix", 15.49, Cadence::Monthly, "2022-11-22", "video"),
    ("GitHub Copilot", 10.0, Cadence::Monthly, "2024-04-01", "dev"),
    ("Adobe Creative Cloud", 54.99, Cadence::Monthly, "2021-08-12", "design"),
    ("Domain renewals", 36.0, Cadence::Yearly, "2020-10-28", "web"),
    ("AWS Lightsail", 5.0, Cadence::Monthly, "2023-05-10", "cloud"),
    ("Gym Membership", 19.99, Cadence::Weekly, "2024-03-02", "health"),
    ("Notion Plus", 8.0, Cadence::Monthly, "2023-02-07", "productivity"),
    ("Car Insurance", 180.0, Cadence::Quarterly, "2024-02-15", "auto"),
    ("Xbox Game Pass", 16.99, Cadence::Monthly, "2024-02-25", "gaming"),
    ("HBO Max", 14.99, Cadence::Monthly, "2024-05-05", "video"),
    ("Apple Arcade", 4.99, Cadence::Monthly, "2024-07-19", "gaming"),
];

/// The starter set inserted by [`ExpenseStore::seed_if_empty`]
pub fn seed_expenses() -> Vec<NewExpense> {
    SEED_EXPENSES
        .iter()
        .map(|&(name, amount, cadence, starts_on, category)| {
            NewExpense::new(name, amount, cadence, starts_on).with_category(category)
        })
        .collect()
}

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<RecurringExpense> {
    let paused: i64 = row.get(6)?;

    Ok(RecurringExpense {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        cadence: row.get(3)?,
        starts_on: row.get(4)?,
        category: row.get(5)?,
        paused: paused != 0,
    })
}

// ============================================================================
// EXPENSE STORE
// ============================================================================

/// Owner of the authoritative expense list.
///
/// Opened explicitly by the caller and closed with [`ExpenseStore::close`]
/// (or on drop). Every call runs to completion before returning, so a
/// `list()` after a successful mutation always sees it.
pub struct ExpenseStore {
    conn: Connection,
}

impl ExpenseStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref()).map_err(op("open"))?;
        debug!(path = %path.as_ref().display(), "opened expense database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(op("open"))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        ExpenseStore { conn }
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown
    pub fn close(self) -> StoreResult<()> {
        self.conn
            .close()
            .map_err(|(_, err)| StoreError::from_sqlite("close", err))
    }

    // ========================================================================
    // SCHEMA
    // ========================================================================

    /// Create the `expenses` table if needed and add any missing columns.
    /// Safe on every start; never drops data.
    pub fn initialize_schema(&self) -> StoreResult<()> {
        const OP: &str = "initialize_schema";

        // WAL for crash recovery (in-memory databases report "memory")
        let journal_mode: String = self
            .conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(op(OP))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS expenses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
                    amount REAL NOT NULL CHECK (amount > 0),
                    cadence TEXT NOT NULL CHECK (cadence IN ('weekly','biweekly','monthly','quarterly','yearly')),
                    starts_on TEXT NOT NULL,
                    category TEXT,
                    paused INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )
            .map_err(op(OP))?;

        for (column, definition) in ADDITIVE_COLUMNS {
            if !self.has_column(column)? {
                self.conn
                    .execute(
                        &format!("ALTER TABLE expenses ADD COLUMN {} {}", column, definition),
                        [],
                    )
                    .map_err(op(OP))?;
                info!(column, "migrated expenses table: added column");
            }
        }

        info!(journal_mode = %journal_mode, "expense schema ready");
        Ok(())
    }

    fn has_column(&self, column: &str) -> StoreResult<bool> {
        self.conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('expenses') WHERE name = ?1",
                [column],
                |row| row.get(0),
            )
            .map_err(op("initialize_schema"))
    }

    // ========================================================================
    // SEEDING
    // ========================================================================

    /// Insert the starter set when the table is empty. Returns the number of
    /// rows inserted (0 when any row already exists).
    pub fn seed_if_empty(&mut self) -> StoreResult<usize> {
        let inserted = self.insert_batch_if_empty("seed_if_empty", &seed_expenses())?;
        if inserted > 0 {
            info!(inserted, "seeded starter subscriptions");
        }
        Ok(inserted)
    }

    /// All-or-nothing insert of `rows`, skipped entirely if the table has data
    fn insert_batch_if_empty(&mut self, operation: &'static str, rows: &[NewExpense]) -> StoreResult<usize> {
        let tx = self.conn.transaction().map_err(op(operation))?;

        let existing: i64 = tx
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
            .map_err(op(operation))?;
        if existing > 0 {
            return Ok(0);
        }

        {
            let mut stmt = tx.prepare(INSERT_EXPENSE).map_err(op(operation))?;
            for expense in rows {
                stmt.execute(params![
                    expense.name,
                    expense.amount,
                    expense.cadence,
                    expense.starts_on,
                    expense.category,
                    expense.paused,
                ])
                .map_err(op(operation))?;
            }
        }

        // Dropping `tx` on an early return above rolls the batch back
        tx.commit().map_err(op(operation))?;
        Ok(rows.len())
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Every stored expense in id order. Paused items are included.
    pub fn list(&self) -> StoreResult<Vec<RecurringExpense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .map_err(op("list"))?;

        let expenses = stmt
            .query_map([], row_to_expense)
            .map_err(op("list"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(op("list"))?;

        Ok(expenses)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<RecurringExpense>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                row_to_expense,
            )
            .optional()
            .map_err(op("get"))
    }

    pub fn count(&self) -> StoreResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
            .map_err(op("count"))
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert a new expense and return its assigned id.
    ///
    /// Not idempotent: calling twice stores two rows.
    pub fn create(&self, expense: &NewExpense) -> StoreResult<i64> {
        self.conn
            .execute(
                INSERT_EXPENSE,
                params![
                    expense.name,
                    expense.amount,
                    expense.cadence,
                    expense.starts_on,
                    expense.category,
                    expense.paused,
                ],
            )
            .map_err(op("create"))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, name = %expense.name, "created expense");
        Ok(id)
    }

    /// Patch the fields present in `update`. Returns the number of rows
    /// changed: 0 for an empty patch or an unknown id, neither of which is
    /// an error.
    pub fn update(&self, id: i64, update: &ExpenseUpdate) -> StoreResult<usize> {
        if update.is_empty() {
            return Ok(0);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &update.name {
            assignments.push("name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(amount) = update.amount {
            assignments.push("amount = ?");
            values.push(Value::Real(amount));
        }
        if let Some(cadence) = update.cadence {
            assignments.push("cadence = ?");
            values.push(Value::Text(cadence.as_str().to_string()));
        }
        if let Some(starts_on) = &update.starts_on {
            assignments.push("starts_on = ?");
            values.push(Value::Text(starts_on.clone()));
        }
        if let Some(category) = &update.category {
            assignments.push("category = ?");
            values.push(category.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(paused) = update.paused {
            assignments.push("paused = ?");
            values.push(Value::Integer(i64::from(paused)));
        }
        values.push(Value::Integer(id));

        let sql = format!("UPDATE expenses SET {} WHERE id = ?", assignments.join(", "));
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(op("update"))?;

        debug!(id, changed, "updated expense");
        Ok(changed)
    }

    /// Hard delete. Unknown ids are a no-op returning 0.
    pub fn delete(&self, id: i64) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", [id])
            .map_err(op("delete"))?;

        debug!(id, removed, "deleted expense");
        Ok(removed)
    }

    /// Remove every row. For resets and tests.
    pub fn clear_all(&self) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM expenses", [])
            .map_err(op("clear_all"))?;

        info!(removed, "cleared all expenses");
        Ok(removed)
    }
}
