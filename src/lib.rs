// Recurria - Core Library
// Recurring-expense tracking: recurrence engine + SQLite expense store

pub mod categories;
pub mod config;
pub mod db;
pub mod error;
pub mod expense;
pub mod format;
pub mod logging;
pub mod recurrence;

// Re-export commonly used types
pub use categories::{category_meta, known_categories, CategoryMeta};
pub use config::Config;
pub use db::{seed_expenses, ExpenseStore};
pub use error::{StoreError, StoreResult};
pub use expense::{Cadence, ExpenseUpdate, NewExpense, ParseCadenceError, RecurringExpense};
pub use recurrence::{
    compute_next_occurrence, compute_totals, days_between, due_label, next_occurrence_today,
    rank_upcoming, today, DueStatus, Totals, UpcomingExpense, DEFAULT_UPCOMING_LIMIT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
