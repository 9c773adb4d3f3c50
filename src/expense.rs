// 💳 Recurring Expense Model
// The single entity tracked by the app, plus its cadence and patch types

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CADENCE
// ============================================================================

/// Fixed billing interval. No custom intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Cadence {
    pub const ALL: [Cadence; 5] = [
        Cadence::Weekly,
        Cadence::Biweekly,
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Yearly,
    ];

    /// Storage / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Biweekly => "biweekly",
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::Yearly => "yearly",
        }
    }

    /// Human label for list rows
    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Weekly => "Weekly",
            Cadence::Biweekly => "Every 2 weeks",
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::Yearly => "Yearly",
        }
    }

    /// Number of charges in a year, used to annualize amounts
    pub fn payments_per_year(&self) -> u32 {
        match self {
            Cadence::Weekly => 52,
            Cadence::Biweekly => 26,
            Cadence::Monthly => 12,
            Cadence::Quarterly => 4,
            Cadence::Yearly => 1,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cadence '{0}' (expected weekly, biweekly, monthly, quarterly or yearly)")]
pub struct ParseCadenceError(pub String);

impl FromStr for Cadence {
    type Err = ParseCadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cadence::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCadenceError(s.to_string()))
    }
}

impl ToSql for Cadence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Cadence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        // Stored values are exact lowercase names; anything else is corrupt data
        Cadence::ALL
            .into_iter()
            .find(|c| c.as_str() == text)
            .ok_or_else(|| FromSqlError::Other(Box::new(ParseCadenceError(text.to_string()))))
    }
}

// ============================================================================
// RECURRING EXPENSE
// ============================================================================

/// A stored subscription. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub cadence: Cadence,
    /// Anchor date as ISO `YYYY-MM-DD` text
    pub starts_on: String,
    pub category: Option<String>,
    pub paused: bool,
}

impl RecurringExpense {
    /// Amount scaled to a full year of charges
    pub fn annualized(&self) -> f64 {
        self.amount * f64::from(self.cadence.payments_per_year())
    }
}

/// A subscription that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub cadence: Cadence,
    pub starts_on: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub paused: bool,
}

impl NewExpense {
    pub fn new(name: &str, amount: f64, cadence: Cadence, starts_on: &str) -> Self {
        NewExpense {
            name: name.to_string(),
            amount,
            cadence,
            starts_on: starts_on.to_string(),
            category: None,
            paused: false,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Attach the id the store assigned
    pub fn into_stored(self, id: i64) -> RecurringExpense {
        RecurringExpense {
            id,
            name: self.name,
            amount: self.amount,
            cadence: self.cadence,
            starts_on: self.starts_on,
            category: self.category,
            paused: self.paused,
        }
    }
}

// ============================================================================
// PARTIAL UPDATE
// ============================================================================

/// Patch for an existing expense. `None` leaves a field untouched.
///
/// `category` is doubly optional: `Some(None)` clears the tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub cadence: Option<Cadence>,
    pub starts_on: Option<String>,
    pub category: Option<Option<String>>,
    pub paused: Option<bool>,
}

impl ExpenseUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn starts_on(mut self, starts_on: &str) -> Self {
        self.starts_on = Some(starts_on.to_string());
        self
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = Some(category.map(str::to_string));
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = Some(paused);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.cadence.is_none()
            && self.starts_on.is_none()
            && self.category.is_none()
            && self.paused.is_none()
    }

    /// Apply the patch to an in-memory copy
    pub fn apply_to(&self, expense: &mut RecurringExpense) {
        if let Some(name) = &self.name {
            expense.name = name.clone();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(cadence) = self.cadence {
            expense.cadence = cadence;
        }
        if let Some(starts_on) = &self.starts_on {
            expense.starts_on = starts_on.clone();
        }
        if let Some(category) = &self.category {
            expense.category = category.clone();
        }
        if let Some(paused) = self.paused {
            expense.paused = paused;
        }
    }
}
