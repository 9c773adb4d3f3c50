use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

use recurria::config::Config;
use recurria::logging::init_tracing;
use recurria::recurrence::parse_anchor;
use recurria::categories::is_known;
use recurria::{
    compute_totals, format, rank_upcoming, today, Cadence, ExpenseStore, ExpenseUpdate,
    NewExpense,
};

const USAGE: &str = "Usage: recurria [--db PATH] <command>

Commands:
  overview                                   Totals and the upcoming charges (default)
  list [--json]                              All subscriptions, by name
  add NAME AMOUNT CADENCE STARTS_ON [CATEGORY]
  set ID FIELD VALUE                         FIELD: name | amount | cadence | starts_on | category ('-' clears)
  pause ID | resume ID | delete ID
  reset                                      Remove every subscription
  help";

#[derive(Debug, PartialEq)]
enum Command {
    Overview,
    List { json: bool },
    Add(NewExpense),
    Set { id: i64, update: ExpenseUpdate },
    Pause(i64),
    Resume(i64),
    Delete(i64),
    Reset,
    Help,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    db: Option<PathBuf>,
    command: Command,
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = parse_args(&args)?;

    if invocation.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(path) = invocation.db {
        config = config.with_database_path(path);
    }

    let store = open_store(&config)?;
    run(&store, &config, invocation.command)?;
    store.close()?;

    Ok(())
}

/// Open the database, bring the schema up to date and seed a fresh install
fn open_store(config: &Config) -> Result<ExpenseStore> {
    config.ensure_database_dir()?;

    let mut store = ExpenseStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    store.initialize_schema()?;

    if config.seed_on_first_run {
        store.seed_if_empty()?;
    }

    Ok(store)
}

// ============================================================================
// ARGUMENT PARSING
// ============================================================================

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut db = None;
    let mut rest: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--db" {
            let path = iter.next().ok_or_else(|| anyhow!("--db needs a path"))?;
            db = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }

    let command = match rest.as_slice() {
        [] | ["overview"] => Command::Overview,
        ["list"] => Command::List { json: false },
        ["list", "--json"] => Command::List { json: true },
        ["add", name, amount, cadence, starts_on] => Command::Add(parse_new(name, amount, cadence, starts_on)?),
        ["add", name, amount, cadence, starts_on, category] => {
            Command::Add(parse_new(name, amount, cadence, starts_on)?.with_category(category))
        }
        ["set", id, field, value] => Command::Set {
            id: parse_id(id)?,
            update: parse_field(field, value)?,
        },
        ["pause", id] => Command::Pause(parse_id(id)?),
        ["resume", id] => Command::Resume(parse_id(id)?),
        ["delete", id] => Command::Delete(parse_id(id)?),
        ["reset"] => Command::Reset,
        ["help"] | ["--help"] | ["-h"] => Command::Help,
        _ => bail!("Unrecognized command: {}\n\n{}", rest.join(" "), USAGE),
    };

    Ok(Invocation { db, command })
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().with_context(|| format!("Invalid id '{}'", raw))
}

fn parse_amount(raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => bail!("Enter a valid amount (got '{}')", raw),
    }
}

fn parse_date(raw: &str) -> Result<String> {
    parse_anchor(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| anyhow!("Invalid start date '{}' (expected YYYY-MM-DD)", raw))
}

fn parse_new(name: &str, amount: &str, cadence: &str, starts_on: &str) -> Result<NewExpense> {
    if name.trim().is_empty() {
        bail!("Name is required");
    }
    let cadence: Cadence = cadence.parse()?;
    Ok(NewExpense::new(name.trim(), parse_amount(amount)?, cadence, &parse_date(starts_on)?))
}

fn parse_field(field: &str, value: &str) -> Result<ExpenseUpdate> {
    let update = ExpenseUpdate::new();
    let update = match field {
        "name" if !value.trim().is_empty() => update.name(value.trim()),
        "name" => bail!("Name is required"),
        "amount" => update.amount(parse_amount(value)?),
        "cadence" => update.cadence(value.parse()?),
        "starts_on" => update.starts_on(&parse_date(value)?),
        "category" if value == "-" => update.category(None),
        "category" => update.category(Some(value)),
        other => bail!("Unknown field '{}'", other),
    };
    Ok(update)
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Unknown tags are stored as typed but render with the default badge
fn check_category(category: Option<&str>) {
    if let Some(tag) = category {
        if !is_known(tag) {
            tracing::warn!(category = tag, "not a known category, using the default badge");
        }
    }
}

fn run(store: &ExpenseStore, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Overview => show_overview(store, config.upcoming_limit),
        Command::List { json } => show_list(store, json),
        Command::Add(expense) => {
            check_category(expense.category.as_deref());
            let id = store.create(&expense)?;
            println!("✓ Added #{} {}", id, expense.name);
            Ok(())
        }
        Command::Set { id, update } => {
            if let Some(category) = &update.category {
                check_category(category.as_deref());
            }
            report_change(store.update(id, &update)?, id, "Updated")
        }
        Command::Pause(id) => report_change(store.update(id, &ExpenseUpdate::new().paused(true))?, id, "Paused"),
        Command::Resume(id) => report_change(store.update(id, &ExpenseUpdate::new().paused(false))?, id, "Resumed"),
        Command::Delete(id) => report_change(store.delete(id)?, id, "Deleted"),
        Command::Reset => {
            let removed = store.clear_all()?;
            println!("✓ Removed {} subscriptions", removed);
            Ok(())
        }
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

fn report_change(rows: usize, id: i64, verb: &str) -> Result<()> {
    if rows == 0 {
        println!("No subscription #{}", id);
    } else {
        println!("✓ {} #{}", verb, id);
    }
    Ok(())
}

fn show_overview(store: &ExpenseStore, limit: usize) -> Result<()> {
    let expenses = store.list()?;
    let now = today();
    let totals = compute_totals(&expenses);

    println!("Monthly · {}", now.format("%b %Y"));
    println!("  {}", format::currency(totals.monthly));
    println!("  Yearly projection   {}", format::currency(totals.yearly));
    println!("  Average per week    {}", format::currency(totals.weekly));
    println!();
    println!("Upcoming");

    for item in rank_upcoming(&expenses, now, limit) {
        println!(
            "  {:<4} {:<24} {:>10}  {} • {:<13} {}{}",
            format!("#{}", item.expense.id),
            item.expense.name,
            format::currency(item.expense.amount),
            format::date_short(item.next_at),
            item.expense.cadence.label(),
            item.due_label(),
            if item.expense.paused { "  (paused)" } else { "" },
        );
    }

    Ok(())
}

fn show_list(store: &ExpenseStore, json: bool) -> Result<()> {
    let mut expenses = store.list()?;
    expenses.sort_by_key(|e| e.name.to_lowercase());

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    println!("Subscriptions ({} total)", expenses.len());
    for expense in &expenses {
        println!(
            "  {:<4} {:<24} {:>10}  {:<13} {:<12} {}{}",
            format!("#{}", expense.id),
            expense.name,
            format::currency(expense.amount),
            expense.cadence.label(),
            expense.starts_on,
            expense.category.as_deref().unwrap_or("-"),
            if expense.paused { "  (paused)" } else { "" },
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_command_is_overview() {
        let invocation = parse_args(&[]).unwrap();
        assert_eq!(invocation.command, Command::Overview);
        assert_eq!(invocation.db, None);
    }

    #[test]
    fn test_db_flag_anywhere() {
        let invocation = parse_args(&args(&["list", "--db", "/tmp/x.db", "--json"])).unwrap();
        assert_eq!(invocation.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(invocation.command, Command::List { json: true });
        assert!(parse_args(&args(&["--db"])).is_err());
    }

    #[test]
    fn test_parse_add() {
        let invocation = parse_args(&args(&["add", "Netflix", "15.49", "Monthly", "2022-11-22", "video"])).unwrap();
        let expected = NewExpense::new("Netflix", 15.49, Cadence::Monthly, "2022-11-22").with_category("video");
        assert_eq!(invocation.command, Command::Add(expected));
    }

    #[test]
    fn test_parse_add_rejects_bad_input() {
        assert!(parse_args(&args(&["add", "X", "0", "monthly", "2024-01-01"])).is_err());
        assert!(parse_args(&args(&["add", "X", "abc", "monthly", "2024-01-01"])).is_err());
        assert!(parse_args(&args(&["add", "X", "5", "daily", "2024-01-01"])).is_err());
        assert!(parse_args(&args(&["add", "X", "5", "monthly", "2024-13-01"])).is_err());
        assert!(parse_args(&args(&["add", " ", "5", "monthly", "2024-01-01"])).is_err());
    }

    #[test]
    fn test_parse_set_fields() {
        let invocation = parse_args(&args(&["set", "4", "category", "-"])).unwrap();
        assert_eq!(
            invocation.command,
            Command::Set { id: 4, update: ExpenseUpdate::new().category(None) }
        );

        let invocation = parse_args(&args(&["set", "4", "cadence", "yearly"])).unwrap();
        assert_eq!(
            invocation.command,
            Command::Set { id: 4, update: ExpenseUpdate::new().cadence(Cadence::Yearly) }
        );

        assert!(parse_args(&args(&["set", "4", "colour", "red"])).is_err());
        assert!(parse_args(&args(&["set", "x", "name", "y"])).is_err());
    }

    #[test]
    fn test_pause_resume_delete_reset() {
        assert_eq!(parse_args(&args(&["pause", "2"])).unwrap().command, Command::Pause(2));
        assert_eq!(parse_args(&args(&["resume", "2"])).unwrap().command, Command::Resume(2));
        assert_eq!(parse_args(&args(&["delete", "2"])).unwrap().command, Command::Delete(2));
        assert_eq!(parse_args(&args(&["reset"])).unwrap().command, Command::Reset);
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn test_run_against_in_memory_store() {
        let store = ExpenseStore::open_in_memory().unwrap();
        store.initialize_schema().unwrap();
        let config = Config::default();

        let add = NewExpense::new("Gym", 19.99, Cadence::Weekly, "2024-03-02");
        run(&store, &config, Command::Add(add)).unwrap();
        run(&store, &config, Command::Pause(1)).unwrap();
        assert!(store.get(1).unwrap().unwrap().paused);

        run(&store, &config, Command::Overview).unwrap();
        run(&store, &config, Command::List { json: true }).unwrap();
        run(&store, &config, Command::Delete(1)).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
