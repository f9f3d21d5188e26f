use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::Local;
use rust_decimal::Decimal;

use crate::auth;
use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{Budget, Transaction, TxnKind, User};
use crate::report::ReportWindow;

/// Two-level interactive menu over buffered line IO. The only state is the
/// borrowed store handle; the authenticated user is passed into each flow
/// explicitly.
pub(crate) struct Session<'a, R, W> {
    db: &'a Database,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub(crate) fn new(db: &'a Database, input: R, out: W) -> Self {
        Self { db, input, out }
    }

    /// Top-level menu. Runs until Exit or EOF.
    pub(crate) fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Pocketbook — personal finance tracker")?;
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "1) Register")?;
            writeln!(self.out, "2) Login")?;
            writeln!(self.out, "3) Exit")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };
            match choice.as_str() {
                "1" => {
                    let outcome = self.register();
                    self.recover(outcome)?;
                }
                "2" => {
                    let outcome = self.login_and_run();
                    self.recover(outcome)?;
                }
                "3" => break,
                other => writeln!(self.out, "✘ Unknown option: {other}")?,
            }
        }
        writeln!(self.out, "Goodbye.")?;
        Ok(())
    }

    // ── Account flows ─────────────────────────────────────────

    fn register(&mut self) -> Result<()> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(());
        };
        let user = auth::register(self.db, &username, &password)?;
        writeln!(self.out, "✔ Registered '{}'. You can log in now.", user.username)?;
        Ok(())
    }

    fn login_and_run(&mut self) -> Result<()> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(());
        };
        let user = auth::login(self.db, &username, &password)?;
        writeln!(self.out, "✔ Welcome back, {}!", user.username)?;
        self.user_menu(&user)
    }

    /// Authenticated sub-menu. Runs until Logout or EOF, then returns
    /// control to the top-level menu.
    fn user_menu(&mut self, user: &User) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "1) Add transaction")?;
            writeln!(self.out, "2) View transactions")?;
            writeln!(self.out, "3) Update transaction")?;
            writeln!(self.out, "4) Delete transaction")?;
            writeln!(self.out, "5) Report")?;
            writeln!(self.out, "6) Set budget")?;
            writeln!(self.out, "7) Export CSV")?;
            writeln!(self.out, "8) Logout")?;
            let Some(choice) = self.prompt("> ")? else {
                return Ok(());
            };
            let outcome = match choice.as_str() {
                "1" => self.add_transaction(user),
                "2" => self.view_transactions(user),
                "3" => self.update_transaction(user),
                "4" => self.delete_transaction(user),
                "5" => self.report(user),
                "6" => self.set_budget(user),
                "7" => self.export_csv(user),
                "8" => {
                    writeln!(self.out, "Logged out.")?;
                    return Ok(());
                }
                other => {
                    writeln!(self.out, "✘ Unknown option: {other}")?;
                    Ok(())
                }
            };
            self.recover(outcome)?;
        }
    }

    // ── Transaction flows ─────────────────────────────────────

    fn add_transaction(&mut self, user: &User) -> Result<()> {
        let Some(kind) = self.prompt("Type (income/expense): ")? else {
            return Ok(());
        };
        let kind = TxnKind::parse(&kind)?;
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(());
        };
        let Some(amount) = self.prompt("Amount: ")? else {
            return Ok(());
        };
        let amount = parse_amount(&amount)?;
        let Some(date) = self.prompt("Date (YYYY-MM-DD, blank for today): ")? else {
            return Ok(());
        };
        let date = parse_date(&date)?;

        let txn = Transaction::new(user.id.unwrap_or_default(), kind, category, amount, date);
        let (_, advisory) = self.db.record_transaction(&txn)?;
        writeln!(
            self.out,
            "✔ Recorded {} of ${:.2} in {} on {}",
            txn.kind, txn.amount, txn.category, txn.date
        )?;
        if let Some(over) = advisory {
            writeln!(
                self.out,
                "⚠ Over budget for {} in {:04}-{:02}: spent ${:.2} of ${:.2}",
                over.category, over.year, over.month, over.spent, over.limit
            )?;
        }
        Ok(())
    }

    fn view_transactions(&mut self, user: &User) -> Result<()> {
        let txns = self.db.get_transactions(user.id.unwrap_or_default())?;
        if txns.is_empty() {
            writeln!(self.out, "No transactions yet.")?;
            return Ok(());
        }
        writeln!(
            self.out,
            "{:<6} {:<12} {:<8} {:<20} {:>12}",
            "ID", "Date", "Type", "Category", "Amount"
        )?;
        writeln!(self.out, "{}", "─".repeat(62))?;
        for txn in &txns {
            writeln!(
                self.out,
                "{:<6} {:<12} {:<8} {:<20} {:>12}",
                txn.id.unwrap_or(0),
                txn.date,
                txn.kind,
                txn.category,
                format!("${:.2}", txn.amount),
            )?;
        }
        Ok(())
    }

    fn update_transaction(&mut self, user: &User) -> Result<()> {
        let Some(id) = self.prompt("Transaction id: ")? else {
            return Ok(());
        };
        let id = parse_id(&id)?;
        let Some(category) = self.prompt("New category: ")? else {
            return Ok(());
        };
        let Some(amount) = self.prompt("New amount: ")? else {
            return Ok(());
        };
        let amount = parse_amount(&amount)?;
        self.db
            .update_transaction(id, user.id.unwrap_or_default(), &category, amount)?;
        writeln!(self.out, "✔ Updated transaction {id}.")?;
        Ok(())
    }

    fn delete_transaction(&mut self, user: &User) -> Result<()> {
        let Some(id) = self.prompt("Transaction id: ")? else {
            return Ok(());
        };
        let id = parse_id(&id)?;
        self.db.delete_transaction(id, user.id.unwrap_or_default())?;
        writeln!(self.out, "✔ Deleted transaction {id}.")?;
        Ok(())
    }

    // ── Report and budget flows ───────────────────────────────

    fn report(&mut self, user: &User) -> Result<()> {
        let Some(year) = self.prompt("Year: ")? else {
            return Ok(());
        };
        let year = parse_year(&year)?;
        let Some(month) = self.prompt("Month (1-12, blank for whole year): ")? else {
            return Ok(());
        };
        let month = if month.is_empty() {
            None
        } else {
            Some(parse_month(&month)?)
        };

        let window = ReportWindow::new(year, month);
        let user_id = user.id.unwrap_or_default();
        let report = self.db.kind_totals(user_id, &window)?;
        writeln!(self.out, "Report for {window}")?;
        writeln!(self.out, "  Income:   ${:.2}", report.total_income)?;
        writeln!(self.out, "  Expenses: ${:.2}", report.total_expense)?;
        writeln!(self.out, "  Savings:  ${:.2}", report.savings())?;

        let by_category = self.db.expense_by_category(user_id, &window)?;
        if !by_category.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Spending by category:")?;
            for (name, amount) in &by_category {
                writeln!(self.out, "  {name:<20} ${amount:.2}")?;
            }
        }
        Ok(())
    }

    fn set_budget(&mut self, user: &User) -> Result<()> {
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(());
        };
        let Some(year) = self.prompt("Year: ")? else {
            return Ok(());
        };
        let year = parse_year(&year)?;
        let Some(month) = self.prompt("Month (1-12): ")? else {
            return Ok(());
        };
        let month = parse_month(&month)?;
        let Some(amount) = self.prompt("Limit amount: ")? else {
            return Ok(());
        };
        let amount = parse_amount(&amount)?;

        let budget = Budget::new(user.id.unwrap_or_default(), category, year, month, amount);
        self.db.upsert_budget(&budget)?;
        writeln!(
            self.out,
            "✔ Budget for {} in {} set to ${:.2}",
            budget.category,
            budget.month_prefix(),
            budget.amount
        )?;
        Ok(())
    }

    fn export_csv(&mut self, user: &User) -> Result<()> {
        let Some(path) = self.prompt("Output file: ")? else {
            return Ok(());
        };
        if path.is_empty() {
            writeln!(self.out, "✘ No output file given.")?;
            return Ok(());
        }
        let count = self
            .db
            .export_to_csv(Path::new(&path), user.id.unwrap_or_default())?;
        writeln!(self.out, "✔ Exported {count} transactions to {path}")?;
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────

    /// Print a prompt and read one trimmed line. None means EOF.
    fn prompt(&mut self, msg: &str) -> Result<Option<String>> {
        write!(self.out, "{msg}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Report recoverable input errors and keep the menu alive; anything
    /// else propagates and ends the session.
    fn recover(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_user_error() => {
                writeln!(self.out, "✘ {e}")?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

// ── Input parsing ────────────────────────────────────────────

fn parse_amount(input: &str) -> Result<Decimal> {
    let input = input.trim();
    Decimal::from_str(input).map_err(|_| TrackerError::InvalidAmount(input.to_string()))
}

/// Blank input means today; anything else must be an ISO calendar date.
fn parse_date(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Local::now().format("%Y-%m-%d").to_string());
    }
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| TrackerError::InvalidDate(input.to_string()))
}

fn parse_id(input: &str) -> Result<i64> {
    let input = input.trim();
    input
        .parse()
        .map_err(|_| TrackerError::InvalidId(input.to_string()))
}

fn parse_year(input: &str) -> Result<i32> {
    let input = input.trim();
    input
        .parse()
        .map_err(|_| TrackerError::InvalidDate(input.to_string()))
}

fn parse_month(input: &str) -> Result<u32> {
    let input = input.trim();
    let month: u32 = input
        .parse()
        .map_err(|_| TrackerError::InvalidDate(input.to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(TrackerError::InvalidDate(input.to_string()));
    }
    Ok(month)
}
