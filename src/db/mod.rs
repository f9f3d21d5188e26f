mod schema;

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TrackerError};
use crate::models::*;
use crate::report::{Report, ReportWindow};

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    pub(crate) fn insert_user(&self, user: &User) -> Result<i64> {
        let res = self.conn.execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![user.username, user.password_hash, user.created_at],
        );
        match res {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(TrackerError::DuplicateUser(user.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    id: Some(row.get(0)?),
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (user_id, kind, category, amount, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                txn.user_id,
                txn.kind.as_str(),
                txn.category,
                txn.amount.to_string(),
                txn.date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a transaction and, for expenses, run the advisory budget check
    /// against the month the date lands in. The insert always sticks; the
    /// advisory never blocks or rolls it back.
    pub(crate) fn record_transaction(
        &self,
        txn: &Transaction,
    ) -> Result<(i64, Option<OverBudget>)> {
        let id = self.insert_transaction(txn)?;
        let advisory = match txn.kind {
            TxnKind::Expense => self.check_budget(txn)?,
            TxnKind::Income => None,
        };
        Ok((id, advisory))
    }

    pub(crate) fn get_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, kind, category, amount, date
             FROM transactions WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let kind_str: String = row.get(2)?;
            let kind = TxnKind::parse(&kind_str).map_err(|_| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    format!("unknown transaction kind '{kind_str}'").into(),
                )
            })?;
            let amount_str: String = row.get(4)?;
            Ok(Transaction {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                kind,
                category: row.get(3)?,
                amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                date: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Replaces category and amount only; date and kind stay as recorded.
    pub(crate) fn update_transaction(
        &self,
        id: i64,
        user_id: i64,
        category: &str,
        amount: Decimal,
    ) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE transactions SET category = ?1, amount = ?2
             WHERE id = ?3 AND user_id = ?4",
            params![category, amount.to_string(), id, user_id],
        )?;
        if affected == 0 {
            return Err(TrackerError::NotFound(id));
        }
        Ok(())
    }

    pub(crate) fn delete_transaction(&self, id: i64, user_id: i64) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if affected == 0 {
            return Err(TrackerError::NotFound(id));
        }
        Ok(())
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn upsert_budget(&self, budget: &Budget) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO budgets (user_id, category, year, month, amount)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, category, year, month) DO UPDATE SET amount = ?5",
            params![
                budget.user_id,
                budget.category,
                budget.year,
                budget.month,
                budget.amount.to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_budget(
        &self,
        user_id: i64,
        category: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            "SELECT id, user_id, category, year, month, amount FROM budgets
             WHERE user_id = ?1 AND category = ?2 AND year = ?3 AND month = ?4",
            params![user_id, category, year, month],
            |row| {
                let amt_str: String = row.get(5)?;
                Ok(Budget {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    category: row.get(2)?,
                    year: row.get(3)?,
                    month: row.get(4)?,
                    amount: Decimal::from_str(&amt_str).unwrap_or_default(),
                })
            },
        );
        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Compare a month's expense total for the transaction's category against
    /// the stored threshold, if any. Runs after the insert, so the total
    /// includes the transaction itself. Strictly-over only.
    fn check_budget(&self, txn: &Transaction) -> Result<Option<OverBudget>> {
        let Some((year, month)) = split_month(&txn.date) else {
            return Ok(None);
        };
        let Some(budget) = self.get_budget(txn.user_id, &txn.category, year, month)? else {
            return Ok(None);
        };
        let spent = self.expense_total(txn.user_id, &txn.category, txn.month_prefix())?;
        if spent > budget.amount {
            return Ok(Some(OverBudget {
                category: txn.category.clone(),
                year,
                month,
                limit: budget.amount,
                spent,
            }));
        }
        Ok(None)
    }

    /// Expense total for one user/category in a "YYYY-MM" month.
    fn expense_total(&self, user_id: i64, category: &str, month_prefix: &str) -> Result<Decimal> {
        let total: String = self.conn.query_row(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM transactions
             WHERE user_id = ?1 AND kind = 'expense' AND category = ?2 AND date LIKE ?3",
            params![user_id, category, format!("{month_prefix}%")],
            |row| row.get(0),
        )?;
        Ok(Decimal::from_str(&total).unwrap_or_default())
    }

    // ── Reports ───────────────────────────────────────────────

    /// Per-kind totals for one user inside the window. A kind with no
    /// transactions contributes zero.
    pub(crate) fn kind_totals(&self, user_id: i64, window: &ReportWindow) -> Result<Report> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, CAST(COALESCE(SUM(amount), 0) AS TEXT)
             FROM transactions
             WHERE user_id = ?1 AND date LIKE ?2
             GROUP BY kind",
        )?;
        let rows = stmt.query_map(params![user_id, window.like_pattern()], |row| {
            let kind: String = row.get(0)?;
            let total: String = row.get(1)?;
            Ok((kind, total))
        })?;

        let mut report = Report::default();
        for row in rows {
            let (kind, total) = row?;
            let total = Decimal::from_str(&total).unwrap_or_default();
            match kind.as_str() {
                "income" => report.total_income = total,
                "expense" => report.total_expense = total,
                _ => {}
            }
        }
        Ok(report)
    }

    /// Expense total per category inside the window, largest first.
    pub(crate) fn expense_by_category(
        &self,
        user_id: i64,
        window: &ReportWindow,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, CAST(SUM(amount) AS TEXT)
             FROM transactions
             WHERE user_id = ?1 AND kind = 'expense' AND date LIKE ?2
             GROUP BY category
             ORDER BY SUM(amount) DESC, category",
        )?;
        let rows = stmt.query_map(params![user_id, window.like_pattern()], |row| {
            let name: String = row.get(0)?;
            let amt_str: String = row.get(1)?;
            Ok((name, Decimal::from_str(&amt_str).unwrap_or_default()))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Export ────────────────────────────────────────────────

    pub(crate) fn export_to_csv(&self, path: &Path, user_id: i64) -> Result<usize> {
        let txns = self.get_transactions(user_id)?;
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["id", "date", "type", "category", "amount"])?;
        for txn in &txns {
            wtr.write_record([
                txn.id.unwrap_or(0).to_string(),
                txn.date.clone(),
                txn.kind.to_string(),
                txn.category.clone(),
                txn.amount.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(txns.len())
    }
}

/// Year and month of an ISO date string: the first four and next two digits.
fn split_month(date: &str) -> Option<(i32, u32)> {
    let year = date.get(..4)?.parse().ok()?;
    let month = date.get(5..7)?.parse().ok()?;
    Some((year, month))
}
