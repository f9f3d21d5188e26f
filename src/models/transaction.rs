use rust_decimal::Decimal;

use crate::error::TrackerError;

/// Closed set of transaction kinds. Anything else is rejected at the input
/// boundary rather than by a storage constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TrackerError> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(TrackerError::InvalidKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub user_id: i64,
    pub kind: TxnKind,
    /// Free-text label, e.g. "Food" or "Rent".
    pub category: String,
    pub amount: Decimal,
    /// Format: "YYYY-MM-DD"
    pub date: String,
}

impl Transaction {
    pub fn new(
        user_id: i64,
        kind: TxnKind,
        category: String,
        amount: Decimal,
        date: String,
    ) -> Self {
        Self {
            id: None,
            user_id,
            kind,
            category,
            amount,
            date,
        }
    }

    /// "YYYY-MM" prefix of the transaction date.
    pub fn month_prefix(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}
