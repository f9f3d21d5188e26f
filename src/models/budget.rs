use rust_decimal::Decimal;

/// A monthly spending threshold for one user and category. Unique per
/// (user, category, year, month); setting it again replaces the amount.
#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
}

impl Budget {
    pub fn new(user_id: i64, category: String, year: i32, month: u32, amount: Decimal) -> Self {
        Self {
            id: None,
            user_id,
            category,
            year,
            month,
            amount,
        }
    }

    /// "YYYY-MM" prefix matching transaction dates in this budget's month.
    pub fn month_prefix(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Advisory raised when a month's expenses exceed its budget threshold.
/// It never blocks or rolls back the insert that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct OverBudget {
    pub category: String,
    pub year: i32,
    pub month: u32,
    pub limit: Decimal,
    pub spent: Decimal,
}
