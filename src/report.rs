use rust_decimal::Decimal;

/// One reporting window: a whole year, or a single month of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReportWindow {
    pub year: i32,
    pub month: Option<u32>,
}

impl ReportWindow {
    pub(crate) fn new(year: i32, month: Option<u32>) -> Self {
        Self { year, month }
    }

    /// SQL LIKE pattern matching ISO dates inside the window.
    pub(crate) fn like_pattern(&self) -> String {
        match self.month {
            Some(m) => format!("{:04}-{:02}%", self.year, m),
            None => format!("{:04}-%", self.year),
        }
    }
}

impl std::fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.month {
            Some(m) => write!(f, "{:04}-{:02}", self.year, m),
            None => write!(f, "{:04}", self.year),
        }
    }
}

/// Aggregate income/expense totals for one user and window.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Report {
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

impl Report {
    /// May be negative.
    pub(crate) fn savings(&self) -> Decimal {
        self.total_income - self.total_expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_year_pattern() {
        let window = ReportWindow::new(2025, None);
        assert_eq!(window.like_pattern(), "2025-%");
        assert_eq!(window.to_string(), "2025");
    }

    #[test]
    fn test_month_pattern_zero_padded() {
        let window = ReportWindow::new(2025, Some(3));
        assert_eq!(window.like_pattern(), "2025-03%");
        assert_eq!(window.to_string(), "2025-03");

        let december = ReportWindow::new(2025, Some(12));
        assert_eq!(december.like_pattern(), "2025-12%");
    }

    #[test]
    fn test_savings() {
        let report = Report {
            total_income: dec!(1000),
            total_expense: dec!(500),
        };
        assert_eq!(report.savings(), dec!(500));
    }

    #[test]
    fn test_savings_can_be_negative() {
        let report = Report {
            total_income: dec!(200),
            total_expense: dec!(350.50),
        };
        assert_eq!(report.savings(), dec!(-150.50));
    }

    #[test]
    fn test_empty_report_is_all_zero() {
        let report = Report::default();
        assert_eq!(report.total_income, Decimal::ZERO);
        assert_eq!(report.total_expense, Decimal::ZERO);
        assert_eq!(report.savings(), Decimal::ZERO);
    }
}
