mod budget;
mod transaction;
mod user;

pub use budget::{Budget, OverBudget};
pub use transaction::{Transaction, TxnKind};
pub use user::User;
