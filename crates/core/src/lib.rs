pub mod expense;
pub mod money;
pub mod transaction;

pub use expense::{Expense, Expenses, Tag};
pub use money::Money;
pub use transaction::Transaction;
