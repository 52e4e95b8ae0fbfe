//! Entity module - SeaORM entity definitions for the record store.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod expense;

pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
