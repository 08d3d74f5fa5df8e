//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the credit/debit sign convention
//! - Validation of the JSON body used to create transactions
//! - Database functions for storing, listing and summing transactions
//! - The route handlers for the transaction API

mod core;
mod create_endpoint;
mod form;
mod get_endpoint;
mod list_endpoint;
mod summary_endpoint;

pub use core::{
    NewTransaction, Transaction, TransactionType, ValidationIssue, create_transaction,
    create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use summary_endpoint::get_summary_endpoint;

#[cfg(test)]
pub use core::count_transactions;
