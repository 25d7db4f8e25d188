//! Transactions record money given to or received from a customer.
//!
//! This module contains:
//! - The `Transaction` model and the database functions for storing and querying transactions
//! - The JSON route handlers for creating, editing, deleting and listing transactions

mod core;
mod create_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod timestamp;

pub use core::{
    CustomerTransaction, NewTransaction, Transaction, TransactionId, TransactionUpdate,
    create_transaction, create_transaction_table, delete_transaction, get_all_transactions,
    get_customer_transactions, get_owned_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use edit_endpoint::{delete_transaction_endpoint, edit_transaction_endpoint};
pub use list_endpoint::{get_all_transactions_endpoint, get_customer_transactions_endpoint};
pub use timestamp::format_timestamp;

#[cfg(test)]
pub use core::get_transaction;
