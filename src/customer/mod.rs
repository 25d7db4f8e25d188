//! Customers are the people a user keeps a ledger for.
//!
//! This module contains the `Customer` model and its database functions, the
//! balance calculations, the JSON route handlers for customers, and the page
//! showing a single customer's ledger.

mod balance;
mod core;
mod create_endpoint;
mod customer_page;
mod list_endpoint;

pub use balance::{CustomerSummary, get_customer_balance_endpoint, get_customer_summaries};
pub use core::{
    Customer, CustomerId, create_customer, create_customer_table, delete_customer, get_customers,
    get_owned_customer, map_customer_row, search_customers,
};
pub use create_endpoint::create_customer_endpoint;
pub use customer_page::get_customer_page;
pub use list_endpoint::{SearchQuery, get_customers_endpoint, search_customers_endpoint};

#[cfg(test)]
pub use core::get_customer;
