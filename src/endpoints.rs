//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/customer/{customer_id}/transactions', use [format_endpoint].

/// The overview page for logged in users.
pub const ROOT: &str = "/";
/// The route for the registration page and form.
pub const REGISTER: &str = "/register";
/// The route for the log-in page and form.
pub const LOG_IN: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";

/// The route to list the current user's customers.
pub const CUSTOMERS: &str = "/customers";
/// The route to create a customer.
pub const ADD_CUSTOMER: &str = "/add_customer";
/// The route to search the current user's customers by name or phone.
pub const SEARCH_CUSTOMERS: &str = "/search_customers";
/// The page showing a single customer's ledger.
pub const CUSTOMER_PAGE: &str = "/customer/{customer_id}";
/// The route to list the transactions of a single customer.
pub const CUSTOMER_TRANSACTIONS: &str = "/customer/{customer_id}/transactions";
/// The route to get the credit, debit and balance of a single customer.
pub const CUSTOMER_BALANCE: &str = "/customer/{customer_id}/balance";

/// The route to create a transaction.
pub const ADD_TRANSACTION: &str = "/add_transaction";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/transaction/{transaction_id}";
/// The route to list every transaction of the current user with customer details.
pub const ALL_TRANSACTIONS: &str = "/get_all_transactions_data";
/// The route to download all transactions as an Excel workbook.
pub const EXPORT_EXCEL: &str = "/export_excel";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/transaction/{transaction_id}', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
