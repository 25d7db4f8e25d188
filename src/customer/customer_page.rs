//! The ledger page for a single customer, with forms for recording, editing
//! and deleting their transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    customer::{Customer, CustomerId, get_owned_customer},
    endpoints::{self, format_endpoint},
    html::{base, format_currency, transaction_type_select},
    internal_server_error::render_page_error,
    not_found::get_404_not_found,
    transaction::{Transaction, format_timestamp, get_customer_transactions},
};

use super::balance::{Balance, get_customer_balance};

/// The state needed for the [get_customer_page] route handler.
#[derive(Debug, Clone)]
pub struct CustomerPageState {
    /// The database connection for reading the customer and their transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct Ledger {
    customer: Customer,
    balance: Balance,
    transactions: Vec<Transaction>,
}

fn load_ledger(
    customer_id: CustomerId,
    user_id: UserID,
    state: &CustomerPageState,
) -> Result<Ledger, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let customer = get_owned_customer(customer_id, user_id, &connection)?;

    Ok(Ledger {
        balance: get_customer_balance(customer.id, &connection)?,
        transactions: get_customer_transactions(customer.id, &connection)?,
        customer,
    })
}

/// Renders the balance and transactions of one of the user's customers.
///
/// Customers of other users are shown as not found.
pub async fn get_customer_page(
    State(state): State<CustomerPageState>,
    Extension(user_id): Extension<UserID>,
    Path(customer_id): Path<CustomerId>,
) -> Response {
    match load_ledger(customer_id, user_id, &state) {
        Ok(ledger) => ledger_view(&ledger).into_response(),
        Err(Error::NotFound | Error::Forbidden) => get_404_not_found().await,
        Err(error) => render_page_error("load the customer", error),
    }
}

fn add_transaction_form(customer_id: CustomerId) -> Markup {
    html! {
        form class="inline-form" data-endpoint=(endpoints::ADD_TRANSACTION)
        {
            input type="hidden" name="customer_id" value=(customer_id) data-number;

            label for="amount" { "Amount" }
            input type="number" name="amount" id="amount" min="0" step="0.01" required;

            label for="type" { "Type" }
            (transaction_type_select(Some("type"), None))

            label for="description" { "Description" }
            input type="text" name="description" id="description";

            button type="submit" { "Record" }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html! {
        tr
        {
            td { (format_timestamp(&transaction.timestamp).unwrap_or_default()) }

            td
            {
                form class="inline-form" data-endpoint=(endpoint) data-method="PUT"
                {
                    input
                        type="number"
                        name="amount"
                        aria-label="Amount"
                        min="0"
                        step="0.01"
                        value=(transaction.amount)
                        required;

                    (transaction_type_select(None, Some(&transaction.kind)))

                    input
                        type="text"
                        name="description"
                        aria-label="Description"
                        value=(transaction.description);

                    button type="submit" { "Save" }
                }
            }

            td
            {
                form
                    data-endpoint=(endpoint)
                    data-method="DELETE"
                    data-confirm="Delete this transaction?"
                {
                    button type="submit" { "Delete" }
                }
            }
        }
    }
}

fn ledger_view(ledger: &Ledger) -> Markup {
    let Ledger {
        customer,
        balance,
        transactions,
    } = ledger;

    let content = html! {
        main
        {
            header
            {
                nav { a href=(endpoints::ROOT) { "All customers" } }
                h1 { (customer.name) }
                p { (customer.phone) }
            }

            dl class="totals"
            {
                dt { "Credit" }
                dd class="amount" { (format_currency(balance.credit)) }
                dt { "Debit" }
                dd class="amount" { (format_currency(balance.debit)) }
                dt { "Balance" }
                dd class="amount" { (format_currency(balance.balance)) }
            }

            section
            {
                h2 { "Record a transaction" }
                (add_transaction_form(customer.id))
            }

            table
            {
                thead
                {
                    tr
                    {
                        th { "When" }
                        th { "Amount, type and description" }
                        th {}
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td colspan="3" { "No transactions yet." }
                        }
                    }
                }
            }
        }
    };

    base(&customer.name, &content)
}
