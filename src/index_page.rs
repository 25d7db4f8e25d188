//! Displays the logged in user's customers and how much each of them owes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    app_state::lock_connection,
    customer::{CustomerSummary, SearchQuery, get_customer_summaries},
    endpoints::{self, format_endpoint},
    html::{base, format_currency},
    internal_server_error::render_page_error,
};

/// The state needed for the [get_index_page] route handler.
#[derive(Debug, Clone)]
pub struct IndexState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for IndexState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the overview page with the user's customers and their balances.
///
/// A non-empty `query` only lists customers whose name or phone contains it.
pub async fn get_index_page(
    State(state): State<IndexState>,
    Extension(user): Extension<User>,
    Query(search): Query<SearchQuery>,
) -> Response {
    let summaries = match load_summaries(&user, &search.query, &state) {
        Ok(summaries) => summaries,
        Err(error) => return render_page_error("load your customers", error),
    };

    index_view(&user.username, &search.query, &summaries).into_response()
}

fn load_summaries(
    user: &User,
    query: &str,
    state: &IndexState,
) -> Result<Vec<CustomerSummary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_customer_summaries(user.id, query, &connection)
}

fn add_customer_form() -> Markup {
    html! {
        form class="inline-form" data-endpoint=(endpoints::ADD_CUSTOMER)
        {
            label for="name" { "Name" }
            input type="text" name="name" id="name" required;

            label for="phone" { "Phone" }
            input type="tel" name="phone" id="phone" required;

            button type="submit" { "Add customer" }
        }
    }
}

fn search_form(query: &str) -> Markup {
    html! {
        form class="inline-form" method="get" action=(endpoints::ROOT) role="search"
        {
            input
                type="search"
                name="query"
                aria-label="Search by name or phone"
                placeholder="Search by name or phone"
                value=(query);

            button type="submit" { "Search" }
        }
    }
}

fn index_view(username: &str, query: &str, summaries: &[CustomerSummary]) -> Markup {
    let content = html! {
        main
        {
            header
            {
                h1 { "Namaste, " (username) }

                nav
                {
                    a href=(endpoints::EXPORT_EXCEL) { "Export to Excel" }
                    " | "
                    a href=(endpoints::LOG_OUT) { "Log out" }
                }
            }

            section
            {
                h2 { "Add a customer" }
                (add_customer_form())
            }

            (search_form(query))

            table
            {
                thead
                {
                    tr
                    {
                        th { "Name" }
                        th { "Phone" }
                        th class="amount" { "Balance" }
                    }
                }

                tbody
                {
                    @for summary in summaries {
                        tr
                        {
                            th scope="row"
                            {
                                a href=(format_endpoint(endpoints::CUSTOMER_PAGE, summary.customer.id))
                                {
                                    (summary.customer.name)
                                }
                            }
                            td { (summary.customer.phone) }
                            td class="amount" { (format_currency(summary.balance)) }
                        }
                    }

                    @if summaries.is_empty() {
                        tr
                        {
                            td colspan="3"
                            {
                                @if query.is_empty() {
                                    "No customers yet. Add one above to start keeping your khata."
                                } @else {
                                    "No customers match \"" (query) "\"."
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Customers", &content)
}
