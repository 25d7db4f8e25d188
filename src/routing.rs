//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_api, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    customer::{
        create_customer_endpoint, get_customer_balance_endpoint, get_customer_page,
        get_customers_endpoint, search_customers_endpoint,
    },
    endpoints,
    export::export_excel,
    index_page::get_index_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_all_transactions_endpoint, get_customer_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_user),
        );

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CUSTOMER_PAGE, get(get_customer_page))
        .route(endpoints::EXPORT_EXCEL, get(export_excel))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // JSON routes respond with 401 instead of redirecting to the log-in page.
    let protected_api = Router::new()
        .route(endpoints::CUSTOMERS, get(get_customers_endpoint))
        .route(endpoints::ADD_CUSTOMER, post(create_customer_endpoint))
        .route(endpoints::SEARCH_CUSTOMERS, get(search_customers_endpoint))
        .route(
            endpoints::CUSTOMER_TRANSACTIONS,
            get(get_customer_transactions_endpoint),
        )
        .route(
            endpoints::CUSTOMER_BALANCE,
            get(get_customer_balance_endpoint),
        )
        .route(endpoints::ADD_TRANSACTION, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::ALL_TRANSACTIONS,
            get(get_all_transactions_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
