//! Exports the logged in user's transactions as an Excel workbook.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::{
    AppState, Error, UserID,
    app_state::lock_connection,
    internal_server_error::render_page_error,
    transaction::{CustomerTransaction, format_timestamp, get_all_transactions},
};

/// The name of the only worksheet in the export.
pub const SHEET_NAME: &str = "Khata_Data";
/// The header row of the export, in column order.
pub const EXPORT_COLUMNS: [&str; 6] = ["name", "phone", "amount", "type", "description", "timestamp"];
/// The file name suggested to the browser.
pub const EXPORT_FILE_NAME: &str = "khata_data.xlsx";
/// The MIME type of `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

impl From<XlsxError> for Error {
    fn from(value: XlsxError) -> Self {
        Error::SpreadsheetError(value.to_string())
    }
}

/// Write `transactions` to a workbook with a header row followed by one row per transaction.
///
/// Values are written as is: amounts as numbers and timestamps as
/// "YYYY-MM-DD HH:MM:SS" text.
///
/// # Errors
/// Returns an [Error::SpreadsheetError] if the workbook could not be written.
pub fn write_workbook(transactions: &[CustomerTransaction]) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, column_name) in (0u16..).zip(EXPORT_COLUMNS) {
        worksheet.write_string(0, col, column_name)?;
    }

    for (row, transaction) in (1u32..).zip(transactions) {
        let timestamp = format_timestamp(&transaction.timestamp)
            .map_err(|error| Error::SpreadsheetError(error.to_string()))?;

        worksheet.write_string(row, 0, &transaction.name)?;
        worksheet.write_string(row, 1, &transaction.phone)?;
        worksheet.write_number(row, 2, transaction.amount)?;
        worksheet.write_string(row, 3, &transaction.kind)?;
        worksheet.write_string(row, 4, &transaction.description)?;
        worksheet.write_string(row, 5, &timestamp)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn export_transactions(user_id: UserID, state: &ExportState) -> Result<Vec<u8>, Error> {
    let transactions = {
        let connection = lock_connection(&state.db_connection)?;
        get_all_transactions(user_id, &connection)?
    };

    tracing::info!(
        "Exporting {} transactions for user {user_id}.",
        transactions.len()
    );

    write_workbook(&transactions)
}

/// A route handler that sends all of the user's transactions as a `.xlsx` download.
pub async fn export_excel(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match export_transactions(user_id, &state) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => render_page_error("export transactions", error),
    }
}
