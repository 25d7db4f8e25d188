/*! Creates the application's database schema. */

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, PhoneUniqueness, auth::create_user_table, customer::create_customer_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// Foreign key enforcement is switched on for `connection`, which is what
/// makes deleting a customer cascade to its transactions. The unique index on
/// customer phone numbers is (re)created to match `phone_uniqueness`.
///
/// # Errors
/// Returns an [Error::SqlError] if any statement fails, e.g. when switching
/// to [PhoneUniqueness::Global] while two users have customers with the same
/// phone number.
pub fn initialize(connection: &Connection, phone_uniqueness: PhoneUniqueness) -> Result<(), Error> {
    // Must be set outside of a transaction, SQLite ignores it otherwise.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_customer_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_phone_index(&transaction, phone_uniqueness)?;

    transaction.commit()?;

    Ok(())
}

fn create_phone_index(
    connection: &Connection,
    phone_uniqueness: PhoneUniqueness,
) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "DROP INDEX IF EXISTS {}",
            phone_uniqueness.other().index_name()
        ),
        (),
    )?;

    connection.execute(
        &format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON customer({})",
            phone_uniqueness.index_name(),
            phone_uniqueness.index_columns()
        ),
        (),
    )?;

    Ok(())
}
