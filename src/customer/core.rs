//! Defines the customer model and the database queries for customers.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{Error, auth::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a [Customer].
pub type CustomerId = i64;

/// A person that the user lends to or borrows from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    /// The ID of the customer.
    pub id: CustomerId,
    /// The customer's name.
    pub name: String,
    /// The customer's phone number, unique per user or across all users
    /// depending on [crate::PhoneUniqueness].
    pub phone: String,
    /// The user that owns this customer.
    #[serde(skip_serializing)]
    pub user_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the customer table in the database.
///
/// The unique index on phone numbers is created separately by
/// [crate::initialize_db] since its columns depend on configuration.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a customer owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicatePhone] if the phone number is already taken,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_customer(
    name: &str,
    phone: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Customer, Error> {
    connection
        .prepare(
            "INSERT INTO customer (name, phone, user_id) VALUES (?1, ?2, ?3)
             RETURNING id, name, phone, user_id",
        )?
        .query_row((name, phone, user_id.as_i64()), map_customer_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicatePhone,
            error => error.into(),
        })
}

/// Retrieve a customer from the database by its `id`, regardless of owner.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid customer,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_customer(id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    let customer = connection
        .prepare("SELECT id, name, phone, user_id FROM customer WHERE id = :id")?
        .query_one(&[(":id", &id)], map_customer_row)?;

    Ok(customer)
}

/// Retrieve the customer `id` and check that it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid customer,
/// - [Error::Forbidden] if the customer belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_owned_customer(
    id: CustomerId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Customer, Error> {
    let customer = get_customer(id, connection)?;

    if customer.user_id != user_id {
        tracing::warn!(
            "User {user_id} tried to access customer {id} owned by user {}.",
            customer.user_id
        );
        return Err(Error::Forbidden);
    }

    Ok(customer)
}

/// Get all of the customers owned by `user_id`, ordered by name.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_customers(user_id: UserID, connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare(
            "SELECT id, name, phone, user_id FROM customer
             WHERE user_id = :user_id
             ORDER BY name ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_customer_row)?
        .map(|maybe_customer| maybe_customer.map_err(Error::from))
        .collect()
}

/// Get the customers owned by `user_id` whose name or phone number contains
/// `query`, ordered by name.
///
/// The match is case-sensitive. An empty query matches every customer.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn search_customers(
    query: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Customer>, Error> {
    // instr is used over LIKE since LIKE ignores case for ASCII characters.
    connection
        .prepare(
            "SELECT id, name, phone, user_id FROM customer
             WHERE user_id = :user_id AND (instr(name, :query) > 0 OR instr(phone, :query) > 0 OR :query = '')
             ORDER BY name ASC, id ASC",
        )?
        .query_map(
            rusqlite::named_params! { ":user_id": user_id.as_i64(), ":query": query },
            map_customer_row,
        )?
        .map(|maybe_customer| maybe_customer.map_err(Error::from))
        .collect()
}

/// Delete the customer `id` owned by `user_id` along with all of its transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid customer,
/// - [Error::Forbidden] if the customer belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_customer(
    id: CustomerId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_owned_customer(id, user_id, connection)?;

    connection.execute(
        "DELETE FROM customer WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Map a database row to a [Customer].
///
/// Expects the columns `id, name, phone, user_id` in that order.
pub fn map_customer_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        user_id: UserID::new(row.get(3)?),
    })
}
