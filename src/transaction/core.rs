//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    customer::{CustomerId, get_owned_customer},
    transaction::timestamp,
};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a [Transaction].
pub type TransactionId = i64;

/// Money given to or received from a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The customer the transaction belongs to.
    pub customer_id: CustomerId,
    /// The amount of money. The sign is not checked against the type.
    pub amount: f64,
    /// An open tag for the kind of transaction, usually "credit" or "debit".
    #[serde(rename = "type")]
    pub kind: String,
    /// A free text note, may be empty.
    pub description: String,
    /// When the transaction was recorded, in UTC.
    #[serde(serialize_with = "timestamp::serialize")]
    pub timestamp: OffsetDateTime,
}

/// The fields a client provides for a new transaction.
///
/// The ID and timestamp are assigned on insert, see [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub customer_id: CustomerId,
    pub amount: f64,
    pub kind: String,
    pub description: String,
}

/// The fields of a transaction that may be changed after it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub amount: f64,
    pub kind: String,
    pub description: String,
}

/// A transaction together with the name and phone number of its customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTransaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub timestamp: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Rows are deleted along with their customer.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL,
                FOREIGN KEY(customer_id) REFERENCES customer(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used for listing a customer's transactions newest first.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_customer_timestamp
         ON \"transaction\"(customer_id, timestamp);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction recorded at `timestamp`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the customer does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    timestamp: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (customer_id, amount, type, description, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, customer_id, amount, type, description, timestamp",
        )?
        .query_row(
            (
                new_transaction.customer_id,
                new_transaction.amount,
                new_transaction.kind,
                new_transaction.description,
                timestamp,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, customer_id, amount, type, description, timestamp
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve the transaction `id` and check that its customer belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::Forbidden] if the transaction's customer belongs to another user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_owned_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection)?;
    get_owned_customer(transaction.customer_id, user_id, connection)?;

    Ok(transaction)
}

/// Overwrite the amount, type and description of the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET amount = ?1, type = ?2, description = ?3 WHERE id = ?4",
        (update.amount, update.kind, update.description, id),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Delete the transaction `id`. The customer is left untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Get the transactions of the customer `customer_id`, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_customer_transactions(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, customer_id, amount, type, description, timestamp
             FROM \"transaction\"
             WHERE customer_id = :customer_id
             ORDER BY timestamp DESC, id DESC",
        )?
        .query_map(&[(":customer_id", &customer_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get every transaction of every customer owned by `user_id` with the
/// customer's name and phone number, newest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CustomerTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.customer_id, c.name, c.phone, t.amount, t.type, t.description, t.timestamp
             FROM \"transaction\" t
             INNER JOIN customer c ON c.id = t.customer_id
             WHERE c.user_id = :user_id
             ORDER BY t.timestamp DESC, t.id DESC",
        )?
        .query_map(
            &[(":user_id", &user_id.as_i64())],
            map_customer_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Map a database row to a [Transaction].
///
/// Expects the columns `id, customer_id, amount, type, description, timestamp` in that order.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        description: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

fn map_customer_transaction_row(row: &Row) -> Result<CustomerTransaction, rusqlite::Error> {
    Ok(CustomerTransaction {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        amount: row.get(4)?,
        kind: row.get(5)?,
        description: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        Error, PhoneUniqueness, UserID,
        auth::{PasswordHash, create_user},
        customer::{Customer, create_customer, delete_customer, get_customer},
        initialize_db,
    };

    use super::{
        NewTransaction, Transaction, TransactionUpdate, create_transaction, delete_transaction,
        get_all_transactions, get_customer_transactions, get_owned_transaction, get_transaction,
        update_transaction,
    };

    struct Fixture {
        connection: Connection,
        asha: UserID,
        bala: UserID,
        ravi: Customer,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection, PhoneUniqueness::PerUser).unwrap();
        let asha = create_user("asha", PasswordHash::new_unchecked("x"), &connection)
            .unwrap()
            .id;
        let bala = create_user("bala", PasswordHash::new_unchecked("y"), &connection)
            .unwrap()
            .id;
        let ravi = create_customer("Ravi", "9990001111", asha, &connection).unwrap();

        Fixture {
            connection,
            asha,
            bala,
            ravi,
        }
    }

    fn new_transaction(customer_id: i64, amount: f64, kind: &str) -> NewTransaction {
        NewTransaction {
            customer_id,
            amount,
            kind: kind.to_owned(),
            description: "loan".to_owned(),
        }
    }

    fn count_transactions(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn create_transaction_returns_stored_row() {
        let fixture = get_fixture();
        let timestamp = datetime!(2025-03-01 09:30:00 UTC);

        let transaction = create_transaction(
            new_transaction(fixture.ravi.id, 500.0, "credit"),
            timestamp,
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(
            transaction,
            Transaction {
                id: transaction.id,
                customer_id: fixture.ravi.id,
                amount: 500.0,
                kind: "credit".to_owned(),
                description: "loan".to_owned(),
                timestamp,
            }
        );
        assert_eq!(
            get_transaction(transaction.id, &fixture.connection),
            Ok(transaction)
        );
    }

    #[test]
    fn create_transaction_fails_for_unknown_customer() {
        let fixture = get_fixture();

        let result = create_transaction(
            new_transaction(fixture.ravi.id + 1, 1.0, "credit"),
            OffsetDateTime::now_utc(),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn customer_transactions_are_newest_first() {
        let fixture = get_fixture();
        let start = datetime!(2025-03-01 09:30:00 UTC);
        let mut want = Vec::new();
        for (offset, amount) in [(0, 1.0), (2, 2.0), (1, 3.0)] {
            want.push(
                create_transaction(
                    new_transaction(fixture.ravi.id, amount, "credit"),
                    start + Duration::hours(offset),
                    &fixture.connection,
                )
                .unwrap(),
            );
        }
        want.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let got = get_customer_transactions(fixture.ravi.id, &fixture.connection).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn equal_timestamps_are_ordered_by_id() {
        let fixture = get_fixture();
        let timestamp = datetime!(2025-03-01 09:30:00 UTC);
        let first = create_transaction(
            new_transaction(fixture.ravi.id, 1.0, "credit"),
            timestamp,
            &fixture.connection,
        )
        .unwrap();
        let second = create_transaction(
            new_transaction(fixture.ravi.id, 2.0, "debit"),
            timestamp,
            &fixture.connection,
        )
        .unwrap();

        let got = get_customer_transactions(fixture.ravi.id, &fixture.connection).unwrap();

        assert_eq!(got, vec![second, first]);
    }

    #[test]
    fn update_transaction_overwrites_fields() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            new_transaction(fixture.ravi.id, 500.0, "credit"),
            OffsetDateTime::now_utc(),
            &fixture.connection,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            TransactionUpdate {
                amount: 450.0,
                kind: "debit".to_owned(),
                description: String::new(),
            },
            &fixture.connection,
        )
        .unwrap();

        let got = get_transaction(transaction.id, &fixture.connection).unwrap();
        assert_eq!(got.amount, 450.0);
        assert_eq!(got.kind, "debit");
        assert_eq!(got.description, "");
        assert_eq!(got.timestamp, transaction.timestamp);
    }

    #[test]
    fn update_unknown_transaction_is_not_found() {
        let fixture = get_fixture();

        let result = update_transaction(
            42,
            TransactionUpdate {
                amount: 1.0,
                kind: "credit".to_owned(),
                description: String::new(),
            },
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_keeps_customer() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            new_transaction(fixture.ravi.id, 500.0, "credit"),
            OffsetDateTime::now_utc(),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(transaction.id, &fixture.connection), Ok(()));

        assert_eq!(
            get_transaction(transaction.id, &fixture.connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_customer(fixture.ravi.id, &fixture.connection),
            Ok(fixture.ravi.clone())
        );
        assert_eq!(
            delete_transaction(transaction.id, &fixture.connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn deleting_customer_deletes_its_transactions() {
        let fixture = get_fixture();
        let other = create_customer("Meera", "888", fixture.asha, &fixture.connection).unwrap();
        for customer_id in [fixture.ravi.id, fixture.ravi.id, other.id] {
            create_transaction(
                new_transaction(customer_id, 10.0, "credit"),
                OffsetDateTime::now_utc(),
                &fixture.connection,
            )
            .unwrap();
        }

        delete_customer(fixture.ravi.id, fixture.asha, &fixture.connection).unwrap();

        assert_eq!(
            get_customer_transactions(fixture.ravi.id, &fixture.connection).unwrap(),
            Vec::<Transaction>::new()
        );
        assert_eq!(count_transactions(&fixture.connection), 1);
    }

    #[test]
    fn get_owned_transaction_checks_owner() {
        let fixture = get_fixture();
        let transaction = create_transaction(
            new_transaction(fixture.ravi.id, 500.0, "credit"),
            OffsetDateTime::now_utc(),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(
            get_owned_transaction(transaction.id, fixture.asha, &fixture.connection),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_owned_transaction(transaction.id, fixture.bala, &fixture.connection),
            Err(Error::Forbidden)
        );
        assert_eq!(
            get_owned_transaction(transaction.id + 1, fixture.asha, &fixture.connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn all_transactions_are_scoped_to_user() {
        let fixture = get_fixture();
        let meera = create_customer("Meera", "888", fixture.bala, &fixture.connection).unwrap();
        let start = datetime!(2025-03-01 09:30:00 UTC);
        let older = create_transaction(
            new_transaction(fixture.ravi.id, 500.0, "credit"),
            start,
            &fixture.connection,
        )
        .unwrap();
        let newer = create_transaction(
            new_transaction(fixture.ravi.id, 150.0, "debit"),
            start + Duration::minutes(5),
            &fixture.connection,
        )
        .unwrap();
        create_transaction(
            new_transaction(meera.id, 99.0, "credit"),
            start,
            &fixture.connection,
        )
        .unwrap();

        let got = get_all_transactions(fixture.asha, &fixture.connection).unwrap();

        let ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(got.iter().all(|transaction| transaction.name == "Ravi"
            && transaction.phone == "9990001111"));
    }

    #[test]
    fn transaction_serializes_type_and_timestamp() {
        let transaction = Transaction {
            id: 1,
            customer_id: 2,
            amount: 500.0,
            kind: "credit".to_owned(),
            description: "loan".to_owned(),
            timestamp: datetime!(2025-03-01 09:30:00.5 UTC),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], "credit");
        assert_eq!(json["timestamp"], "2025-03-01 09:30:00");
        assert!(json.get("kind").is_none());
    }
}
