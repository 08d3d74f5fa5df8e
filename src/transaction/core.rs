//! Defines the core data models and database queries for transactions.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{Error, session::SessionId};

// ============================================================================
// MODELS
// ============================================================================

/// A credit or debit recorded by a client session.
///
/// Transactions are immutable once created. To create a new `Transaction`,
/// use [Transaction::build] and [create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the server.
    pub id: Uuid,
    /// The signed amount of money: positive for a credit, negative for a debit.
    pub amount: i64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The session that created the transaction.
    pub session_id: SessionId,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// `amount` is the unsigned amount entered by the client, the sign is
    /// applied according to `transaction_type`.
    ///
    /// Shortcut for [NewTransaction::new] for discoverability.
    pub fn build(
        amount: i64,
        description: &str,
        transaction_type: TransactionType,
    ) -> Result<NewTransaction, Error> {
        NewTransaction::new(amount, description, transaction_type)
    }
}

/// Whether money flowed into or out of the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money was earned, e.g. a salary payment.
    Credit,
    /// Money was spent, e.g. a grocery purchase.
    Debit,
}

impl TransactionType {
    /// Apply the sign convention for this type to `amount`.
    ///
    /// Credits keep the amount as is, debits negate it. Returns `None` if the
    /// negation would overflow.
    pub fn sign(self, amount: i64) -> Option<i64> {
        match self {
            TransactionType::Credit => Some(amount),
            TransactionType::Debit => amount.checked_neg(),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(()),
        }
    }
}

/// The largest magnitude accepted for an amount.
///
/// This is the largest integer a JSON number can hold without losing
/// precision in JavaScript clients (2^53 - 1). It also keeps the balance
/// of a session far away from the limits of `i64`.
pub const MAX_AMOUNT: i64 = (1 << 53) - 1;

/// A validated transaction that is ready to be stored.
///
/// The amount is already signed, so the original [TransactionType] is not
/// kept.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    amount: i64,
    description: String,
}

impl NewTransaction {
    /// Validate the parts of a new transaction and apply the sign convention.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if `description` is blank or if the
    /// magnitude of `amount` is larger than [MAX_AMOUNT].
    pub fn new(
        amount: i64,
        description: &str,
        transaction_type: TransactionType,
    ) -> Result<Self, Error> {
        let mut issues = Vec::new();

        let signed_amount = if amount.unsigned_abs() > MAX_AMOUNT as u64 {
            None
        } else {
            transaction_type.sign(amount)
        };
        if signed_amount.is_none() {
            issues.push(ValidationIssue::new(
                "amount",
                &format!("Amount must be between -{MAX_AMOUNT} and {MAX_AMOUNT}"),
            ));
        }

        if description.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "description",
                "Description cannot be empty",
            ));
        }

        match signed_amount {
            Some(amount) if issues.is_empty() => Ok(Self {
                amount,
                description: description.to_owned(),
            }),
            _ => Err(Error::Validation(issues)),
        }
    }

    /// The signed amount that will be stored.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// The description that will be stored.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A problem with a single field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The name of the field that failed validation.
    pub field: String,
    /// A human readable explanation of what is wrong with the field.
    pub message: String,
}

impl ValidationIssue {
    /// Create a validation issue for `field`.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a new transaction for `session_id`.
///
/// The ID is generated here and the creation time is set by the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let id = Uuid::new_v4();

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (id, amount, description, session_id)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount, description, session_id, created_at",
        )?
        .query_row(
            (
                id.to_string(),
                new_transaction.amount,
                new_transaction.description,
                session_id.as_str(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transactions created by `session_id` in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let transactions = connection
        .prepare(
            "SELECT id, amount, description, session_id, created_at FROM transactions
             WHERE session_id = :session_id
             ORDER BY rowid",
        )?
        .query_map(&[(":session_id", session_id.as_str())], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Retrieve the transaction with `id` if it was created by `session_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of this session,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: Uuid,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, description, session_id, created_at FROM transactions
             WHERE id = :id AND session_id = :session_id",
        )?
        .query_row(
            &[
                (":id", id.to_string().as_str()),
                (":session_id", session_id.as_str()),
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the sum of the amounts of the transactions created by `session_id`.
///
/// A session with no transactions has a balance of zero. The sum is done
/// here rather than with SQL `SUM`, which fails with a generic error when
/// the total leaves the range of `i64`.
///
/// # Errors
/// This function will return a:
/// - [Error::BalanceOutOfRange] if the total does not fit in an `i64`,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_balance(session_id: &SessionId, connection: &Connection) -> Result<i64, Error> {
    let mut statement =
        connection.prepare("SELECT amount FROM transactions WHERE session_id = :session_id")?;
    let mut rows = statement.query(&[(":session_id", session_id.as_str())])?;

    let mut balance: i64 = 0;
    while let Some(row) = rows.next()? {
        let amount: i64 = row.get(0)?;
        balance = balance
            .checked_add(amount)
            .ok_or(Error::BalanceOutOfRange)?;
    }

    Ok(balance)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                amount INTEGER NOT NULL,
                description TEXT NOT NULL,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(error)))?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let session_id: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let created_at = OffsetDateTime::parse(&created_at, &Rfc3339)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        amount,
        description,
        session_id: SessionId::new_unchecked(&session_id),
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use crate::{
        Error,
        transaction::{
            NewTransaction, Transaction, TransactionType, ValidationIssue, core::MAX_AMOUNT,
        },
    };

    #[test]
    fn credit_keeps_amount() {
        let transaction = Transaction::build(500, "Salary", TransactionType::Credit).unwrap();

        assert_eq!(transaction.amount(), 500);
    }

    #[test]
    fn debit_negates_amount() {
        let transaction = Transaction::build(150, "Groceries", TransactionType::Debit).unwrap();

        assert_eq!(transaction.amount(), -150);
    }

    #[test]
    fn zero_amount_is_allowed_for_both_types() {
        for transaction_type in [TransactionType::Credit, TransactionType::Debit] {
            let transaction = NewTransaction::new(0, "Nothing", transaction_type).unwrap();

            assert_eq!(transaction.amount(), 0);
        }
    }

    #[test]
    fn rejects_blank_description() {
        let result = NewTransaction::new(10, "   ", TransactionType::Credit);

        assert_eq!(
            result,
            Err(Error::Validation(vec![ValidationIssue::new(
                "description",
                "Description cannot be empty"
            )]))
        );
    }

    #[test]
    fn rejects_debit_that_overflows() {
        let result = NewTransaction::new(i64::MIN, "Overflow", TransactionType::Debit);

        assert!(
            matches!(result, Err(Error::Validation(ref issues)) if issues.len() == 1 && issues[0].field == "amount"),
            "want amount validation error, got {result:?}"
        );
    }

    #[test]
    fn accepts_amounts_up_to_the_limit() {
        let credit = NewTransaction::new(MAX_AMOUNT, "Max", TransactionType::Credit).unwrap();
        let debit = NewTransaction::new(MAX_AMOUNT, "Max", TransactionType::Debit).unwrap();

        assert_eq!(credit.amount(), MAX_AMOUNT);
        assert_eq!(debit.amount(), -MAX_AMOUNT);
    }

    #[test]
    fn rejects_amounts_past_the_limit() {
        for amount in [MAX_AMOUNT + 1, -MAX_AMOUNT - 1, i64::MAX] {
            let result = NewTransaction::new(amount, "Too much", TransactionType::Credit);

            assert!(
                matches!(result, Err(Error::Validation(ref issues)) if issues[0].field == "amount"),
                "want amount validation error for {amount}, got {result:?}"
            );
        }
    }

    #[test]
    fn parses_transaction_type() {
        assert_eq!("credit".parse::<TransactionType>(), Ok(TransactionType::Credit));
        assert_eq!("debit".parse::<TransactionType>(), Ok(TransactionType::Debit));
        assert_eq!("Credit".parse::<TransactionType>(), Err(()));
    }
}
