use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use pocket_ledger::{SessionId, Transaction, TransactionType, create_transaction, initialize_db};

/// A utility for creating a test database for the API server of pocket_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let session_id = SessionId::new_random();
    println!("Creating test transactions for session {session_id}...");

    let transactions = [
        (500, "Salary", TransactionType::Credit),
        (150, "Groceries", TransactionType::Debit),
        (20, "Refund", TransactionType::Credit),
    ];

    for (amount, description, transaction_type) in transactions {
        create_transaction(
            Transaction::build(amount, description, transaction_type)?,
            &session_id,
            &conn,
        )?;
    }

    println!("Success! Use the cookie sessionId={session_id} to see the transactions.");

    Ok(())
}
