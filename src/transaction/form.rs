//! Validation of the JSON body used to create a transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error,
    transaction::core::{MAX_AMOUNT, NewTransaction, TransactionType, ValidationIssue},
};

/// The JSON body for creating a transaction.
///
/// The fields are kept as raw JSON values so that every field can be checked
/// and all problems reported at once, instead of failing on the first type
/// mismatch like a typed deserialization would.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The unsigned amount, must be an integer.
    #[serde(default)]
    pub amount: Option<Value>,
    /// Text detailing the transaction, must not be empty.
    #[serde(default)]
    pub description: Option<Value>,
    /// Either "credit" or "debit".
    #[serde(default, rename = "type")]
    pub type_: Option<Value>,
}

impl TransactionForm {
    /// Check every field and build the transaction to store.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing each field that is missing or
    /// has an invalid value.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let mut issues = Vec::new();

        let amount = match self.amount {
            Some(Value::Number(number)) => match parse_whole_number(&number) {
                Some(amount) => Some(amount),
                None => {
                    issues.push(ValidationIssue::new(
                        "amount",
                        &format!("Expected a whole number between -{MAX_AMOUNT} and {MAX_AMOUNT}"),
                    ));
                    None
                }
            },
            Some(Value::Null) | None => {
                issues.push(ValidationIssue::new("amount", "Required"));
                None
            }
            Some(_) => {
                issues.push(ValidationIssue::new("amount", "Expected a number"));
                None
            }
        };

        let description = match self.description {
            Some(Value::String(description)) if description.trim().is_empty() => {
                issues.push(ValidationIssue::new(
                    "description",
                    "Description cannot be empty",
                ));
                None
            }
            Some(Value::String(description)) => Some(description),
            Some(Value::Null) | None => {
                issues.push(ValidationIssue::new("description", "Required"));
                None
            }
            Some(_) => {
                issues.push(ValidationIssue::new("description", "Expected a string"));
                None
            }
        };

        let transaction_type = match self.type_ {
            Some(Value::String(type_)) => match type_.parse::<TransactionType>() {
                Ok(transaction_type) => Some(transaction_type),
                Err(()) => {
                    issues.push(ValidationIssue::new(
                        "type",
                        &format!("Invalid enum value. Expected 'credit' | 'debit', received '{type_}'"),
                    ));
                    None
                }
            },
            Some(Value::Null) | None => {
                issues.push(ValidationIssue::new("type", "Required"));
                None
            }
            Some(_) => {
                issues.push(ValidationIssue::new("type", "Expected 'credit' | 'debit'"));
                None
            }
        };

        match (amount, description, transaction_type) {
            (Some(amount), Some(description), Some(transaction_type)) => {
                NewTransaction::new(amount, &description, transaction_type)
            }
            _ => Err(Error::Validation(issues)),
        }
    }
}

/// Read a JSON number as an integer amount.
///
/// Floats are accepted when they have no fractional part, e.g. `5.0`, since
/// JavaScript clients cannot tell them apart from integers. Returns `None`
/// for fractions and for numbers with a magnitude above [MAX_AMOUNT].
fn parse_whole_number(number: &serde_json::Number) -> Option<i64> {
    let amount = match number.as_i64() {
        Some(amount) => amount,
        None => {
            let float = number.as_f64()?;
            if !float.is_finite() || float.fract() != 0.0 || float.abs() > MAX_AMOUNT as f64 {
                return None;
            }
            float as i64
        }
    };

    (amount.unsigned_abs() <= MAX_AMOUNT as u64).then_some(amount)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        Error,
        transaction::{core::MAX_AMOUNT, form::TransactionForm},
    };

    fn parse(value: serde_json::Value) -> TransactionForm {
        serde_json::from_value(value).expect("could not parse form")
    }

    #[track_caller]
    fn assert_invalid_fields(form: TransactionForm, want_fields: &[&str]) {
        match form.validate() {
            Err(Error::Validation(issues)) => {
                let got_fields: Vec<&str> =
                    issues.iter().map(|issue| issue.field.as_str()).collect();
                assert_eq!(got_fields, want_fields);
            }
            other => panic!("want validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_credit() {
        let form = parse(json!({"amount": 500, "description": "Salary", "type": "credit"}));

        let transaction = form.validate().unwrap();

        assert_eq!(transaction.amount(), 500);
        assert_eq!(transaction.description(), "Salary");
    }

    #[test]
    fn valid_debit() {
        let form = parse(json!({"amount": 150, "description": "Groceries", "type": "debit"}));

        let transaction = form.validate().unwrap();

        assert_eq!(transaction.amount(), -150);
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let form = parse(json!({"amount": "500", "description": "Salary", "type": "credit"}));

        assert_invalid_fields(form, &["amount"]);
    }

    #[test]
    fn rejects_fractional_amount() {
        let form = parse(json!({"amount": 5.5, "description": "Salary", "type": "credit"}));

        assert_invalid_fields(form, &["amount"]);
    }

    #[test]
    fn accepts_float_without_fraction() {
        let form = parse(json!({"amount": 5.0, "description": "Salary", "type": "debit"}));

        let transaction = form.validate().unwrap();

        assert_eq!(transaction.amount(), -5);
    }

    #[test]
    fn rejects_amount_above_safe_integer_range() {
        for amount in [json!(MAX_AMOUNT + 1), json!(i64::MAX), json!(1e300)] {
            let form = parse(json!({"amount": amount, "description": "Lottery", "type": "credit"}));

            assert_invalid_fields(form, &["amount"]);
        }
    }

    #[test]
    fn accepts_amount_at_safe_integer_limit() {
        let form = parse(json!({"amount": MAX_AMOUNT, "description": "Lottery", "type": "credit"}));

        assert_eq!(form.validate().unwrap().amount(), MAX_AMOUNT);
    }

    #[test]
    fn rejects_missing_description() {
        let form = parse(json!({"amount": 500, "type": "credit"}));

        assert_invalid_fields(form, &["description"]);
    }

    #[test]
    fn rejects_empty_description() {
        let form = parse(json!({"amount": 500, "description": "", "type": "credit"}));

        assert_invalid_fields(form, &["description"]);
    }

    #[test]
    fn rejects_invalid_type() {
        let form = parse(json!({"amount": 500, "description": "Salary", "type": "income"}));

        assert_invalid_fields(form, &["type"]);
    }

    #[test]
    fn reports_every_invalid_field() {
        let form = parse(json!({"amount": true, "description": ""}));

        assert_invalid_fields(form, &["amount", "description", "type"]);
    }

    #[test]
    fn empty_body_reports_every_field() {
        let form = parse(json!({}));

        assert_invalid_fields(form, &["amount", "description", "type"]);
    }
}
