use api_types::transaction::NewTransaction;

use crate::{EngineError, MoneyCents, ResultEngine, TransactionType};

pub const MISSING_FIELDS: &str = "Please fill in all required fields: Account, Amount, and Location";

const DEFAULT_COUNTRY: &str = "USA";
const DEFAULT_CITY: &str = "Unknown";

/// Raw input of the "new transaction" form.
///
/// Scoring happens server-side, so only identifying and monetary fields are
/// collected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionForm {
    pub account_number: String,
    pub transaction_type: TransactionType,
    pub amount: String,
    pub location: String,
    pub country: String,
    pub city: String,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self {
            account_number: String::new(),
            transaction_type: TransactionType::Transfer,
            amount: String::new(),
            location: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            city: DEFAULT_CITY.to_string(),
        }
    }
}

impl SubmissionForm {
    /// Checks the form locally and builds the creation body.
    ///
    /// Nothing is sent when this fails.
    pub fn validate(&self) -> ResultEngine<NewTransaction> {
        let account_number = self.account_number.trim();
        let location = self.location.trim();
        if account_number.is_empty() || self.amount.trim().is_empty() || location.is_empty() {
            return Err(EngineError::Validation(MISSING_FIELDS.to_string()));
        }

        let amount: MoneyCents = self.amount.parse()?;
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }

        Ok(NewTransaction {
            account_number: account_number.to_string(),
            transaction_type: self.transaction_type.as_str().to_string(),
            amount: amount.to_major(),
            location: location.to_string(),
            country: non_blank_or(&self.country, DEFAULT_COUNTRY),
            city: non_blank_or(&self.city, DEFAULT_CITY),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SubmissionForm {
        SubmissionForm {
            account_number: " ACC009 ".to_string(),
            amount: "1250.5".to_string(),
            location: "Paris".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let form = SubmissionForm::default();
        assert_eq!(form.transaction_type, TransactionType::Transfer);
        assert_eq!(form.country, "USA");
        assert_eq!(form.city, "Unknown");
    }

    #[test]
    fn required_fields_are_checked_first() {
        for blank in ["account", "amount", "location"] {
            let mut form = filled();
            match blank {
                "account" => form.account_number = "  ".to_string(),
                "amount" => form.amount.clear(),
                _ => form.location.clear(),
            }
            assert_eq!(
                form.validate(),
                Err(EngineError::Validation(MISSING_FIELDS.to_string()))
            );
        }
    }

    #[test]
    fn bad_amounts_are_rejected() {
        let mut form = filled();
        form.amount = "twelve".to_string();
        assert!(matches!(form.validate(), Err(EngineError::InvalidAmount(_))));
        form.amount = "-5".to_string();
        assert!(matches!(form.validate(), Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn builds_trimmed_body() {
        let mut form = filled();
        form.city = "   ".to_string();
        let body = form.validate().unwrap();
        assert_eq!(body.account_number, "ACC009");
        assert_eq!(body.transaction_type, "TRANSFER");
        assert_eq!(body.amount, 1250.5);
        assert_eq!(body.country, "USA");
        assert_eq!(body.city, "Unknown");
    }

    #[test]
    fn clear_restores_defaults() {
        let mut form = filled();
        form.transaction_type = TransactionType::Deposit;
        form.clear();
        assert_eq!(form, SubmissionForm::default());
    }
}
