use engine::submission::SubmissionForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Account,
    Type,
    Amount,
    Location,
    Country,
    City,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        Self::Account,
        Self::Type,
        Self::Amount,
        Self::Location,
        Self::Country,
        Self::City,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Type => "Type",
            Self::Amount => "Amount",
            Self::Location => "Location",
            Self::Country => "Country",
            Self::City => "City",
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The open "new transaction" overlay.
#[derive(Debug, Clone)]
pub struct FormState {
    pub form: SubmissionForm,
    pub focus: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            form: SubmissionForm::default(),
            focus: FormField::Account,
            error: None,
            submitting: false,
        }
    }
}

impl FormState {
    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Account => self.form.account_number.as_str(),
            FormField::Type => self.form.transaction_type.as_str(),
            FormField::Amount => self.form.amount.as_str(),
            FormField::Location => self.form.location.as_str(),
            FormField::Country => self.form.country.as_str(),
            FormField::City => self.form.city.as_str(),
        }
    }

    /// Typing on the type field cycles through the transaction types.
    pub fn input(&mut self, ch: char) {
        match self.focus {
            FormField::Type => {
                self.form.transaction_type = self.form.transaction_type.next();
            }
            field => {
                if let Some(text) = self.text_mut(field) {
                    text.push(ch);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut(self.focus) {
            text.pop();
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Account => Some(&mut self.form.account_number),
            FormField::Amount => Some(&mut self.form.amount),
            FormField::Location => Some(&mut self.form.location),
            FormField::Country => Some(&mut self.form.country),
            FormField::City => Some(&mut self.form.city),
            FormField::Type => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::TransactionType;

    use super::*;

    #[test]
    fn typing_fills_focused_field() {
        let mut state = FormState::default();
        for ch in "ACC1".chars() {
            state.input(ch);
        }
        state.backspace();
        state.next_field();
        state.input(' ');
        state.next_field();
        state.input('9');

        assert_eq!(state.form.account_number, "ACC");
        assert_eq!(state.form.transaction_type, TransactionType::Purchase);
        assert_eq!(state.form.amount, "9");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut state = FormState::default();
        state.prev_field();
        assert_eq!(state.focus, FormField::City);
        state.next_field();
        assert_eq!(state.focus, FormField::Account);
    }
}
