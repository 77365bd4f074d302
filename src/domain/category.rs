use super::{Field, ValidationError};

/// Categories offered by default when prompting for a new expense.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Shopping",
    "Education",
    "Other",
];

/// Longest accepted category label, in characters.
pub const MAX_CATEGORY_LEN: usize = 40;

/// Decides which category labels a ledger accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Any non-empty label.
    #[default]
    FreeText,
    /// Only labels from the given set. Matching ignores case and the
    /// canonical spelling from the set is stored.
    Restricted(Vec<String>),
}

impl CategoryPolicy {
    pub fn restricted_to_defaults() -> Self {
        CategoryPolicy::Restricted(DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect())
    }

    /// Validate a label and return the form that should be stored.
    pub fn normalize(&self, raw: &str) -> Result<String, ValidationError> {
        let label = raw.trim();
        if label.is_empty() {
            return Err(ValidationError::single(
                Field::Category,
                "category must not be empty",
            ));
        }
        if label.chars().count() > MAX_CATEGORY_LEN {
            return Err(ValidationError::single(
                Field::Category,
                format!("category is longer than {} characters", MAX_CATEGORY_LEN),
            ));
        }

        match self {
            CategoryPolicy::FreeText => Ok(label.to_string()),
            CategoryPolicy::Restricted(allowed) => allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(label))
                .cloned()
                .ok_or_else(|| {
                    ValidationError::single(
                        Field::Category,
                        format!("unknown category '{}' (expected one of: {})", label, allowed.join(", ")),
                    )
                }),
        }
    }

    /// Resolve a prompt answer that may be a 1-based index into `choices`.
    pub fn resolve_choice(&self, answer: &str, choices: &[String]) -> Result<String, ValidationError> {
        let answer = answer.trim();
        if let Ok(index) = answer.parse::<usize>() {
            return match index.checked_sub(1).and_then(|i| choices.get(i)) {
                Some(choice) => self.normalize(choice),
                None => Err(ValidationError::single(
                    Field::Category,
                    format!("choice {} is out of range (1-{})", index, choices.len()),
                )),
            };
        }
        self.normalize(answer)
    }
}
