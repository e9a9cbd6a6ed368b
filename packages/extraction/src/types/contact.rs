//! Contact records produced by extraction and aggregation.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Classified contact details pulled out of one source text.
///
/// Every field is an ordered set: duplicates are dropped and first-seen order
/// is kept. `emergency_phones` and `phones` never share a number. The record
/// is built once through [`ContactRecord::new`] and is read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    emergency_phones: Vec<String>,
    phones: Vec<String>,
    emails: Vec<String>,
    addresses: Vec<String>,
}

impl ContactRecord {
    /// Build a record, deduplicating each field and removing from `phones`
    /// any number that is also an emergency phone.
    pub fn new<E, P, M, A>(emergency_phones: E, phones: P, emails: M, addresses: A) -> Self
    where
        E: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
        M: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
    {
        let emergency: IndexSet<String> = emergency_phones.into_iter().collect();
        let phones: IndexSet<String> = phones
            .into_iter()
            .filter(|p| !emergency.contains(p))
            .collect();

        Self {
            emergency_phones: emergency.into_iter().collect(),
            phones: phones.into_iter().collect(),
            emails: dedup(emails),
            addresses: dedup(addresses),
        }
    }

    /// An all-empty record.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn emergency_phones(&self) -> &[String] {
        &self.emergency_phones
    }

    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// True when no phone or email was found. Addresses alone do not count
    /// as a way to reach anyone.
    pub fn has_no_reachable_contact(&self) -> bool {
        self.emergency_phones.is_empty() && self.phones.is_empty() && self.emails.is_empty()
    }

    /// True when all four fields are empty.
    pub fn is_empty(&self) -> bool {
        self.has_no_reachable_contact() && self.addresses.is_empty()
    }
}

fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    values
        .into_iter()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Why a source produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTag {
    /// Machine tag: `fetch_failed`, `timeout`, `invalid_url` or `empty_page`
    pub kind: String,
    /// Human-readable detail
    pub message: String,
}

impl From<&FetchError> for ErrorTag {
    fn from(error: &FetchError) -> Self {
        Self {
            kind: error.tag().to_string(),
            message: error.to_string(),
        }
    }
}

/// Per-URL outcome of an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContactOutcome {
    Found { record: ContactRecord },
    Failed { error: ErrorTag },
}

impl ContactOutcome {
    /// The record, if the source was fetched.
    pub fn record(&self) -> Option<&ContactRecord> {
        match self {
            ContactOutcome::Found { record } => Some(record),
            ContactOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ContactOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_removes_emergency_numbers_from_phones() {
        let record = ContactRecord::new(
            strings(&["8005550123"]),
            strings(&["5551234567", "8005550123"]),
            vec![],
            vec![],
        );

        assert_eq!(record.emergency_phones(), &strings(&["8005550123"])[..]);
        assert_eq!(record.phones(), &strings(&["5551234567"])[..]);
    }

    #[test]
    fn test_new_dedupes_preserving_first_seen_order() {
        let record = ContactRecord::new(
            vec![],
            vec![],
            strings(&["b@x.org", "a@x.org", "b@x.org"]),
            strings(&["2 Elm St Springfield", "2 Elm St Springfield"]),
        );

        assert_eq!(record.emails(), &strings(&["b@x.org", "a@x.org"])[..]);
        assert_eq!(record.addresses().len(), 1);
    }

    #[test]
    fn test_addresses_do_not_count_as_reachable() {
        let record = ContactRecord::new(vec![], vec![], vec![], strings(&["PO Box 12, Town"]));
        assert!(record.has_no_reachable_contact());
        assert!(!record.is_empty());
    }
}
