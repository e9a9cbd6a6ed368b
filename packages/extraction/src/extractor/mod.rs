//! Deterministic contact extraction.
//!
//! [`extract`] runs four independent passes over the same text and folds the
//! results into a [`ContactRecord`]. Nothing here performs I/O and nothing
//! can fail: text without contacts yields an empty record.
//!
//! ```rust
//! use contact_extraction::extract;
//!
//! let record = extract("Emergency Hotline: (800) 555-0123\nOffice: 612-555-0199");
//! assert_eq!(record.emergency_phones(), &["8005550123".to_string()]);
//! assert_eq!(record.phones(), &["6125550199".to_string()]);
//! ```

mod addresses;
mod emails;
mod phones;

pub use phones::normalize as normalize_phone;

use crate::types::ContactRecord;

/// Extract classified contacts from raw markdown or plain text.
pub fn extract(text: &str) -> ContactRecord {
    if text.trim().is_empty() {
        return ContactRecord::empty();
    }

    let emergency = phones::emergency_phones(text);
    let standard = phones::standard_phones(text, &emergency);

    ContactRecord::new(
        emergency,
        standard,
        emails::emails(text),
        addresses::addresses(text),
    )
}

/// [`extract`] for text that may be missing altogether.
pub fn extract_opt(text: Option<&str>) -> ContactRecord {
    text.map(extract).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_missing_text() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t").is_empty());
        assert!(extract_opt(None).is_empty());
    }

    #[test]
    fn test_full_page() {
        let page = "\
# County Flood Response

Emergency Hotline: (800) 555-0123
General questions: 612-555-0199 or floods@county.mn.us

**Shelter Address**
400 Civic Center Dr
Saint Paul, MN 55102

Updated 2024-05-01";

        let record = extract(page);

        assert_eq!(record.emergency_phones(), &["8005550123".to_string()]);
        assert_eq!(record.phones(), &["6125550199".to_string()]);
        assert_eq!(record.emails(), &["floods@county.mn.us".to_string()]);
        assert_eq!(record.addresses().len(), 1);
        assert!(record.addresses()[0].contains("400 Civic Center Dr"));
        assert!(record.addresses()[0].contains("55102"));
    }
}
