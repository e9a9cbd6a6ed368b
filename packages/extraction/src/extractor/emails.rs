use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Email pattern - RFC 5322 simplified
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").unwrap();
}

/// Email addresses in order of first appearance.
pub fn emails(text: &str) -> Vec<String> {
    let found: IndexSet<String> = EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_detection() {
        let found = emails("Write to help@redcross.org or INFO@Shelter.MN.us, help@redcross.org");
        assert_eq!(found, vec!["help@redcross.org", "INFO@Shelter.MN.us"]);
    }

    #[test]
    fn test_no_false_positive_on_handles() {
        assert!(emails("Follow @floodwatch on social media").is_empty());
    }
}
