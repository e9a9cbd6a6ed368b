//! Postal address pass.
//!
//! Crawled pages rarely delimit addresses, so the pass looks for structural
//! evidence at every stage:
//!
//! 1. line classification: a line that looks like the start of an address
//!    (street number, street type, ZIP, Canadian postal code, PO Box, or a
//!    bolded `**Mailing Address**` style header) opens a block;
//! 2. block assembly: following lines that read like address continuations
//!    join the block, while a blank or markup-only line closes it;
//! 3. re-splitting on wide whitespace gaps, which is how table columns
//!    survive markdown conversion;
//! 4. validation: a segment must be longer than 15 characters and carry a
//!    number followed by a word, a PO Box, or a Canadian postal code.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

const MIN_ADDRESS_CHARS: usize = 15;

lazy_static! {
    static ref ADDRESS_START: Vec<Regex> = vec![
        Regex::new(r"^\d+\s+\w+").unwrap(),
        Regex::new(concat!(
            r"(?i)\b(?:St|Ave|Rd|Blvd|Ln|Cir|Dr|Ct|Pl|Sq|",
            r"Street|Avenue|Road|Boulevard|Lane|Circle|Drive|Court|Place|Square)\b",
        ))
        .unwrap(),
        Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap(),
        CANADIAN_POSTAL.clone(),
        PO_BOX.clone(),
        Regex::new(r"(?i)^\*\*\w+\s+Address\*\*").unwrap(),
    ];

    static ref CANADIAN_POSTAL: Regex =
        Regex::new(r"\b[A-Za-z]\d[A-Za-z][ -]?\d[A-Za-z]\d\b").unwrap();
    static ref PO_BOX: Regex = Regex::new(r"(?i)\bP\.?\s?O\.?\s+Box\b").unwrap();

    // Blank-looking lines: list markers, rules, stray punctuation
    static ref MARKUP_ONLY: Regex = Regex::new(r"^[\s\-*_=#>|•·.,:;~`]+$").unwrap();

    static ref STARTS_WITH_WORD: Regex = Regex::new(r"^\w").unwrap();
    static ref LETTER_TOKEN: Regex = Regex::new(r"[A-Za-z]\b").unwrap();
    static ref WIDE_GAP: Regex = Regex::new(r"\s{10,}").unwrap();
    static ref NUMBER_THEN_WORD: Regex = Regex::new(r"\d+\s+\w+").unwrap();
}

/// Postal addresses in order of first appearance.
pub fn addresses(text: &str) -> Vec<String> {
    let found: IndexSet<String> = blocks(text)
        .iter()
        .flat_map(|block| WIDE_GAP.split(block).map(str::trim).collect::<Vec<_>>())
        .filter(|segment| is_valid_address(segment))
        .map(str::to_string)
        .collect();
    found.into_iter().collect()
}

/// Assemble candidate blocks, each joined with single spaces.
fn blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();

        if line.is_empty() || MARKUP_ONLY.is_match(line) {
            flush(&mut current, &mut blocks);
            continue;
        }

        if is_address_start(line) {
            current.push(line);
        } else if !current.is_empty() && continues_block(line) {
            current.push(line);
        } else {
            flush(&mut current, &mut blocks);
        }
    }

    flush(&mut current, &mut blocks);
    blocks
}

fn flush(current: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if !current.is_empty() {
        blocks.push(current.join(" "));
        current.clear();
    }
}

fn is_address_start(line: &str) -> bool {
    ADDRESS_START.iter().any(|pattern| pattern.is_match(line))
}

fn continues_block(line: &str) -> bool {
    STARTS_WITH_WORD.is_match(line) || LETTER_TOKEN.is_match(line)
}

fn is_valid_address(segment: &str) -> bool {
    segment.chars().count() > MIN_ADDRESS_CHARS
        && (NUMBER_THEN_WORD.is_match(segment)
            || PO_BOX.is_match(segment)
            || CANADIAN_POSTAL.is_match(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_line_address_merges() {
        let found = addresses("123 Main St\nAnytown, ST 90210");
        assert_eq!(found, vec!["123 Main St Anytown, ST 90210"]);
    }

    #[test]
    fn test_blank_line_ends_block() {
        let found = addresses("123 Main St, Anytown\n\nOpen daily for walk-ins");
        assert_eq!(found, vec!["123 Main St, Anytown"]);
    }

    #[test]
    fn test_bold_header_starts_block() {
        let text = "**Mailing Address**\nPO Box 4410\nMinneapolis, MN 55401\n---\nMore text";
        let found = addresses(text);
        assert_eq!(
            found,
            vec!["**Mailing Address** PO Box 4410 Minneapolis, MN 55401"]
        );
    }

    #[test]
    fn test_columns_are_split() {
        let text = "450 Oak Ave, Houston TX          900 Pine Rd, Houston TX";
        let found = addresses(text);
        assert_eq!(found, vec!["450 Oak Ave, Houston TX", "900 Pine Rd, Houston TX"]);
    }

    #[test]
    fn test_canadian_postal_code() {
        assert_eq!(addresses("Montreal QC H2X 1Y4"), vec!["Montreal QC H2X 1Y4"]);

        let found = addresses("88 Rue Principale\nMontreal QC H2X 1Y4");
        assert_eq!(found, vec!["88 Rue Principale Montreal QC H2X 1Y4"]);
    }

    #[test]
    fn test_short_fragments_rejected() {
        assert!(addresses("12 Elm St").is_empty());
        assert!(addresses("Call us any time").is_empty());
    }
}
