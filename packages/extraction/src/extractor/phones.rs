//! Phone number passes.
//!
//! Both passes scan the same phone shapes. The emergency pass keeps numbers
//! near a trigger word or inside `tel:` links; the standard pass keeps every
//! shape that is not sitting in date context and was not already claimed as
//! an emergency number.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

/// Minimum digit count for anything treated as a phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// How far before a number (in bytes, same line) a trigger word may end.
const TRIGGER_LOOKBEHIND: usize = 48;

/// How far after a number (in bytes, same line) a trigger word may start.
const TRIGGER_LOOKAHEAD: usize = 16;

/// Digits a generic match must carry ahead of a trailing national number
/// before the two are split apart (a ZIP code or suite number, not a
/// country or trunk prefix).
const MIN_LEADING_DIGITS: usize = 4;

lazy_static! {
    // Alternatives are tried left to right at each position: markdown tel link,
    // national 3-3-4 grouping, then generic international. Both number forms
    // take an optional extension. The generic form starts and ends on a digit
    // so it never swallows surrounding whitespace.
    static ref PHONE_SHAPE: Regex = Regex::new(concat!(
        r"\[[^\]\n]*\]\(tel:(?P<tel>[\d \t+()\-.]+)\)",
        r"|\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4}",
        r"(?:[ \t]*(?i:ext|x|#)\.?[ \t]*\d{1,5})?",
        r"|(?P<generic>(?:\+\d{1,3}[-. \t]?)?(?:\(\d{1,4}\)[-. \t]?)?\d[\d \t.-]{5,16}\d",
        r"(?:[ \t]*(?i:ext|x|#)\.?[ \t]*\d{1,5})?)",
    ))
    .unwrap();

    // A national number closing a generic match after a gap: "77007 713-555-0100"
    static ref TRAILING_NATIONAL: Regex = Regex::new(concat!(
        r"[ \t](?P<number>\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4}",
        r"(?:[ \t]*(?i:ext|x|#)\.?[ \t]*\d{1,5})?)$",
    ))
    .unwrap();

    static ref EMERGENCY_TRIGGER: Regex =
        Regex::new(r"(?i)\b(?:emergency|hotline|urgent|24/7|rescue)").unwrap();

    // Ends a clause: a trigger on the far side labels something else
    static ref CLAUSE_BREAK: Regex = Regex::new(r"[;|]|\d\.(?:\s|$)").unwrap();

    // A token that is itself a date: 2024-05-01, 01/05/2024, 1.5.24
    static ref DATE_TOKEN: Regex = Regex::new(
        r"^(?:\d{4}[-./]\d{1,2}[-./]\d{1,2}|\d{1,2}[-./]\d{1,2}[-./]\d{2,4})$"
    )
    .unwrap();

    // A match that opens with an ISO date, e.g. "2024-05-01 10" from a timestamp
    static ref DATE_PREFIX: Regex = Regex::new(r"^\d{4}[-./]\d{1,2}[-./]\d{1,2}").unwrap();

    static ref YEAR_RANGE: Regex = Regex::new(r"^(?:19|20)\d{2}\s*-\s*(?:19|20)\d{2}$").unwrap();

    static ref PRECEDING_YEAR: Regex = Regex::new(r"\d{4}[-./]$").unwrap();
    static ref TRAILING_DAY: Regex = Regex::new(r"^[-./]\d{2}(?:\D|$)").unwrap();
    static ref TRAILING_TIME: Regex = Regex::new(r"^:\d{2}").unwrap();
    static ref TRAILING_YEAR: Regex = Regex::new(r"^[ \t]+(?:19|20)\d{2}\b").unwrap();
    static ref TRAILING_ERA: Regex = Regex::new(r"^[ \t]*(?:BC|AD)\b").unwrap();
}

/// A phone-shaped match with its byte span in the source text.
#[derive(Debug)]
struct PhoneCandidate {
    start: usize,
    end: usize,
    normalized: String,
    is_tel_link: bool,
}

/// Numbers near an emergency trigger word, or behind a `tel:` link.
///
/// A trigger word belongs to the nearest number: the search window around a
/// candidate never reaches past the neighbouring candidates.
pub fn emergency_phones(text: &str) -> Vec<String> {
    let candidates = candidates(text);
    let mut found = IndexSet::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let floor = i.checked_sub(1).map_or(0, |prev| candidates[prev].end);
        let ceiling = candidates.get(i + 1).map_or(text.len(), |next| next.start);

        if candidate.is_tel_link || near_trigger(text, candidate, floor, ceiling) {
            found.insert(candidate.normalized.clone());
        }
    }

    found.into_iter().collect()
}

/// Every phone shape outside date context, minus the given emergency numbers.
pub fn standard_phones(text: &str, emergency: &[String]) -> Vec<String> {
    let found: IndexSet<String> = candidates(text)
        .into_iter()
        .filter(|c| !in_date_context(text, c.start, c.end))
        .map(|c| c.normalized)
        .filter(|n| !emergency.contains(n))
        .collect();
    found.into_iter().collect()
}

/// Strip separators and parentheses, keeping digits, `+` and extension text.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '.' | '(' | ')') && !c.is_whitespace())
        .collect()
}

/// Phone shapes in order. Dates and year ranges are skipped; a timestamp is
/// skipped past its date so a number right after it is still seen.
fn candidates(text: &str) -> Vec<PhoneCandidate> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(caps) = PHONE_SHAPE.captures_at(text, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        pos = whole.end();

        if let Some(tel) = caps.name("tel") {
            push_candidate(&mut found, whole.start(), whole.end(), tel.as_str(), true);
            continue;
        }

        let raw = whole.as_str();
        if let Some(date) = DATE_PREFIX.find(raw) {
            pos = whole.start() + date.end();
            continue;
        }
        if DATE_TOKEN.is_match(raw.trim()) || YEAR_RANGE.is_match(raw) {
            continue;
        }

        match caps.name("generic").and_then(|_| trailing_national(raw)) {
            Some((from, to)) => push_candidate(
                &mut found,
                whole.start() + from,
                whole.start() + to,
                &raw[from..to],
                false,
            ),
            None => push_candidate(&mut found, whole.start(), whole.end(), raw, false),
        }
    }

    found
}

fn push_candidate(found: &mut Vec<PhoneCandidate>, start: usize, end: usize, raw: &str, is_tel_link: bool) {
    let normalized = normalize(raw);
    if digit_count(&normalized) < MIN_PHONE_DIGITS {
        return;
    }
    found.push(PhoneCandidate {
        start,
        end,
        normalized,
        is_tel_link,
    });
}

/// Span of a national number that ends a generic match behind some other
/// digit group, as in "Houston TX 77007 713-555-0100".
fn trailing_national(raw: &str) -> Option<(usize, usize)> {
    if raw.starts_with('+') {
        return None;
    }
    let number = TRAILING_NATIONAL.captures(raw)?.name("number")?;
    (digit_count(&raw[..number.start()]) >= MIN_LEADING_DIGITS)
        .then(|| (number.start(), number.end()))
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

fn near_trigger(text: &str, candidate: &PhoneCandidate, floor: usize, ceiling: usize) -> bool {
    let (start, end) = (candidate.start, candidate.end);
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);

    let before = start
        .saturating_sub(TRIGGER_LOOKBEHIND)
        .max(line_start)
        .max(floor);
    let after = (end + TRIGGER_LOOKAHEAD).min(line_end).min(ceiling);

    let before = floor_boundary(text, before);
    let after = ceil_boundary(text, after);

    let lead = &text[before..start];
    let lead = CLAUSE_BREAK
        .find_iter(lead)
        .last()
        .map_or(lead, |m| &lead[m.end()..]);

    // Start on the number's last char so "0199." counts as a clause break
    let tail_start = floor_boundary(text, end.saturating_sub(1).max(start));
    let tail = &text[tail_start..after.max(tail_start)];
    let tail = CLAUSE_BREAK.find(tail).map_or(tail, |m| &tail[..m.start()]);

    EMERGENCY_TRIGGER.is_match(lead) || EMERGENCY_TRIGGER.is_match(tail)
}

fn in_date_context(text: &str, start: usize, end: usize) -> bool {
    let before = &text[..start];
    let after = &text[end..];

    PRECEDING_YEAR.is_match(before)
        || TRAILING_DAY.is_match(after)
        || TRAILING_TIME.is_match(after)
        || TRAILING_YEAR.is_match(after)
        || TRAILING_ERA.is_match(after)
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
