use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Clone, Copy, PartialEq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_alphabetic() {
        CharClass::Lower
    } else {
        CharClass::Other
    }
}

/// Splits `text` into words at punctuation, case changes ("fooBar",
/// "XMLHttp") and letter/digit changes ("q1"). Apostrophes are dropped so
/// "don't" stays one word.
fn words(text: &str) -> Vec<String> {
    let chars = text
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .collect::<Vec<_>>();

    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let class = classify(c);
        if class == CharClass::Other {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let prev = classify(prev);
            let next = chars.get(i + 1).copied().map(classify);
            let boundary = match (prev, class) {
                (CharClass::Lower, CharClass::Upper) => true,
                (CharClass::Upper, CharClass::Upper) => next == Some(CharClass::Lower),
                (CharClass::Digit, CharClass::Digit) => false,
                (CharClass::Digit, _) | (_, CharClass::Digit) => true,
                _ => false,
            };
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Lower-cased words of `text` joined with `-`.
///
/// Only ASCII `0-9` count as digits. Characters that are neither letters
/// nor ASCII digits (punctuation, symbols such as `²`, emoji) separate words
/// and are dropped from the result.
pub fn kebab_case(text: &str) -> String {
    words(text)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// File name stem for a capture of `description` taken at `date`.
///
/// The timestamp is ISO 8601 in UTC with milliseconds, with `:` and spaces
/// replaced so the result is safe to use as a file name on every platform.
pub fn file_stem(description: &str, date: DateTime<Utc>) -> String {
    let timestamp = date
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', ' '], "-");
    format!("{}-{}", kebab_case(description), timestamp)
}

pub fn pdf_file_name(description: &str, date: DateTime<Utc>) -> String {
    format!("{}.pdf", file_stem(description, date))
}
