//! Deterministic rule-based sentence splitting.
//!
//! Generated answers are split into atomic claim units before citation checking and
//! attribution. A boundary is sentence-ending punctuation (`.`, `?`, `!`) followed by
//! whitespace and then an ASCII uppercase letter, a digit, or `[`. A period does not end a
//! sentence when the token before it is a known abbreviation (`Dr.`, `Fig.`, `Prof.`),
//! the `al.` of `et al.`, or a single capital letter (initials such as `J. K. Rowling`).


/// Two-letter title/abbreviation class.
const ABBREV_2: &[&str] = &["Mr", "Ms", "Dr", "Jr", "Sr", "St", "vs", "cf", "eg", "ie", "ex"];
/// Three-letter title/abbreviation class.
const ABBREV_3: &[&str] = &["Mrs", "Fig", "Rev", "Gov", "Col", "Cpl", "Sgt"];
/// Four-letter title/abbreviation class.
const ABBREV_4: &[&str] = &["Capt", "Prof", "Dept"];

/// Splits `text` into trimmed, non-empty sentences.
///
/// Internal whitespace is collapsed to single spaces first. Empty or whitespace-only
/// input yields an empty vector. Text without a boundary comes back as one sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = collapsed.char_indices().collect();

    for (pos, &(idx, ch)) in chars.iter().enumerate() {
        if !matches!(ch, '.' | '?' | '!') {
            continue;
        }

        let (Some(&(_, space)), Some(&(_, next))) = (chars.get(pos + 1), chars.get(pos + 2))
        else {
            continue;
        };
        if space != ' ' || !opens_sentence(next) {
            continue;
        }

        let end = idx + ch.len_utf8();
        if ch == '.' && ends_with_abbreviation(&collapsed[start..idx]) {
            continue;
        }

        push_trimmed(&mut sentences, &collapsed[start..end]);
        start = end + 1;
    }

    push_trimmed(&mut sentences, &collapsed[start..]);
    sentences
}

/// ASCII only: `[A-Z0-9\[]`.
fn opens_sentence(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '['
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// `before_period` is the text preceding a `.` candidate boundary.
fn ends_with_abbreviation(before_period: &str) -> bool {
    let token_start = before_period
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i);

    let Some(token_start) = token_start else {
        return false;
    };
    let token = &before_period[token_start..];

    if ABBREV_2.contains(&token) || ABBREV_3.contains(&token) || ABBREV_4.contains(&token) {
        return true;
    }

    let mut token_chars = token.chars();
    if let (Some(first), None) = (token_chars.next(), token_chars.next())
        && first.is_ascii_uppercase()
    {
        return true;
    }

    token == "al" && preceded_by_et(&before_period[..token_start])
}

/// True when `text` ends with `et ` and `et` starts a word.
fn preceded_by_et(text: &str) -> bool {
    let Some(head) = text.strip_suffix("et ") else {
        return false;
    };
    head.chars().next_back().is_none_or(|c| !is_word_char(c))
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
