//! The individual title-cleaning rules
//!
//! Only [`extract_artist`] ever returns an artist. Nothing here trims the
//! result unless the rule says so: removing digits from `"my song 123"`
//! leaves the trailing space in place.

use super::Transformed;

/// Separator between artist and title in a stem
pub const ARTIST_SEPARATOR: char = '-';

const REPLACEMENT_CHAR: char = '\u{FFFD}';
const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Split `"Artist - Title"` on the first separator.
///
/// Both halves are trimmed. An empty artist half counts as no artist. Later
/// separators stay in the title.
pub fn extract_artist(stem: &str) -> Transformed {
    match stem.split_once(ARTIST_SEPARATOR) {
        Some((artist, title)) => {
            let artist = artist.trim();
            Transformed {
                title: title.trim().to_string(),
                artist: (!artist.is_empty()).then(|| artist.to_string()),
            }
        }
        None => Transformed::title_only(stem),
    }
}

/// Title-case every word.
///
/// A letter is upper-cased when the character before it is not a cased
/// letter and lower-cased otherwise, so `track_42_live` becomes
/// `Track_42_Live`.
pub fn fix_casing(stem: &str) -> Transformed {
    let mut out = String::with_capacity(stem.len());
    let mut prev_cased = false;

    for c in stem.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && prev_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_cased = cased;
    }

    Transformed::title_only(out)
}

/// Delete every decimal digit `0`-`9`.
///
/// Other numeric characters (`½`, `²`, `Ⅳ`) are not digits and stay.
pub fn remove_numbers(stem: &str) -> Transformed {
    Transformed::title_only(stem.chars().filter(|c| !c.is_ascii_digit()).collect::<String>())
}

/// Delete `http...` and `www?...` tokens.
///
/// An `http` token runs to the next whitespace and needs at least one
/// character beyond its prefix. A `www` token takes any one character after
/// the prefix (whitespace included), then a non-empty run up to the next
/// whitespace, so `www xy` goes entirely. Matches may start mid-word
/// (`songhttp://x` -> `song`).
pub fn remove_urls(stem: &str) -> Transformed {
    let mut out = String::with_capacity(stem.len());
    let mut rest = stem;

    while let Some(c) = rest.chars().next() {
        match url_token_len(rest) {
            Some(len) => rest = &rest[len..],
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    Transformed::title_only(out)
}

/// Byte length of the URL token at the start of `s`, if there is one
fn url_token_len(s: &str) -> Option<usize> {
    let body_start = if s.starts_with("http") {
        4
    } else if let Some(rest) = s.strip_prefix("www") {
        let any = rest.chars().next().filter(|c| *c != '\n')?;
        3 + any.len_utf8()
    } else {
        return None;
    };

    let body = &s[body_start..];
    let run = body.find(char::is_whitespace).unwrap_or(body.len());
    (run > 0).then_some(body_start + run)
}

/// Replace every underscore with a single space
pub fn replace_underscores(stem: &str) -> Transformed {
    Transformed::title_only(stem.replace('_', " "))
}

/// Drop characters that did not survive decoding the filename.
///
/// Stems are decoded lossily, so undecodable bytes arrive here as U+FFFD.
/// Stray byte-order marks are dropped as well.
pub fn remove_encoded_chars(stem: &str) -> Transformed {
    Transformed::title_only(
        stem.chars()
            .filter(|c| *c != REPLACEMENT_CHAR && *c != BYTE_ORDER_MARK)
            .collect::<String>(),
    )
}

/// Delete everything that is neither alphanumeric nor whitespace
pub fn remove_symbols(stem: &str) -> Transformed {
    Transformed::title_only(
        stem.chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>(),
    )
}
