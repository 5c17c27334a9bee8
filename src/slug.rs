//! Card and commander name normalization
//!
//! EDHREC addresses every card by a lowercase, hyphen-separated identifier
//! ("Helga, Skittish Seer" is `helga-skittish-seer`). Apostrophes and
//! punctuation inside words are dropped, every other run of non-alphanumeric
//! characters becomes a single hyphen and accented Latin letters are folded
//! to their ASCII base.

use std::fmt;

use serde::Serialize;

use crate::error::{EdhrecError, Result};

/// Characters removed outright instead of becoming a separator
const DROPPED: &[char] = &['\'', '\u{2019}', ',', '.', '!', '?', ':', '"'];

/// URL-safe identifier derived from a display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Returns the slug as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a display name into the identifier EDHREC expects
///
/// Normalization is deterministic and idempotent: feeding a slug back in
/// returns the same slug.
///
/// # Errors
/// Returns `EdhrecError::InvalidName` when the name is blank or contains
/// nothing that survives normalization (e.g. `"!!!"`).
pub fn normalize(name: &str) -> Result<Slug> {
    if name.trim().is_empty() {
        return Err(EdhrecError::InvalidName {
            name: name.to_string(),
            reason: "name is empty",
        });
    }

    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if DROPPED.contains(&c) {
            continue;
        }

        let folded = fold_diacritic(c);
        if folded.is_none() && !c.is_alphanumeric() {
            pending_separator = true;
            continue;
        }

        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;

        match folded {
            Some(ascii) => slug.push_str(ascii),
            None => slug.push(c),
        }
    }

    if slug.is_empty() {
        return Err(EdhrecError::InvalidName {
            name: name.to_string(),
            reason: "name reduces to an empty slug",
        });
    }

    Ok(Slug(slug))
}

/// Maps accented lowercase Latin letters to their ASCII spelling
fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}
