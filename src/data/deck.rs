//! Average deck and deck table payloads

use serde_json::Value;

use super::schema::{Field, Kind, Schema};
use super::{decode, page_data, DeckEntry, DeckList, DeckSummary};
use crate::endpoint::Request;
use crate::error::{EdhrecError, Result};

const DECK_RECORD: &str = "DeckList";
const DECK: Field = Field::primary(&["deck"], Kind::Array);

const DECK_SCHEMA: Schema = Schema {
    record: DECK_RECORD,
    fields: &[DECK],
};

const TABLE_RECORD: &str = "DeckSummary";
const TABLE: Field = Field::primary(&["table"], Kind::Array);

const TABLE_SCHEMA: Schema = Schema {
    record: TABLE_RECORD,
    fields: &[TABLE],
};

const ROW_HASH: Field = Field::required(&["urlhash"], Kind::Text);
const ROW_PRICE: Field = Field::optional(&["price"], Kind::Number);
const ROW_SALT: Field = Field::optional(&["salt"], Kind::Number);
const ROW_SAVE_DATE: Field = Field::optional(&["savedate"], Kind::Text);
const ROW_TAGS: Field = Field::optional(&["tags"], Kind::Array);

const ROW_SCHEMA: Schema = Schema {
    record: TABLE_RECORD,
    fields: &[ROW_HASH, ROW_PRICE, ROW_SALT, ROW_SAVE_DATE, ROW_TAGS],
};

/// Normalizes an average deck payload
///
/// `commander` is the display name the caller asked for.
pub(crate) fn normalize_average_deck(
    body: &[u8],
    commander: &str,
    request: &Request<'_>,
) -> Result<DeckList> {
    let payload = decode(DECK_RECORD, body)?;
    let data = page_data(DECK_RECORD, &payload, request)?;
    DECK_SCHEMA.check(data, request)?;

    let cards = DECK
        .text_list(DECK_RECORD, data)?
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_deck_line(line, i))
        .collect::<Result<Vec<_>>>()?;

    Ok(DeckList {
        commander: commander.to_string(),
        cards,
    })
}

/// Parses `"1 Sol Ring"`; a line without a count means one copy
///
/// A line holding only a count is malformed.
fn parse_deck_line(line: &str, index: usize) -> Result<DeckEntry> {
    let line = line.trim();
    let (quantity, name) = match line.split_once(char::is_whitespace) {
        Some((count, rest)) => match count.parse::<u32>() {
            Ok(quantity) => (quantity, rest.trim()),
            Err(_) => (1, line),
        },
        None if line.parse::<u32>().is_ok() => (0, ""),
        None => (1, line),
    };

    if name.is_empty() {
        return Err(EdhrecError::MalformedResponse {
            record: DECK_RECORD,
            field: format!("deck[{}]", index),
            reason: "has no card name".to_string(),
        });
    }

    Ok(DeckEntry {
        quantity,
        name: name.to_string(),
    })
}

/// Normalizes the deck table of the `decks` route
pub(crate) fn normalize_deck_table(body: &[u8], request: &Request<'_>) -> Result<Vec<DeckSummary>> {
    let payload = decode(TABLE_RECORD, body)?;
    let data = page_data(TABLE_RECORD, &payload, request)?;
    TABLE_SCHEMA.check(data, request)?;

    let rows = TABLE.array(TABLE_RECORD, data)?;
    ROW_SCHEMA.check_each(rows, request)?;
    rows.iter().map(deck_summary).collect()
}

fn deck_summary(row: &Value) -> Result<DeckSummary> {
    Ok(DeckSummary {
        url_hash: ROW_HASH.required_text(TABLE_RECORD, row)?,
        price: ROW_PRICE.number(TABLE_RECORD, row)?,
        salt: ROW_SALT.number(TABLE_RECORD, row)?,
        save_date: ROW_SAVE_DATE.text(TABLE_RECORD, row)?,
        tags: ROW_TAGS.text_list(TABLE_RECORD, row)?,
    })
}
