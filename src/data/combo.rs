//! Combo payloads (`/_next/data/{build}/combos/...`)

use super::commander::card_summaries;
use super::schema::{Field, Kind, Schema};
use super::{decode, page_data, Combo};
use crate::endpoint::Request;
use crate::error::Result;

const RECORD: &str = "Combo";

const CARD_LISTS: Field = Field::optional(&["container", "json_dict", "cardlists"], Kind::Array);

const SCHEMA: Schema = Schema {
    record: RECORD,
    fields: &[CARD_LISTS],
};

const HEADER: Field = Field::required(&["header"], Kind::Text);
const HREF: Field = Field::optional(&["href"], Kind::Text);
const CARDS: Field = Field::optional(&["cardviews"], Kind::Array);

const COMBO_SCHEMA: Schema = Schema {
    record: RECORD,
    fields: &[HEADER, HREF, CARDS],
};

/// Normalizes a combo page; a card without combos yields an empty list
pub(crate) fn normalize_combos(body: &[u8], request: &Request<'_>) -> Result<Vec<Combo>> {
    let payload = decode(RECORD, body)?;
    let data = page_data(RECORD, &payload, request)?;
    SCHEMA.check(data, request)?;

    let lists = CARD_LISTS.array(RECORD, data)?;
    COMBO_SCHEMA.check_each(lists, request)?;
    lists
        .iter()
        .map(|list| {
            Ok(Combo {
                header: HEADER.required_text(RECORD, list)?,
                href: HREF.text(RECORD, list)?,
                cards: card_summaries(CARDS.array(RECORD, list)?, request)?,
            })
        })
        .collect()
}
