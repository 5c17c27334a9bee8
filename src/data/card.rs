//! Card detail payloads (`json.edhrec.com/cards/{slug}`)

use std::collections::BTreeMap;

use serde_json::Value;

use super::schema::{coerce_number, Field, Kind, Schema};
use super::{decode, CardDetail};
use crate::endpoint::Request;
use crate::error::{EdhrecError, Result};

const RECORD: &str = "CardDetail";

const NAME: Field = Field::required(&["name"], Kind::Text);
const SANITIZED: Field = Field::required(&["sanitized"], Kind::Text);
const TYPE_LINE: Field = Field::optional(&["type"], Kind::Text);
const CMC: Field = Field::optional(&["cmc"], Kind::Number);
const COLOR_IDENTITY: Field = Field::optional(&["color_identity"], Kind::Array);
const RARITY: Field = Field::optional(&["rarity"], Kind::Text);
const SALT: Field = Field::optional(&["salt"], Kind::Number);
const NUM_DECKS: Field = Field::optional(&["num_decks"], Kind::Count);
const POTENTIAL_DECKS: Field = Field::optional(&["potential_decks"], Kind::Count);
const URL: Field = Field::optional(&["url"], Kind::Text);
const PRICES: Field = Field::optional(&["prices"], Kind::Object);

const SCHEMA: Schema = Schema {
    record: RECORD,
    fields: &[
        NAME,
        SANITIZED,
        TYPE_LINE,
        CMC,
        COLOR_IDENTITY,
        RARITY,
        SALT,
        NUM_DECKS,
        POTENTIAL_DECKS,
        URL,
        PRICES,
    ],
};

/// Normalizes a card detail payload
pub(crate) fn normalize_card_detail(body: &[u8], request: &Request<'_>) -> Result<CardDetail> {
    let payload = decode(RECORD, body)?;
    SCHEMA.check(&payload, request)?;

    Ok(CardDetail {
        name: NAME.required_text(RECORD, &payload)?,
        sanitized: SANITIZED.required_text(RECORD, &payload)?,
        type_line: TYPE_LINE.text(RECORD, &payload)?,
        cmc: CMC.number(RECORD, &payload)?,
        color_identity: COLOR_IDENTITY.text_list(RECORD, &payload)?,
        rarity: RARITY.text(RECORD, &payload)?,
        salt: SALT.number(RECORD, &payload)?,
        num_decks: NUM_DECKS.count(RECORD, &payload)?,
        potential_decks: POTENTIAL_DECKS.count(RECORD, &payload)?,
        url: URL.text(RECORD, &payload)?,
        prices: parse_prices(&payload)?,
    })
}

/// Reads vendor prices
///
/// Vendors are listed either as a bare price or as `{"price": .., "url": ..}`.
/// Vendors without a price are skipped.
fn parse_prices(payload: &Value) -> Result<BTreeMap<String, f64>> {
    let mut prices = BTreeMap::new();
    let Some(vendors) = PRICES.object(RECORD, payload)? else {
        return Ok(prices);
    };

    for (vendor, entry) in vendors {
        let raw = match entry {
            Value::Object(fields) => fields.get("price"),
            other => Some(other),
        };
        let Some(raw) = raw.filter(|value| !value.is_null()) else {
            continue;
        };
        let price = coerce_number(raw).ok_or_else(|| {
            EdhrecError::wrong_type(RECORD, format!("prices.{}", vendor), "a number")
        })?;
        prices.insert(vendor.clone(), price);
    }
    Ok(prices)
}
