//! Commander page payloads (`/_next/data/{build}/commanders/...`)
//!
//! The page bundles the recommendation lists (`container.json_dict.cardlists`)
//! with several side panels. Only the card lists are mandatory: a filter
//! combination that narrows the data to nothing comes back without them.

use serde_json::Value;

use super::schema::{coerce_count, Field, Kind, Schema};
use super::{
    decode, page_data, CardGroup, CardSummary, CommanderData, ManaCurve, TagCount,
    TypeDistribution, TypeShare,
};
use crate::endpoint::Request;
use crate::error::{EdhrecError, Result};

const RECORD: &str = "CommanderData";

const CARD_LISTS: Field = Field::primary(&["container", "json_dict", "cardlists"], Kind::Array);
const NAME: Field = Field::required(&["container", "json_dict", "card", "name"], Kind::Text);
const NUM_DECKS: Field =
    Field::optional(&["container", "json_dict", "card", "num_decks"], Kind::Count);
const HEADER: Field = Field::optional(&["header"], Kind::Text);
const AVG_PRICE: Field = Field::optional(&["avg_price"], Kind::Number);
const PIECHART: Field = Field::optional(&["panels", "piechart", "content"], Kind::Array);
const MANA_CURVE: Field = Field::optional(&["panels", "mana_curve"], Kind::Object);
const TAGLINKS: Field = Field::optional(&["panels", "taglinks"], Kind::Array);

const SCHEMA: Schema = Schema {
    record: RECORD,
    fields: &[
        CARD_LISTS, NAME, NUM_DECKS, HEADER, AVG_PRICE, PIECHART, MANA_CURVE, TAGLINKS,
    ],
};

const GROUP_RECORD: &str = "CardGroup";
const GROUP_HEADER: Field = Field::required(&["header"], Kind::Text);
const GROUP_TAG: Field = Field::optional(&["tag"], Kind::Text);
const GROUP_CARDS: Field = Field::optional(&["cardviews"], Kind::Array);

const GROUP_SCHEMA: Schema = Schema {
    record: GROUP_RECORD,
    fields: &[GROUP_HEADER, GROUP_TAG, GROUP_CARDS],
};

const CARD_RECORD: &str = "CardSummary";
const CARD_NAME: Field = Field::required(&["name"], Kind::Text);
const CARD_SANITIZED: Field = Field::optional(&["sanitized"], Kind::Text);
const CARD_SYNERGY: Field = Field::optional(&["synergy"], Kind::Number);
const CARD_INCLUSION: Field = Field::optional(&["inclusion"], Kind::Count);
const CARD_NUM_DECKS: Field = Field::optional(&["num_decks"], Kind::Count);
const CARD_POTENTIAL_DECKS: Field = Field::optional(&["potential_decks"], Kind::Count);
const CARD_LABEL: Field = Field::optional(&["label"], Kind::Text);
const CARD_URL: Field = Field::optional(&["url"], Kind::Text);

const CARD_SCHEMA: Schema = Schema {
    record: CARD_RECORD,
    fields: &[
        CARD_NAME,
        CARD_SANITIZED,
        CARD_SYNERGY,
        CARD_INCLUSION,
        CARD_NUM_DECKS,
        CARD_POTENTIAL_DECKS,
        CARD_LABEL,
        CARD_URL,
    ],
};

const SHARE_RECORD: &str = "TypeDistribution";
const SHARE_LABEL: Field = Field::required(&["label"], Kind::Text);
const SHARE_VALUE: Field = Field::required(&["value"], Kind::Count);

const SHARE_SCHEMA: Schema = Schema {
    record: SHARE_RECORD,
    fields: &[SHARE_LABEL, SHARE_VALUE],
};

const TAG_RECORD: &str = "TagCount";
const TAG_VALUE: Field = Field::required(&["value"], Kind::Text);
const TAG_COUNT: Field = Field::required(&["count"], Kind::Count);
const TAG_SLUG: Field = Field::optional(&["slug"], Kind::Text);

const TAG_SCHEMA: Schema = Schema {
    record: TAG_RECORD,
    fields: &[TAG_VALUE, TAG_COUNT, TAG_SLUG],
};

/// Normalizes a commander page payload
pub(crate) fn normalize_commander(body: &[u8], request: &Request<'_>) -> Result<CommanderData> {
    let payload = decode(RECORD, body)?;
    let data = page_data(RECORD, &payload, request)?;
    SCHEMA.check(data, request)?;

    let card_groups = CARD_LISTS
        .array(RECORD, data)?
        .iter()
        .map(|group| card_group(group, request))
        .collect::<Result<Vec<_>>>()?;

    let type_distribution = match PIECHART.array(RECORD, data)? {
        [] => None,
        segments => Some(type_distribution(segments, request)?),
    };

    let mana_curve = match MANA_CURVE.object(RECORD, data)? {
        Some(buckets) => Some(mana_curve(buckets)?),
        None => None,
    };

    let tag_links = TAGLINKS.array(RECORD, data)?;
    TAG_SCHEMA.check_each(tag_links, request)?;
    let tags = tag_links
        .iter()
        .map(|link| {
            Ok(TagCount {
                tag: TAG_VALUE.required_text(TAG_RECORD, link)?,
                slug: TAG_SLUG.text(TAG_RECORD, link)?,
                count: TAG_COUNT.required_count(TAG_RECORD, link)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CommanderData {
        name: NAME.required_text(RECORD, data)?,
        header: HEADER.text(RECORD, data)?,
        num_decks: NUM_DECKS.count(RECORD, data)?,
        avg_price: AVG_PRICE.number(RECORD, data)?,
        card_groups,
        type_distribution,
        mana_curve,
        tags,
    })
}

fn card_group(group: &Value, request: &Request<'_>) -> Result<CardGroup> {
    GROUP_SCHEMA.check(group, request)?;
    let views = GROUP_CARDS.array(GROUP_RECORD, group)?;

    Ok(CardGroup {
        tag: GROUP_TAG.text(GROUP_RECORD, group)?.unwrap_or_default(),
        header: GROUP_HEADER.required_text(GROUP_RECORD, group)?,
        cards: card_summaries(views, request)?,
    })
}

/// Normalizes a list of `cardviews` entries
pub(crate) fn card_summaries(views: &[Value], request: &Request<'_>) -> Result<Vec<CardSummary>> {
    CARD_SCHEMA.check_each(views, request)?;
    views
        .iter()
        .map(|view| {
            Ok(CardSummary {
                name: CARD_NAME.required_text(CARD_RECORD, view)?,
                sanitized: CARD_SANITIZED.text(CARD_RECORD, view)?,
                synergy: CARD_SYNERGY.number(CARD_RECORD, view)?,
                inclusion: CARD_INCLUSION.count(CARD_RECORD, view)?,
                num_decks: CARD_NUM_DECKS.count(CARD_RECORD, view)?,
                potential_decks: CARD_POTENTIAL_DECKS.count(CARD_RECORD, view)?,
                label: CARD_LABEL.text(CARD_RECORD, view)?,
                url: CARD_URL.text(CARD_RECORD, view)?,
            })
        })
        .collect()
}

fn type_distribution(segments: &[Value], request: &Request<'_>) -> Result<TypeDistribution> {
    SHARE_SCHEMA.check_each(segments, request)?;
    let shares = segments
        .iter()
        .map(|segment| {
            Ok(TypeShare {
                label: SHARE_LABEL.required_text(SHARE_RECORD, segment)?,
                value: SHARE_VALUE.required_count(SHARE_RECORD, segment)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TypeDistribution { shares })
}

/// Reads `{"0": 1, "1": 10, ...}` into mana value buckets
fn mana_curve(buckets: &serde_json::Map<String, Value>) -> Result<ManaCurve> {
    let mut curve = ManaCurve::default();
    for (key, count) in buckets {
        let field = format!("{}.{}", MANA_CURVE.name(), key);
        let mana_value = key
            .trim()
            .parse::<u32>()
            .map_err(|_| EdhrecError::wrong_type(RECORD, field.clone(), "a mana value"))?;
        let count =
            coerce_count(count).ok_or_else(|| EdhrecError::wrong_type(RECORD, field, "a count"))?;
        curve.buckets.insert(mana_value, count);
    }
    Ok(curve)
}
