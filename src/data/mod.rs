//! Record types returned by the client
//!
//! This module contains the stable shapes the EDHREC payloads are normalized
//! into, plus the normalizers for each upstream payload family.
//!
//! Records serialize to and from their own field names (not the upstream
//! ones), so callers can store results and read them back later.

pub(crate) mod card;
pub(crate) mod combo;
pub(crate) mod commander;
pub(crate) mod deck;
pub(crate) mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Request;
use crate::error::{EdhrecError, Result};
use schema::{Field, Kind};

const PAGE_PROPS: Field = Field::required(&["pageProps"], Kind::Object);

/// Decodes a response body as JSON
pub(crate) fn decode(record: &'static str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| EdhrecError::MalformedResponse {
        record,
        field: "<body>".to_string(),
        reason: format!("is not valid JSON: {}", e),
    })
}

/// Unwraps `pageProps.data` of a Next.js data response
///
/// `pageProps.notFound` is treated like a 404 and a missing `data` section
/// means there is nothing for the requested filters.
pub(crate) fn page_data<'v>(
    record: &'static str,
    payload: &'v Value,
    request: &Request<'_>,
) -> Result<&'v Value> {
    let props = PAGE_PROPS
        .object(record, payload)?
        .ok_or_else(|| EdhrecError::missing(record, PAGE_PROPS.name()))?;

    if props.get("notFound").and_then(Value::as_bool) == Some(true) {
        return Err(request.not_found());
    }
    match props.get("data") {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(request.no_data()),
    }
}

/// Full details for a single card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    /// Display name
    pub name: String,
    /// EDHREC identifier
    pub sanitized: String,
    /// Type line, e.g. "Legendary Creature — Elf Druid"
    pub type_line: Option<String>,
    /// Mana value
    pub cmc: Option<f64>,
    /// Color identity letters, e.g. `["G", "U"]`
    pub color_identity: Vec<String>,
    pub rarity: Option<String>,
    /// EDHREC salt score
    pub salt: Option<f64>,
    /// Decks playing this card
    pub num_decks: Option<u64>,
    /// Decks that could play this card
    pub potential_decks: Option<u64>,
    pub url: Option<String>,
    /// Price per vendor
    pub prices: BTreeMap<String, f64>,
}

/// One card inside a recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    pub sanitized: Option<String>,
    /// Synergy score relative to the commander
    pub synergy: Option<f64>,
    /// Decks including this card
    pub inclusion: Option<u64>,
    pub num_decks: Option<u64>,
    pub potential_decks: Option<u64>,
    /// Upstream summary label, e.g. "54% of 1200 decks"
    pub label: Option<String>,
    pub url: Option<String>,
}

/// A titled, ordered list of cards
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardGroup {
    /// Upstream section identifier, e.g. "creatures"
    pub tag: String,
    /// Section title, e.g. "Creatures"
    pub header: String,
    pub cards: Vec<CardSummary>,
}

impl CardGroup {
    /// An empty group for a category the upstream data does not contain
    pub fn empty(category: CardCategory) -> Self {
        Self {
            tag: category.tag().to_string(),
            header: category.header().to_string(),
            cards: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Card type share of a commander's average deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShare {
    pub label: String,
    pub value: u64,
}

/// Card type breakdown, in upstream order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDistribution {
    pub shares: Vec<TypeShare>,
}

impl TypeDistribution {
    /// Returns the count for a type label such as "Creature"
    pub fn get(&self, label: &str) -> Option<u64> {
        self.shares
            .iter()
            .find(|share| share.label == label)
            .map(|share| share.value)
    }
}

/// Number of cards per mana value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaCurve {
    pub buckets: BTreeMap<u32, u64>,
}

/// Deck theme and how many decks use it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub slug: Option<String>,
    pub count: u64,
}

/// Aggregated commander page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommanderData {
    pub name: String,
    pub header: Option<String>,
    pub num_decks: Option<u64>,
    pub avg_price: Option<f64>,
    pub card_groups: Vec<CardGroup>,
    pub type_distribution: Option<TypeDistribution>,
    pub mana_curve: Option<ManaCurve>,
    pub tags: Vec<TagCount>,
}

impl CommanderData {
    /// Returns the group for `category`, or an empty group if absent
    pub fn group(&self, category: CardCategory) -> CardGroup {
        self.card_groups
            .iter()
            .find(|group| group.tag == category.tag())
            .cloned()
            .unwrap_or_else(|| CardGroup::empty(category))
    }
}

/// One line of a decklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub quantity: u32,
    pub name: String,
}

/// A commander's average deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub commander: String,
    pub cards: Vec<DeckEntry>,
}

impl DeckList {
    /// Total number of cards, counting quantities
    pub fn total_cards(&self) -> u32 {
        self.cards.iter().map(|entry| entry.quantity).sum()
    }
}

/// A user-submitted deck listed for a commander
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSummary {
    /// Identifier of the deck on EDHREC
    pub url_hash: String,
    pub price: Option<f64>,
    pub salt: Option<f64>,
    pub save_date: Option<String>,
    pub tags: Vec<String>,
}

/// A combo involving a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub header: String,
    /// Relative link to the combo page
    pub href: Option<String>,
    pub cards: Vec<CardSummary>,
}

/// Card sections of a commander page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardCategory {
    NewCards,
    HighSynergyCards,
    TopCards,
    Creatures,
    Instants,
    Sorceries,
    UtilityArtifacts,
    ManaArtifacts,
    Enchantments,
    Battles,
    Planeswalkers,
    Lands,
    UtilityLands,
}

impl CardCategory {
    /// Returns all categories in page order
    pub fn all() -> &'static [CardCategory] {
        &[
            CardCategory::NewCards,
            CardCategory::HighSynergyCards,
            CardCategory::TopCards,
            CardCategory::Creatures,
            CardCategory::Instants,
            CardCategory::Sorceries,
            CardCategory::UtilityArtifacts,
            CardCategory::ManaArtifacts,
            CardCategory::Enchantments,
            CardCategory::Battles,
            CardCategory::Planeswalkers,
            CardCategory::Lands,
            CardCategory::UtilityLands,
        ]
    }

    /// Section tag used in the upstream payload
    pub fn tag(&self) -> &'static str {
        match self {
            CardCategory::NewCards => "newcards",
            CardCategory::HighSynergyCards => "highsynergycards",
            CardCategory::TopCards => "topcards",
            CardCategory::Creatures => "creatures",
            CardCategory::Instants => "instants",
            CardCategory::Sorceries => "sorceries",
            CardCategory::UtilityArtifacts => "utilityartifacts",
            CardCategory::ManaArtifacts => "manaartifacts",
            CardCategory::Enchantments => "enchantments",
            CardCategory::Battles => "battles",
            CardCategory::Planeswalkers => "planeswalkers",
            CardCategory::Lands => "lands",
            CardCategory::UtilityLands => "utilitylands",
        }
    }

    /// Section title as shown on the site
    pub fn header(&self) -> &'static str {
        match self {
            CardCategory::NewCards => "New Cards",
            CardCategory::HighSynergyCards => "High Synergy Cards",
            CardCategory::TopCards => "Top Cards",
            CardCategory::Creatures => "Creatures",
            CardCategory::Instants => "Instants",
            CardCategory::Sorceries => "Sorceries",
            CardCategory::UtilityArtifacts => "Utility Artifacts",
            CardCategory::ManaArtifacts => "Mana Artifacts",
            CardCategory::Enchantments => "Enchantments",
            CardCategory::Battles => "Battles",
            CardCategory::Planeswalkers => "Planeswalkers",
            CardCategory::Lands => "Lands",
            CardCategory::UtilityLands => "Utility Lands",
        }
    }

    /// Looks a category up by its upstream tag
    pub fn from_tag(tag: &str) -> Option<CardCategory> {
        CardCategory::all()
            .iter()
            .copied()
            .find(|category| category.tag() == tag)
    }
}
