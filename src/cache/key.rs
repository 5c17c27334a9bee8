//! Cache key derivation

use std::fmt;

use serde::Serialize;

use crate::data::CardCategory;
use crate::params::ParameterSet;
use crate::slug::Slug;

/// Logical queries the client answers
///
/// Keys cached upstream payloads and names the query in errors. Queries
/// derived from the commander page (mana curve, card groups, ...) only
/// appear in errors; their data lives under `CommanderData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Operation {
    CardDetails,
    CardCombos,
    CommanderData,
    AverageDeck,
    CommanderDecks,
    TypeDistribution,
    CommanderTags,
    ManaCurve,
    CommanderCards,
    CardGroup(CardCategory),
}

impl Operation {
    /// Short stable identifier used in keys and log lines
    pub fn id(&self) -> &'static str {
        match self {
            Operation::CardDetails => "card-details",
            Operation::CardCombos => "card-combos",
            Operation::CommanderData => "commander-data",
            Operation::AverageDeck => "average-deck",
            Operation::CommanderDecks => "commander-decks",
            Operation::TypeDistribution => "type-distribution",
            Operation::CommanderTags => "commander-tags",
            Operation::ManaCurve => "mana-curve",
            Operation::CommanderCards => "commander-cards",
            Operation::CardGroup(category) => category.tag(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CardDetails => f.write_str("card details"),
            Operation::CardCombos => f.write_str("combos"),
            Operation::CommanderData => f.write_str("commander data"),
            Operation::AverageDeck => f.write_str("average deck data"),
            Operation::CommanderDecks => f.write_str("deck data"),
            Operation::TypeDistribution => f.write_str("type distribution"),
            Operation::CommanderTags => f.write_str("commander tags"),
            Operation::ManaCurve => f.write_str("mana curve"),
            Operation::CommanderCards => f.write_str("commander cards"),
            Operation::CardGroup(category) => write!(f, "{}", category.header()),
        }
    }
}

/// Identity of one cached result
///
/// Compares and hashes field-wise, so equal inputs always meet in the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub operation: Operation,
    pub slug: Slug,
    pub params: ParameterSet,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segment = |s: Option<&'static str>| s.unwrap_or("-");
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.operation.id(),
            self.slug,
            segment(self.params.bracket.map(|b| b.as_str())),
            segment(self.params.tag.map(|t| t.as_str())),
            segment(self.params.budget.map(|b| b.as_str())),
        )
    }
}

/// Builds the cache key for a query
pub fn build_key(operation: Operation, slug: &Slug, params: &ParameterSet) -> CacheKey {
    CacheKey {
        operation,
        slug: slug.clone(),
        params: *params,
    }
}
