//! Filter parameters for commander queries
//!
//! EDHREC narrows commander statistics by power bracket, deck theme (tag) and
//! budget. [`ParameterSet`] bundles the three optional filters after they have
//! been validated against the fixed tables below, so every downstream step
//! (URL building, cache keys, error messages) works from one checked value.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{EdhrecError, Result};

/// Deck themes EDHREC publishes commander pages for
pub const KNOWN_TAGS: &[&str] = &[
    "aggro",
    "aristocrats",
    "artifacts",
    "auras",
    "big-mana",
    "blink",
    "burn",
    "cantrips",
    "cascade",
    "clones",
    "combo",
    "control",
    "counters",
    "dragons",
    "elves",
    "enchantress",
    "equipment",
    "extra-combats",
    "extra-turns",
    "flash",
    "flying",
    "goblins",
    "graveyard",
    "group-hug",
    "hatebears",
    "humans",
    "infect",
    "landfall",
    "lands",
    "legends",
    "lifegain",
    "mill",
    "plus-1-plus-1-counters",
    "politics",
    "proliferate",
    "ramp",
    "reanimator",
    "sacrifice",
    "self-mill",
    "spellslinger",
    "stax",
    "storm",
    "superfriends",
    "theft",
    "tokens",
    "treasure",
    "tribal",
    "vampires",
    "voltron",
    "wheels",
    "wizards",
    "zombies",
];

/// Power-level bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bracket {
    Exhibition,
    Core,
    Upgraded,
    Optimized,
    Cedh,
}

impl Bracket {
    /// Returns all brackets in upstream order
    pub fn all() -> &'static [Bracket] {
        &[
            Bracket::Exhibition,
            Bracket::Core,
            Bracket::Upgraded,
            Bracket::Optimized,
            Bracket::Cedh,
        ]
    }

    /// Returns the path segment EDHREC uses for this bracket
    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::Exhibition => "exhibition",
            Bracket::Core => "core",
            Bracket::Upgraded => "upgraded",
            Bracket::Optimized => "optimized",
            Bracket::Cedh => "cedh",
        }
    }
}

impl FromStr for Bracket {
    type Err = EdhrecError;

    fn from_str(s: &str) -> Result<Self> {
        Bracket::all()
            .iter()
            .copied()
            .find(|b| b.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| invalid("bracket", s, Bracket::all().iter().map(Bracket::as_str)))
    }
}

/// Deck cost classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Budget,
    Expensive,
}

impl Budget {
    /// Returns both budget classes
    pub fn all() -> &'static [Budget] {
        &[Budget::Budget, Budget::Expensive]
    }

    /// Returns the path segment EDHREC uses for this budget
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Budget => "budget",
            Budget::Expensive => "expensive",
        }
    }
}

impl FromStr for Budget {
    type Err = EdhrecError;

    fn from_str(s: &str) -> Result<Self> {
        Budget::all()
            .iter()
            .copied()
            .find(|b| b.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| invalid("budget", s, Budget::all().iter().map(Budget::as_str)))
    }
}

/// A deck theme taken from [`KNOWN_TAGS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Tag(&'static str);

impl Tag {
    /// Returns the tag's path segment
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl FromStr for Tag {
    type Err = EdhrecError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        KNOWN_TAGS
            .iter()
            .find(|known| **known == wanted)
            .map(|known| Tag(*known))
            .ok_or_else(|| invalid("tag", s, KNOWN_TAGS.iter().copied()))
    }
}

/// Validated bracket/tag/budget filter triple
///
/// Absent fields mean "no filter". Equality, ordering and hashing follow the
/// field order (bracket, tag, budget), so identical filters always produce the
/// same cache key no matter how they were assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParameterSet {
    pub bracket: Option<Bracket>,
    pub tag: Option<Tag>,
    pub budget: Option<Budget>,
}

impl ParameterSet {
    /// Creates an unfiltered parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from loose string values
    ///
    /// # Errors
    /// Returns `EdhrecError::InvalidParameter` naming the first field whose
    /// value is not recognized.
    pub fn build(bracket: Option<&str>, tag: Option<&str>, budget: Option<&str>) -> Result<Self> {
        Ok(Self {
            bracket: bracket.map(str::parse::<Bracket>).transpose()?,
            tag: tag.map(str::parse::<Tag>).transpose()?,
            budget: budget.map(str::parse::<Budget>).transpose()?,
        })
    }

    pub fn with_bracket(mut self, bracket: Bracket) -> Self {
        self.bracket = Some(bracket);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Whether no filter is applied
    pub fn is_empty(&self) -> bool {
        self.bracket.is_none() && self.tag.is_none() && self.budget.is_none()
    }

    /// Path segments appended to a commander route, in upstream order
    pub fn path_segments(&self) -> Vec<&'static str> {
        let mut segments = Vec::with_capacity(3);
        if let Some(bracket) = self.bracket {
            segments.push(bracket.as_str());
        }
        if let Some(tag) = self.tag {
            segments.push(tag.as_str());
        }
        if let Some(budget) = self.budget {
            segments.push(budget.as_str());
        }
        segments
    }

    /// The `themeName` query value: the budget wins over the tag
    pub fn theme_name(&self) -> Option<&'static str> {
        self.budget
            .map(|b| b.as_str())
            .or_else(|| self.tag.map(|t| t.as_str()))
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no filters");
        }
        let mut parts = Vec::new();
        if let Some(bracket) = self.bracket {
            parts.push(format!("bracket '{}'", bracket.as_str()));
        }
        if let Some(tag) = self.tag {
            parts.push(format!("tag '{}'", tag.as_str()));
        }
        if let Some(budget) = self.budget {
            parts.push(format!("budget '{}'", budget.as_str()));
        }
        f.write_str(&parts.join(", "))
    }
}

fn invalid<'a>(
    field: &'static str,
    value: &str,
    allowed: impl Iterator<Item = &'a str>,
) -> EdhrecError {
    EdhrecError::InvalidParameter {
        field,
        value: value.to_string(),
        allowed: format_list(&allowed.collect::<Vec<_>>()),
    }
}

/// Formats `["a", "b", "c"]` as `'a', 'b' and 'c'`
fn format_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => format!("'{}'", only),
        [init @ .., last] => {
            let head: Vec<String> = init.iter().map(|item| format!("'{}'", item)).collect();
            format!("{} and '{}'", head.join(", "), last)
        }
    }
}
