//! EDHREC client
//!
//! [`EdhrecClient`] answers one public operation per kind of query. Every
//! operation follows the same path: normalize the name, build the cache key,
//! return a fresh cached record if there is one, otherwise fetch, normalize
//! and cache the result. Failures are never cached, so the next call retries.
//!
//! Commander-derived queries (top creatures, mana curve, ...) are projected
//! from [`EdhrecClient::get_commander_data`] on every call. They share a single
//! upstream fetch per commander and filter set and expire with it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::cache::{build_key, CacheKey, Clock, ExpiringCache, Operation, DEFAULT_TTL_HOURS};
use crate::data::card::normalize_card_detail;
use crate::data::combo::normalize_combos;
use crate::data::commander::normalize_commander;
use crate::data::deck::{normalize_average_deck, normalize_deck_table};
use crate::data::{
    CardCategory, CardDetail, CardGroup, Combo, CommanderData, DeckList, DeckSummary, ManaCurve,
    TagCount, TypeDistribution,
};
use crate::endpoint::{Endpoint, Fetcher, Request};
use crate::error::{EdhrecError, Result};
use crate::params::{Bracket, ParameterSet};
use crate::slug::normalize;
use crate::transport::{HttpTransport, Transport};

const DEFAULT_BASE_URL: &str = "https://edhrec.com";
const DEFAULT_JSON_BASE_URL: &str = "https://json.edhrec.com/cards";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Site root, used for Next.js data routes and links
    pub base_url: String,
    /// Root of the card detail JSON endpoint
    pub json_base_url: String,
    /// How long results stay cached
    pub cache_ttl: Duration,
    pub user_agent: String,
    /// Per-request timeout enforced by the HTTP transport
    pub timeout: StdDuration,
    /// Optional `userState` session cookie
    pub cookie: Option<String>,
    /// Fixed Next.js build id; discovered from the home page when `None`
    pub build_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            json_base_url: DEFAULT_JSON_BASE_URL.to_string(),
            cache_ttl: Duration::hours(DEFAULT_TTL_HOURS),
            user_agent: concat!("edhrec-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: StdDuration::from_secs(DEFAULT_TIMEOUT_SECS),
            cookie: None,
            build_id: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_json_base_url(mut self, json_base_url: impl Into<String>) -> Self {
        self.json_base_url = json_base_url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }
}

/// Any record the client caches
#[derive(Debug, Clone)]
enum Record {
    CardDetail(CardDetail),
    Combos(Vec<Combo>),
    Commander(CommanderData),
    AverageDeck(DeckList),
    Decks(Vec<DeckSummary>),
}

/// Conversion between a record type and its cache slot
trait Cacheable: Clone + Sized {
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! impl_cacheable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Cacheable for $ty {
                fn into_record(self) -> Record {
                    Record::$variant(self)
                }

                fn from_record(record: Record) -> Option<Self> {
                    match record {
                        Record::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_cacheable! {
    CardDetail => CardDetail,
    Vec<Combo> => Combos,
    CommanderData => Commander,
    DeckList => AverageDeck,
    Vec<DeckSummary> => Decks,
}

/// Client for EDHREC recommendation data
///
/// Each instance owns its cache, so clients with different TTLs can coexist.
pub struct EdhrecClient {
    fetcher: Fetcher,
    cache: ExpiringCache<CacheKey, Record>,
}

impl EdhrecClient {
    /// Creates a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client talking HTTP with the given configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.user_agent,
            config.timeout,
            config.cookie.as_deref(),
        )
        .map_err(|source| EdhrecError::Transport {
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            fetcher: Fetcher::new(
                transport,
                &config.base_url,
                &config.json_base_url,
                config.build_id,
            ),
            cache: ExpiringCache::new(config.cache_ttl),
        }
    }

    /// Replaces the cache time source, dropping anything cached so far
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = ExpiringCache::with_clock(self.cache.ttl(), clock);
        self
    }

    /// Drops every cached result
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached results
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Public EDHREC page of a card
    pub fn card_link(&self, name: &str) -> Result<String> {
        Ok(self.fetcher.card_link(&normalize(name)?))
    }

    /// Absolute URL of a combo page from its relative link
    pub fn combo_url(&self, path: &str) -> String {
        self.fetcher.combo_url(path)
    }

    /// Returns the cached value for `key` or runs `load` and caches its result
    async fn cached<T, F, Fut>(&self, key: CacheKey, load: F) -> Result<T>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.cache.get(&key).and_then(T::from_record) {
            log::debug!("Cache hit for {}", key);
            return Ok(value);
        }

        log::debug!("Cache miss for {}", key);
        let value = load().await?;
        self.cache.put(key, value.clone().into_record());
        Ok(value)
    }

    /// Fetches and caches one upstream payload
    async fn load<T, N>(
        &self,
        operation: Operation,
        endpoint: Endpoint,
        name: &str,
        params: &ParameterSet,
        normalize_body: N,
    ) -> Result<T>
    where
        T: Cacheable,
        N: FnOnce(&[u8], &Request<'_>) -> Result<T>,
    {
        let slug = normalize(name)?;
        let key = build_key(operation, &slug, params);
        self.cached(key, move || async move {
            let request = Request::new(operation, name, &slug, params);
            let body = self.fetcher.fetch(endpoint, &request).await?;
            normalize_body(&body, &request)
        })
        .await
    }

    /// Commander page behind a derived operation
    ///
    /// Derived results are not cached on their own: they are read from the
    /// commander data entry on every call, so they expire together with it.
    /// Lookup failures are reported against `operation`.
    async fn commander_for(
        &self,
        operation: Operation,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CommanderData> {
        self.get_commander_data(name, params)
            .await
            .map_err(|e| e.for_operation(operation))
    }

    /// Card details from the card JSON endpoint
    pub async fn get_card_details(&self, name: &str) -> Result<CardDetail> {
        self.load(
            Operation::CardDetails,
            Endpoint::CardDetail,
            name,
            &ParameterSet::new(),
            normalize_card_detail,
        )
        .await
    }

    /// Combos that include the card
    pub async fn get_card_combos(&self, name: &str) -> Result<Vec<Combo>> {
        self.load(
            Operation::CardCombos,
            Endpoint::Combos,
            name,
            &ParameterSet::new(),
            normalize_combos,
        )
        .await
    }

    /// The full commander page for the given filters
    ///
    /// # Errors
    /// * `NotFound` if the commander does not exist
    /// * `NoData` if it exists but the filters leave no card lists
    pub async fn get_commander_data(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CommanderData> {
        self.load(
            Operation::CommanderData,
            Endpoint::Commanders,
            name,
            params,
            normalize_commander,
        )
        .await
    }

    /// The commander's average deck
    pub async fn get_commanders_average_deck(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<DeckList> {
        self.load(
            Operation::AverageDeck,
            Endpoint::AverageDecks,
            name,
            params,
            |body, request| normalize_average_deck(body, name, request),
        )
        .await
    }

    /// User decks listed for the commander
    pub async fn get_commander_decks(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<Vec<DeckSummary>> {
        self.load(
            Operation::CommanderDecks,
            Endpoint::Decks,
            name,
            params,
            normalize_deck_table,
        )
        .await
    }

    /// Card type breakdown of the commander's decks
    pub async fn get_commander_type_distributions(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<TypeDistribution> {
        let data = self.commander_for(Operation::TypeDistribution, name, params).await?;
        data.type_distribution
            .ok_or_else(|| EdhrecError::missing("TypeDistribution", "panels.piechart.content"))
    }

    /// Themes played with the commander; only the bracket narrows them
    pub async fn get_commander_tags(
        &self,
        name: &str,
        bracket: Option<Bracket>,
    ) -> Result<Vec<TagCount>> {
        let params = ParameterSet {
            bracket,
            ..ParameterSet::default()
        };
        let data = self.commander_for(Operation::CommanderTags, name, &params).await?;
        Ok(data.tags)
    }

    /// Cards per mana value in the commander's decks
    pub async fn get_commander_mana_curve(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<ManaCurve> {
        let data = self.commander_for(Operation::ManaCurve, name, params).await?;
        data.mana_curve
            .ok_or_else(|| EdhrecError::missing("ManaCurve", "panels.mana_curve"))
    }

    /// Every card list on the commander page, in page order
    pub async fn get_commander_cards(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<Vec<CardGroup>> {
        let data = self.commander_for(Operation::CommanderCards, name, params).await?;
        Ok(data.card_groups)
    }

    /// One card list of the commander page; empty if the page lacks it
    pub async fn get_card_group(
        &self,
        name: &str,
        category: CardCategory,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        let data = self.commander_for(Operation::CardGroup(category), name, params).await?;
        Ok(data.group(category))
    }

    pub async fn get_new_cards(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::NewCards, params).await
    }

    pub async fn get_high_synergy_cards(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::HighSynergyCards, params).await
    }

    pub async fn get_top_cards(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::TopCards, params).await
    }

    pub async fn get_top_creatures(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Creatures, params).await
    }

    pub async fn get_top_instants(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Instants, params).await
    }

    pub async fn get_top_sorceries(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Sorceries, params).await
    }

    /// Utility artifacts (mana rocks are listed separately)
    pub async fn get_top_artifacts(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::UtilityArtifacts, params).await
    }

    pub async fn get_top_mana_artifacts(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::ManaArtifacts, params).await
    }

    pub async fn get_top_enchantments(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Enchantments, params).await
    }

    pub async fn get_top_battles(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Battles, params).await
    }

    pub async fn get_top_planeswalkers(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Planeswalkers, params).await
    }

    pub async fn get_top_lands(&self, name: &str, params: &ParameterSet) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::Lands, params).await
    }

    pub async fn get_top_utility_lands(
        &self,
        name: &str,
        params: &ParameterSet,
    ) -> Result<CardGroup> {
        self.get_card_group(name, CardCategory::UtilityLands, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://edhrec.com");
        assert_eq!(config.json_base_url, "https://json.edhrec.com/cards");
        assert_eq!(config.cache_ttl, Duration::hours(24));
        assert_eq!(config.timeout, StdDuration::from_secs(30));
        assert!(config.cookie.is_none());
        assert!(config.build_id.is_none());
        assert!(config.user_agent.starts_with("edhrec-rs/"));
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080")
            .with_cache_ttl(Duration::minutes(10))
            .with_cookie("userState=abc")
            .with_build_id("build42");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.cache_ttl, Duration::minutes(10));
        assert_eq!(config.cookie.as_deref(), Some("userState=abc"));
        assert_eq!(config.build_id.as_deref(), Some("build42"));
    }

    #[test]
    fn test_cacheable_round_trip_rejects_other_variants() {
        let record = Vec::<Combo>::new().into_record();
        assert!(Vec::<Combo>::from_record(record.clone()).is_some());
        assert!(Vec::<DeckSummary>::from_record(record).is_none());
    }

    #[test]
    fn test_card_link() {
        let client = EdhrecClient::new().unwrap();
        assert_eq!(
            client.card_link("Helga, Skittish Seer").unwrap(),
            "https://edhrec.com/cards/helga-skittish-seer"
        );
        assert!(client.card_link("").is_err());
        assert_eq!(client.combo_url("/combos/abc"), "https://edhrec.com/combos/abc");
    }
}
