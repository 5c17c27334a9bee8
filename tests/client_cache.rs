//! Integration tests for the client facade
//!
//! Runs the public operations against a stub transport serving canned
//! payloads, with a manual clock driving cache expiry.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Url;

use edhrec::{
    normalize, Bracket, CardCategory, ClientConfig, EdhrecClient, EdhrecError, ManualClock,
    Operation, ParameterSet, RawResponse, Transport, TransportError,
};

const BUILD_ID: &str = "test-build";

/// Commander page for Helga with every panel present
const HELGA: &str = r#"{
    "pageProps": {
        "data": {
            "header": "Helga, Skittish Seer (Commander)",
            "container": {
                "json_dict": {
                    "card": {"name": "Helga, Skittish Seer", "num_decks": 1834},
                    "cardlists": [
                        {"header": "New Cards", "tag": "newcards", "cardviews": [
                            {"name": "Ozolith, the Shattered Spire", "synergy": 0.2}
                        ]},
                        {"header": "Creatures", "tag": "creatures", "cardviews": [
                            {"name": "Llanowar Elves", "synergy": -0.02},
                            {"name": "Hardened Scales", "synergy": 0.45}
                        ]},
                        {"header": "Lands", "tag": "lands", "cardviews": [
                            {"name": "Forest"}
                        ]}
                    ]
                }
            },
            "panels": {
                "piechart": {"content": [
                    {"label": "Creature", "value": 30},
                    {"label": "Land", "value": 36}
                ]},
                "mana_curve": {"1": 8, "2": 12, "3": 10},
                "taglinks": [
                    {"value": "+1/+1 Counters", "slug": "plus-1-plus-1-counters", "count": 1200}
                ]
            }
        }
    }
}"#;

/// Commander page without side panels
const HELGA_CEDH: &str = r#"{"pageProps": {"data": {"container": {"json_dict": {
    "card": {"name": "Helga, Skittish Seer", "num_decks": 12},
    "cardlists": [
        {"header": "Top Cards", "tag": "topcards", "cardviews": [{"name": "Sol Ring"}]}
    ]
}}}}}"#;

/// Filter combination the site has nothing for
const HELGA_EMPTY: &str = r#"{"pageProps": {"data": {"container": {"json_dict": {
    "card": {"name": "Helga, Skittish Seer"},
    "cardlists": []
}}}}}"#;

const SOL_RING: &str = r#"{"name": "Sol Ring", "sanitized": "sol-ring", "cmc": 1, "salt": 1.42}"#;

const AVERAGE_DECK: &str = r#"{"pageProps": {"data": {
    "deck": ["1 Helga, Skittish Seer", "1 Sol Ring", "35 Forest"]
}}}"#;

const DECKS: &str = r#"{"pageProps": {"data": {"table": [{"urlhash": "aB3dE", "price": 412.7}]}}}"#;

const COMBOS: &str = r#"{"pageProps": {"data": {"container": {"json_dict": {"cardlists": [
    {
        "header": "Basalt Monolith + Rings of Brighthearth",
        "href": "/combos/c/1-2",
        "cardviews": [{"name": "Basalt Monolith"}]
    }
]}}}}}"#;

/// Serves canned bodies by URL path and records every request
struct StubTransport {
    routes: Vec<(String, u16, &'static str)>,
    requests: Mutex<Vec<Url>>,
}

impl StubTransport {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers a Next.js data route, e.g. `commanders/helga-skittish-seer`
    fn page(mut self, route: &str, status: u16, body: &'static str) -> Self {
        self.routes
            .push((format!("/_next/data/{}/{}.json", BUILD_ID, route), status, body));
        self
    }

    /// Answers an arbitrary path
    fn path(mut self, path: &str, status: u16, body: &'static str) -> Self {
        self.routes.push((path.to_string(), status, body));
        self
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requested(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        let response = self
            .routes
            .iter()
            .find(|(path, _, _)| path == url.path())
            .map(|(_, status, body)| RawResponse::new(*status, *body))
            .unwrap_or_else(|| RawResponse::new(404, ""));
        Ok(response)
    }
}

/// Fails every request at the network level
struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn get(&self, _url: &Url) -> Result<RawResponse, TransportError> {
        Err(TransportError::Unavailable("connection refused".to_string()))
    }
}

fn helga_transport() -> Arc<StubTransport> {
    Arc::new(
        StubTransport::new()
            .page("commanders/helga-skittish-seer", 200, HELGA)
            .page("commanders/helga-skittish-seer/upgraded", 200, HELGA)
            .page("commanders/helga-skittish-seer/cedh", 200, HELGA_CEDH)
            .page("commanders/helga-skittish-seer/combo/budget", 200, HELGA_EMPTY)
            .page("average-decks/helga-skittish-seer", 200, AVERAGE_DECK)
            .page("decks/helga-skittish-seer", 200, DECKS)
            .page("combos/basalt-monolith", 200, COMBOS)
            .path("/cards/sol-ring", 200, SOL_RING),
    )
}

fn client_with(transport: Arc<StubTransport>, clock: Arc<ManualClock>) -> EdhrecClient {
    EdhrecClient::with_transport(ClientConfig::default().with_build_id(BUILD_ID), transport)
        .with_clock(clock)
}

fn setup() -> (EdhrecClient, Arc<StubTransport>, Arc<ManualClock>) {
    let transport = helga_transport();
    let clock = Arc::new(ManualClock::default());
    (client_with(transport.clone(), clock.clone()), transport, clock)
}

fn upgraded() -> ParameterSet {
    ParameterSet::build(Some("upgraded"), None, None).unwrap()
}

#[test]
fn test_slug_normalization() {
    assert_eq!(
        normalize("Helga, Skittish Seer").unwrap().as_str(),
        "helga-skittish-seer"
    );
}

#[tokio::test]
async fn test_repeated_call_is_served_from_cache() {
    let (client, transport, _) = setup();

    let first = client
        .get_commander_data("Helga, Skittish Seer", &upgraded())
        .await
        .unwrap();
    let second = client
        .get_commander_data("Helga, Skittish Seer", &upgraded())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.cached_entries(), 1);
}

#[tokio::test]
async fn test_name_spellings_share_a_cache_entry() {
    let (client, transport, _) = setup();

    client
        .get_commander_data("Helga, Skittish Seer", &ParameterSet::new())
        .await
        .unwrap();
    client
        .get_commander_data("  helga skittish seer ", &ParameterSet::new())
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_different_brackets_are_fetched_separately() {
    let (client, transport, _) = setup();

    let upgraded = client
        .get_commander_data("Helga, Skittish Seer", &upgraded())
        .await
        .unwrap();
    let cedh = client
        .get_commander_data(
            "Helga, Skittish Seer",
            &ParameterSet::new().with_bracket(Bracket::Cedh),
        )
        .await
        .unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(upgraded.num_decks, Some(1834));
    assert_eq!(cedh.num_decks, Some(12));

    let requested = transport.requested();
    assert_ne!(requested[0], requested[1]);
    assert!(requested[0].path().ends_with("/helga-skittish-seer/upgraded.json"));
    assert!(requested[1].path().ends_with("/helga-skittish-seer/cedh.json"));
}

#[tokio::test]
async fn test_unknown_card_is_not_found() {
    let (client, _, _) = setup();

    match client.get_card_details("Nonexistent Card").await {
        Err(EdhrecError::NotFound { operation, name }) => {
            assert_eq!(operation, Operation::CardDetails);
            assert_eq!(name, "Nonexistent Card");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_filtered_404_is_no_data() {
    let (client, _, _) = setup();
    let params = ParameterSet::new().with_bracket(Bracket::Exhibition);

    let err = client
        .get_commander_data("Helga, Skittish Seer", &params)
        .await
        .unwrap_err();
    assert!(matches!(err, EdhrecError::NoData { .. }));
}

#[tokio::test]
async fn test_empty_filter_combination_is_no_data_and_not_cached() {
    let (client, transport, _) = setup();
    let params = ParameterSet::build(None, Some("combo"), Some("budget")).unwrap();

    for _ in 0..2 {
        match client
            .get_commander_data("Helga, Skittish Seer", &params)
            .await
        {
            Err(EdhrecError::NoData {
                operation,
                params: reported,
                ..
            }) => {
                assert_eq!(operation, Operation::CommanderData);
                assert_eq!(reported, params);
            }
            other => panic!("Expected NoData, got {:?}", other),
        }
    }

    assert_eq!(transport.calls(), 2);
    assert_eq!(client.cached_entries(), 0);
}

#[tokio::test]
async fn test_derived_operations_never_outlive_commander_data() {
    let (client, transport, clock) = setup();
    let name = "Helga, Skittish Seer";
    let params = ParameterSet::new();

    client.get_commander_data(name, &params).await.unwrap();
    clock.advance(Duration::hours(23));
    client.get_top_creatures(name, &params).await.unwrap();
    assert_eq!(transport.calls(), 1);

    clock.advance(Duration::hours(22));
    let creatures = client.get_top_creatures(name, &params).await.unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(creatures.cards.len(), 2);
}

#[tokio::test]
async fn test_derived_results_add_no_cache_entries() {
    let (client, _, _) = setup();
    let name = "Helga, Skittish Seer";
    let params = ParameterSet::new();

    client.get_top_creatures(name, &params).await.unwrap();
    client.get_commander_mana_curve(name, &params).await.unwrap();
    client.get_commander_tags(name, None).await.unwrap();

    assert_eq!(client.cached_entries(), 1);
}

#[tokio::test]
async fn test_derived_no_data_names_requested_operation() {
    let (client, _, _) = setup();
    let params = ParameterSet::build(None, Some("combo"), Some("budget")).unwrap();

    match client.get_commander_cards("Helga, Skittish Seer", &params).await {
        Err(EdhrecError::NoData {
            operation,
            params: reported,
            ..
        }) => {
            assert_eq!(operation, Operation::CommanderCards);
            assert_eq!(reported, params);
        }
        other => panic!("Expected NoData, got {:?}", other),
    }

    let err = client
        .get_top_creatures("Helga, Skittish Seer", &params)
        .await
        .unwrap_err();
    match &err {
        EdhrecError::NoData { operation, .. } => {
            assert_eq!(*operation, Operation::CardGroup(CardCategory::Creatures))
        }
        other => panic!("Expected NoData, got {:?}", other),
    }
    assert!(err.to_string().starts_with("No Creatures available"));
}

#[tokio::test]
async fn test_derived_not_found_names_requested_operation() {
    let (client, _, _) = setup();

    match client
        .get_commander_mana_curve("Nobody Special", &ParameterSet::new())
        .await
    {
        Err(EdhrecError::NotFound { operation, name }) => {
            assert_eq!(operation, Operation::ManaCurve);
            assert_eq!(name, "Nobody Special");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let (client, transport, clock) = setup();

    client.get_card_details("Sol Ring").await.unwrap();
    clock.advance(Duration::hours(24));
    client.get_card_details("Sol Ring").await.unwrap();
    assert_eq!(transport.calls(), 1);

    clock.advance(Duration::hours(1));
    client.get_card_details("Sol Ring").await.unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_custom_ttl_is_honored() {
    let transport = helga_transport();
    let clock = Arc::new(ManualClock::default());
    let config = ClientConfig::default()
        .with_build_id(BUILD_ID)
        .with_cache_ttl(Duration::minutes(5));
    let client = EdhrecClient::with_transport(config, transport.clone()).with_clock(clock.clone());

    client.get_card_details("Sol Ring").await.unwrap();
    clock.advance(Duration::minutes(6));
    client.get_card_details("Sol Ring").await.unwrap();

    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_derived_operations_share_one_fetch() {
    let (client, transport, _) = setup();
    let params = ParameterSet::new();
    let name = "Helga, Skittish Seer";

    let creatures = client.get_top_creatures(name, &params).await.unwrap();
    let lands = client.get_top_lands(name, &params).await.unwrap();
    let new_cards = client.get_new_cards(name, &params).await.unwrap();
    let curve = client.get_commander_mana_curve(name, &params).await.unwrap();
    let types = client
        .get_commander_type_distributions(name, &params)
        .await
        .unwrap();
    let groups = client.get_commander_cards(name, &params).await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(creatures.cards.len(), 2);
    assert_eq!(creatures.cards[1].name, "Hardened Scales");
    assert_eq!(lands.cards[0].name, "Forest");
    assert_eq!(new_cards.cards.len(), 1);
    assert_eq!(curve.buckets.get(&2), Some(&12));
    assert_eq!(types.get("Land"), Some(36));
    assert_eq!(groups.len(), 3);
}

#[tokio::test]
async fn test_missing_category_is_an_empty_group() {
    let (client, _, _) = setup();

    let battles = client
        .get_top_battles("Helga, Skittish Seer", &ParameterSet::new())
        .await
        .unwrap();

    assert!(battles.is_empty());
    assert_eq!(battles.tag, CardCategory::Battles.tag());
}

#[tokio::test]
async fn test_missing_panel_is_malformed() {
    let (client, _, _) = setup();
    let params = ParameterSet::new().with_bracket(Bracket::Cedh);

    match client
        .get_commander_mana_curve("Helga, Skittish Seer", &params)
        .await
    {
        Err(EdhrecError::MalformedResponse { field, .. }) => {
            assert_eq!(field, "panels.mana_curve")
        }
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_commander_tags_use_bracket_only() {
    let (client, transport, _) = setup();

    let tags = client
        .get_commander_tags("Helga, Skittish Seer", None)
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].count, 1200);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_average_deck_and_deck_table() {
    let (client, _, _) = setup();
    let params = ParameterSet::new();

    let deck = client
        .get_commanders_average_deck("Helga, Skittish Seer", &params)
        .await
        .unwrap();
    assert_eq!(deck.commander, "Helga, Skittish Seer");
    assert_eq!(deck.total_cards(), 37);

    let decks = client
        .get_commander_decks("Helga, Skittish Seer", &params)
        .await
        .unwrap();
    assert_eq!(decks[0].url_hash, "aB3dE");
}

#[tokio::test]
async fn test_card_combos_and_links() {
    let (client, transport, _) = setup();

    let combos = client.get_card_combos("Basalt Monolith").await.unwrap();
    assert_eq!(combos.len(), 1);
    assert_eq!(
        client.combo_url(combos[0].href.as_deref().unwrap()),
        "https://edhrec.com/combos/c/1-2"
    );

    let url = &transport.requested()[0];
    assert!(url
        .query_pairs()
        .any(|(key, value)| key == "colors" && value == "basalt-monolith"));
}

#[tokio::test]
async fn test_transport_failure_is_not_cached() {
    let clock = Arc::new(ManualClock::default());
    let client = EdhrecClient::with_transport(
        ClientConfig::default().with_build_id(BUILD_ID),
        Arc::new(OfflineTransport),
    )
    .with_clock(clock);

    let err = client.get_card_details("Sol Ring").await.unwrap_err();
    match err {
        EdhrecError::Transport { url, .. } => {
            assert_eq!(url, "https://json.edhrec.com/cards/sol-ring")
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
    assert_eq!(client.cached_entries(), 0);
}

#[tokio::test]
async fn test_invalid_name_fails_before_any_request() {
    let (client, transport, _) = setup();

    let err = client.get_card_details("   ").await.unwrap_err();
    assert!(matches!(err, EdhrecError::InvalidName { .. }));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_invalid_filter_names_the_value() {
    let err = ParameterSet::build(Some("nonsense"), None, None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bracket"));
    assert!(message.contains("'nonsense'"));
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let (client, transport, _) = setup();

    client.get_card_details("Sol Ring").await.unwrap();
    client.clear_cache();
    assert_eq!(client.cached_entries(), 0);
    client.get_card_details("Sol Ring").await.unwrap();

    assert_eq!(transport.calls(), 2);
}
