//! Integration tests for the HTTP transport against a mock EDHREC server

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edhrec::{ClientConfig, EdhrecClient, EdhrecError, ParameterSet, TransportError};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.uri())
        .with_json_base_url(format!("{}/cards", server.uri()))
        .with_user_agent("edhrec-tests")
        .with_timeout(Duration::from_secs(5))
}

fn commander_page(num_decks: u64) -> serde_json::Value {
    json!({
        "pageProps": {
            "data": {
                "container": {
                    "json_dict": {
                        "card": {"name": "Helga, Skittish Seer", "num_decks": num_decks},
                        "cardlists": [
                            {"header": "Creatures", "tag": "creatures", "cardviews": [
                                {"name": "Hardened Scales", "synergy": 0.45}
                            ]}
                        ]
                    }
                }
            }
        }
    })
}

#[tokio::test]
async fn test_card_details_send_expected_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/sol-ring"))
        .and(header("user-agent", "edhrec-tests"))
        .and(header("accept", "application/json"))
        .and(header("cookie", "userState=session42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Sol Ring",
            "sanitized": "sol-ring",
            "prices": {"tcgplayer": {"price": 1.25}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EdhrecClient::with_config(config_for(&server).with_cookie("session42")).unwrap();
    let card = client.get_card_details("Sol Ring").await.unwrap();

    assert_eq!(card.name, "Sol Ring");
    assert_eq!(card.prices.get("tcgplayer"), Some(&1.25));
}

#[tokio::test]
async fn test_configured_build_id_is_used_in_route() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/_next/data/fixed-build/commanders/helga-skittish-seer/upgraded.json",
        ))
        .and(query_param("commanderName", "helga-skittish-seer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commander_page(640)))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).with_build_id("fixed-build");
    let client = EdhrecClient::with_config(config).unwrap();
    let params = ParameterSet::build(Some("upgraded"), None, None).unwrap();
    let creatures = client
        .get_top_creatures("Helga, Skittish Seer", &params)
        .await
        .unwrap();

    assert_eq!(creatures.cards[0].name, "Hardened Scales");
}

#[tokio::test]
async fn test_build_id_is_discovered_from_home_page() {
    let server = MockServer::start().await;

    let home = r#"<html><body>
        <script id="__NEXT_DATA__" type="application/json">{"buildId":"live-build"}</script>
        </body></html>"#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(home))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_next/data/live-build/commanders/helga-skittish-seer.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commander_page(1834)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_next/data/live-build/commanders/helga-skittish-seer/cedh.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commander_page(12)))
        .mount(&server)
        .await;

    let client = EdhrecClient::with_config(config_for(&server)).unwrap();
    let all = client
        .get_commander_data("Helga, Skittish Seer", &ParameterSet::new())
        .await
        .unwrap();
    let cedh = client
        .get_commander_data(
            "Helga, Skittish Seer",
            &ParameterSet::build(Some("cedh"), None, None).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(all.num_decks, Some(1834));
    assert_eq!(cedh.num_decks, Some(12));
}

#[tokio::test]
async fn test_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/nonexistent-card"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = EdhrecClient::with_config(config_for(&server)).unwrap();
    let err = client.get_card_details("Nonexistent Card").await.unwrap_err();

    assert!(matches!(err, EdhrecError::NotFound { .. }));
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/sol-ring"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = EdhrecClient::with_config(config_for(&server)).unwrap();
    for _ in 0..2 {
        match client.get_card_details("Sol Ring").await {
            Err(EdhrecError::Transport { source, .. }) => {
                assert!(matches!(source, TransportError::Status(503)))
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_invalid_json_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/sol-ring"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = EdhrecClient::with_config(config_for(&server)).unwrap();
    let err = client.get_card_details("Sol Ring").await.unwrap_err();

    assert!(matches!(err, EdhrecError::MalformedResponse { .. }));
}
