//! Upstream endpoints and URL construction
//!
//! EDHREC serves card details as plain JSON and everything commander-related
//! through Next.js data routes of the form
//! `/_next/data/{build_id}/{route}/{slug}[/{bracket}][/{tag}][/{budget}].json`.
//! The build id changes with every site deploy, so it is scraped from the home
//! page once per client and a known id is used when that fails.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use regex::Regex;
use reqwest::Url;

use crate::cache::Operation;
use crate::error::{EdhrecError, Result};
use crate::params::ParameterSet;
use crate::slug::Slug;
use crate::transport::{Transport, TransportError};

/// Build id used when the current one cannot be discovered
pub const DEFAULT_BUILD_ID: &str = "mI7k8IZ23x74LocK_h-qe";

const NEXT_DATA_PATTERN: &str =
    r#"(?s)<script id="__NEXT_DATA__" type="application/json">(.*?)</script>"#;

/// Context of one logical request, used to build errors
#[derive(Debug, Clone, Copy)]
pub(crate) struct Request<'a> {
    pub operation: Operation,
    pub name: &'a str,
    pub slug: &'a Slug,
    pub params: &'a ParameterSet,
}

impl<'a> Request<'a> {
    pub fn new(
        operation: Operation,
        name: &'a str,
        slug: &'a Slug,
        params: &'a ParameterSet,
    ) -> Self {
        Self {
            operation,
            name,
            slug,
            params,
        }
    }

    /// The entity exists but the filters leave nothing to report
    pub fn no_data(&self) -> EdhrecError {
        EdhrecError::NoData {
            operation: self.operation,
            name: self.name.to_string(),
            params: *self.params,
        }
    }

    /// Upstream answered "not found"
    ///
    /// Without filters that means the entity does not exist. With filters the
    /// site also answers 404 for combinations it has too few decks for, so
    /// that case is reported as missing data.
    pub fn not_found(&self) -> EdhrecError {
        if self.params.is_empty() {
            EdhrecError::NotFound {
                operation: self.operation,
                name: self.name.to_string(),
            }
        } else {
            self.no_data()
        }
    }
}

/// Upstream resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `{json_base_url}/{slug}`
    CardDetail,
    Commanders,
    AverageDecks,
    Decks,
    Combos,
}

impl Endpoint {
    /// Next.js route name, `None` for the plain JSON endpoint
    pub fn route(&self) -> Option<&'static str> {
        match self {
            Endpoint::CardDetail => None,
            Endpoint::Commanders => Some("commanders"),
            Endpoint::AverageDecks => Some("average-decks"),
            Endpoint::Decks => Some("decks"),
            Endpoint::Combos => Some("combos"),
        }
    }
}

/// Builds upstream URLs and runs them through the transport
pub(crate) struct Fetcher {
    transport: Arc<dyn Transport>,
    base_url: String,
    json_base_url: String,
    /// Discovered or configured build id
    build_id: Mutex<Option<String>>,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        json_base_url: &str,
        build_id: Option<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            json_base_url: json_base_url.trim_end_matches('/').to_string(),
            build_id: Mutex::new(build_id),
        }
    }

    /// Fetches the payload for `request` from `endpoint`
    ///
    /// # Errors
    /// * `NotFound` / `NoData` when upstream answers 404 (see [`Request::not_found`])
    /// * `Transport` for network failures and any other non-2xx status
    pub async fn fetch(&self, endpoint: Endpoint, request: &Request<'_>) -> Result<Vec<u8>> {
        let url = match endpoint.route() {
            None => self.card_detail_url(request.slug)?,
            Some(route) => {
                let build_id = self.build_id().await;
                next_data_url(
                    &self.base_url,
                    &build_id,
                    route,
                    request.slug,
                    request.params,
                )?
            }
        };

        log::info!("Fetching {} from EDHREC: {}", request.operation, url);

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|source| EdhrecError::Transport {
                url: url.to_string(),
                source,
            })?;

        if response.status == 404 {
            return Err(request.not_found());
        }
        if !response.is_success() {
            return Err(EdhrecError::Transport {
                url: url.to_string(),
                source: TransportError::Status(response.status),
            });
        }
        Ok(response.body)
    }

    fn card_detail_url(&self, slug: &Slug) -> Result<Url> {
        parse_url(&format!("{}/{}", self.json_base_url, slug), &[])
    }

    /// Returns the build id, discovering it on first use
    async fn build_id(&self) -> String {
        let known = self.lock_build_id().clone();
        if let Some(id) = known {
            return id;
        }

        let id = match self.discover_build_id().await {
            Some(id) => {
                log::debug!("Discovered EDHREC build id {}", id);
                id
            }
            None => {
                log::warn!(
                    "Could not discover EDHREC build id, falling back to {}",
                    DEFAULT_BUILD_ID
                );
                DEFAULT_BUILD_ID.to_string()
            }
        };
        *self.lock_build_id() = Some(id.clone());
        id
    }

    fn lock_build_id(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.build_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn discover_build_id(&self) -> Option<String> {
        let url = Url::parse(&self.base_url).ok()?;
        let response = match self.transport.get(&url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                log::debug!("Home page answered {}", response.status);
                return None;
            }
            Err(e) => {
                log::debug!("Home page request failed: {}", e);
                return None;
            }
        };
        extract_build_id(&String::from_utf8_lossy(&response.body))
    }

    /// Public page of a card
    pub fn card_link(&self, slug: &Slug) -> String {
        format!("{}/cards/{}", self.base_url, slug)
    }

    /// Absolute URL of a combo page given its relative link
    pub fn combo_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Builds a Next.js data route URL
///
/// Same slug and filters always give the same URL.
pub(crate) fn next_data_url(
    base_url: &str,
    build_id: &str,
    route: &str,
    slug: &Slug,
    params: &ParameterSet,
) -> Result<Url> {
    let mut path = format!("{}/_next/data/{}/{}/{}", base_url, build_id, route, slug);
    for segment in params.path_segments() {
        path.push('/');
        path.push_str(segment);
    }
    path.push_str(".json");

    let mut query = vec![("commanderName", slug.as_str())];
    if let Some(theme) = params.theme_name() {
        query.push(("themeName", theme));
    }
    if route == "combos" {
        query.push(("colors", slug.as_str()));
    }
    parse_url(&path, &query)
}

/// Parses `url`, appending `query` when it is not empty
fn parse_url(url: &str, query: &[(&str, &str)]) -> Result<Url> {
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    parsed.map_err(|e| EdhrecError::Transport {
        url: url.to_string(),
        source: TransportError::Unavailable(format!("invalid URL: {}", e)),
    })
}

/// Reads `buildId` from the `__NEXT_DATA__` script block of a page
pub(crate) fn extract_build_id(html: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(NEXT_DATA_PATTERN).ok())
        .as_ref()?;

    let props = pattern.captures(html)?.get(1)?.as_str();
    let data: serde_json::Value = serde_json::from_str(props).ok()?;
    data.get("buildId")?.as_str().map(str::to_string)
}
