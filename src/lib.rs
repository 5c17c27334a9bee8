//! EDHREC client library
//!
//! Read-only access to EDHREC commander and card recommendation data. The
//! [`EdhrecClient`] turns card names into URL slugs, fetches the matching
//! upstream payloads, normalizes them into the records in [`data`] and keeps
//! results in a per-client cache for 24 hours by default.
//!
//! ```no_run
//! # async fn run() -> edhrec::Result<()> {
//! use edhrec::{EdhrecClient, ParameterSet};
//!
//! let client = EdhrecClient::new()?;
//! let params = ParameterSet::build(Some("upgraded"), None, Some("budget"))?;
//! let creatures = client.get_top_creatures("Helga, Skittish Seer", &params).await?;
//! for card in &creatures.cards {
//!     println!("{}", card.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod data;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod slug;
pub mod transport;

pub use cache::{Clock, ManualClock, Operation, SystemClock};
pub use client::{ClientConfig, EdhrecClient};
pub use data::{
    CardCategory, CardDetail, CardGroup, CardSummary, Combo, CommanderData, DeckEntry, DeckList,
    DeckSummary, ManaCurve, TagCount, TypeDistribution, TypeShare,
};
pub use error::{EdhrecError, Result};
pub use params::{Bracket, Budget, ParameterSet, Tag};
pub use slug::{normalize, Slug};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
