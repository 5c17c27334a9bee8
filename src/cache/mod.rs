//! In-memory result cache
//!
//! Results are kept per client instance and expire after a fixed TTL. Keys
//! combine the logical operation, the card slug and the filter set so two
//! requests for the same data always share an entry. Nothing is written to
//! disk; the cache lives and dies with its owner.

mod clock;
mod key;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{build_key, CacheKey, Operation};
pub use manager::{ExpiringCache, DEFAULT_TTL_HOURS};
