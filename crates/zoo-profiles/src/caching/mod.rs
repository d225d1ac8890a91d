//! # Profile caching infrastructure
//!
//! The cache owns a keyed store mapping a user identifier to one of three
//! states: absent (never requested), pending (a load sequence is in flight),
//! or settled (the ordered, immutable outcome of exactly one load sequence).
//!
//! A load sequence goes through the following steps:
//! - The slot is atomically moved from absent to pending; if it is already
//!   pending or settled, nothing happens. This is what deduplicates
//!   concurrent requests for the same user.
//! - The list endpoint resolves which profiles exist for the user. Any list
//!   failure settles the slot with an empty list.
//! - The summaries are sorted with the current profile first, then one result
//!   is produced per entry, concurrently: entries that are not viewable are
//!   synthesized locally from the summary, the rest go through the detail
//!   endpoint. A failing detail fetch degrades that one entry to a failure
//!   sentinel, never the whole sequence.
//! - The slot settles in the sorted order, regardless of the order in which
//!   the detail fetches completed, and exactly one event is published.
//!
//! No failure escapes a load sequence: the externally observable error signal
//! is the shape of the settled value plus the event kind. There is no
//! eviction, expiry, or refresh; a slot settles once per process lifetime.

mod cache;
mod error;
mod store;


pub use cache::ProfileCache;
pub use error::FetchError;
pub use store::{InMemoryStore, ProfileStore};
