//! Domain layer - Core memoization logic and entities

pub mod clock;
pub mod entry;
pub mod error;
pub mod key;
pub mod memo;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::MemoError;
pub use key::{CallKey, KeyComponent, KeySegment, MemoArgs};
pub use memo::{AsyncMemoized, MemoBuilder, MemoStats, Memoized};
pub use store::{EntryStore, UnboundedStore};
