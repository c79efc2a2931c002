//! Pipeline entry points for harvester operations.
//!
//! - `Synchronizer`: scrape, diff against the corpus, merge and persist
//! - `Scheduler`: run the synchronizer periodically
//! - `QueryView`: filtered, paginated reads over a corpus snapshot

pub mod diff;
pub mod query;
pub mod schedule;
pub mod sync;

pub use diff::{Delta, compute_delta, merge};
pub use query::{DEFAULT_PAGE_SIZE, QueryView, query};
pub use schedule::{ScheduleStats, Scheduler};
pub use sync::{SyncReport, Synchronizer};
