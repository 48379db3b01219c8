pub mod clock;
pub mod keys;
pub mod memory;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::{MemoryAggregateStore, ScoredMember};
pub use store::AggregateStore;

#[cfg(any(test, feature = "testing"))]
pub use store::MockAggregateStore;
