//! Change tracking between successive runs

pub mod diff;
pub mod history;
pub mod report;

pub use diff::{ChangeKind, ChannelChange, DiffDetails, DiffEngine, DiffResult};
pub use history::{HistoryEntry, HistoryLog};
