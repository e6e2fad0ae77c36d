pub mod fsck;
pub mod log;
pub mod lookup;

pub use fsck::{fsck, FsckReport};
pub use log::{log, History, HistoryEntry};
pub use lookup::{lookup, peel_to_commit};
