pub mod manager;

pub use manager::{HistoryManager, HISTORY_SLOT};
