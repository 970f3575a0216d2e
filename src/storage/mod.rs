pub mod history;

pub use history::HistoryLog;
