pub mod copy_trading;

pub use copy_trading::{Collaborators, CopyTradingTask, CycleSummary};
