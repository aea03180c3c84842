pub mod adapters;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod risk;
pub mod services;

pub use adapters::{EventSource, ExecutionReport, MarketCheck, MarketChecker, OrderExecutor, SessionManager};
pub use config::AppConfig;
pub use coordination::{
    install_signal_handlers, shutdown_channel, CancelSignal, CycleCircuitBreaker, CycleTask,
    Scheduler, SchedulerConfig, ShutdownHandle, ShutdownSignal,
};
pub use domain::{ExecutionDecision, ExecutionDetails, ExecutionStatus, ExitMode, LeaderTrade, Side};
pub use error::{CopyTradeError, Result};
pub use persistence::{ResultRecorder, StateStore};
pub use risk::RiskGate;
pub use services::{Collaborators, CopyTradingTask, CycleSummary};
