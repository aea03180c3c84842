pub mod demo;
pub mod traits;

pub use demo::{DemoEventSource, DemoOrderExecutor, LoggingSession, StaticMarketChecker};
pub use traits::{
    EventSource, ExecutionReport, MarketCheck, MarketChecker, OrderExecutor, SessionManager,
};

#[cfg(test)]
pub use traits::{MockEventSource, MockMarketChecker, MockOrderExecutor, MockSessionManager};
