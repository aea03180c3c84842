pub mod decision;
pub mod trade;

pub use decision::*;
pub use trade::*;
