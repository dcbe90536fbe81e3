pub mod board;
pub mod record;
pub mod trend;

pub use board::*;
pub use record::*;
pub use trend::*;
