pub mod cash_flows;
pub mod compounding;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(any(feature = "forwards", feature = "fx_forwards"))]
pub mod forwards;

#[cfg(feature = "fra")]
pub mod fra;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::ForwardLabError;
pub use types::*;

/// Standard result type for all forward-lab operations
pub type ForwardLabResult<T> = Result<T, ForwardLabError>;
