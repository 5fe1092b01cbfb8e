//! Ratekeeper Common Types
//!
//! This crate contains the value types shared by the rate engine and its
//! callers: currency codes, correlation identifiers, rate snapshots,
//! conversion results and historical pages.

pub mod identifiers;
pub mod monetary;
pub mod rates;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use rates::*;
pub use error::*;
pub use time::*;
