//! Derived-value calculations for the survey report.
//!
//! Every function here is pure: identical inputs always produce the
//! identical output, independent of call order.

pub mod common;
pub mod net_claim;

pub use net_claim::{NetClaim, net_claim, net_claim_from_inputs};
