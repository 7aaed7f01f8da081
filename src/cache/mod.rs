//! Cache core: the stored entry and the tiered facade.
//!
//! - [`entry`]: the envelope every tier persists and its liveness rules
//! - [`tiered`]: the public facade that owns the four tiers

pub mod entry;
pub mod tiered;
