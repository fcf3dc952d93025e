mod regions;
mod scanner;

pub use regions::{LineMap, Region, RegionKind};
pub use scanner::{next_region, LexError, Regions};
