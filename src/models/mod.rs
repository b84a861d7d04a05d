pub mod criteria;
pub mod item;
pub mod loaders;

pub use criteria::MatchCriteria;
pub use item::{Descriptor, ElementSnapshot, Extent, ItemRef};
pub use loaders::{load_profile, Profile};
