//! Layered storage: the primary store plus one secondary store per index

mod primary;
mod secondary;

pub use primary::PrimaryStore;
pub use secondary::{Bucket, SecondaryIndex, SecondaryStore};
