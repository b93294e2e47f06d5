pub mod media_item;

pub use media_item::*;
