pub mod load_index;
pub mod search;

pub use load_index::*;
pub use search::*;
