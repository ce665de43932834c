pub mod selector;
pub mod store;

pub use selector::*;
pub use store::*;
