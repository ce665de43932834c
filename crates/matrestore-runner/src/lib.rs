pub mod config;
pub mod env;
pub mod report;
pub mod restore;
pub mod runner;
pub mod util;

pub use config::*;
pub use env::*;
pub use restore::*;
pub use runner::*;
pub use util::*;
