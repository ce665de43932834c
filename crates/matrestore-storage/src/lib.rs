pub mod memory;
pub mod traits;

pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
