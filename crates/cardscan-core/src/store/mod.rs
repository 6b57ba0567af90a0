//! Local card stores.

mod memory;
mod sqlite;

pub use memory::InMemoryCardStore;
pub use sqlite::SqliteCardStore;
