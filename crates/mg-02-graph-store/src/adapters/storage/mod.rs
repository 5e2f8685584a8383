mod file;
mod memory;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
