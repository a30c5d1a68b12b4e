mod filesystem;
mod memory;
mod storage;

pub use filesystem::{FilesystemSessionStore, SESSION_FILE_NAME};
pub use memory::MemorySessionStore;
pub use storage::SessionStore;
