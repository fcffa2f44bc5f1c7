//! Session persistence: the durable key/value state behind onboarding.

pub mod file;
pub mod memory;
pub mod session;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::Session;
pub use traits::{SessionStore, keys};
