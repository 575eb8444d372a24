// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod role;
pub mod turn;
pub mod usage;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::{ChatResponse, Choice};
pub use role::Role;
pub use turn::{RawInputRecord, Turn};
pub use usage::Usage;
