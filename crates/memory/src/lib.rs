//! Memory for ScoutClaw: the in-process key/value store behind the memory
//! tools, the vector index behind the RAG tools, and the file-backed session
//! history used by the HTTP gateway.

pub mod index;
pub mod session;
pub mod store;

pub use index::{IndexMatch, VectorIndex, cosine_similarity};
pub use session::{SessionStore, SessionTurn, render_context};
pub use store::KeyValueStore;
