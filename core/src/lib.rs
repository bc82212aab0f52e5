// Gateway to the external generative model:
// - API client for Gemini behind the ModelGateway seam
// - Request/response data structures
// - Configuration loading
// - Retry policy
// - Shared error types

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export retry module - Explicit retry/backoff around gateway calls
pub mod retry;
pub use retry::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;
