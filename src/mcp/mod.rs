//! MCP function-call surface: the closed set of callable functions and the
//! dispatcher that translates every outcome into the uniform envelope.

pub mod dispatcher;

pub use dispatcher::{ErrorBody, FunctionCall, FunctionDispatcher, FunctionResponse};
