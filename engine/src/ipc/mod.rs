//! IPC (Inter-Process Communication) Module
//!
//! The boundary between the engine and a UI layer: command payload routing,
//! response DTOs, the camelCase style mapping and transcript ingestion.

mod commands;
mod dto;
mod payloads;
mod style;
mod transcript;

pub use commands::*;
pub use dto::*;
pub use payloads::*;
pub use style::*;
pub use transcript::*;

#[cfg(test)]
mod tests_destructive;
