//! Edit Command System
//!
//! Every caption mutation is performed through a Command in this module, so
//! the executor can undo and redo it exactly.

mod bulk;
mod caption;
mod executor;
mod structure;
mod traits;

pub use bulk::*;
pub use caption::*;
pub use executor::*;
pub use structure::*;
pub use traits::*;
