//! Invoice model, validation, and diagnostics.
//!
//! This module holds the normalized invoice produced by the importers and
//! consumed by the TRAF2000 encoder, plus the eligibility rules applied in
//! between.

mod builder;
mod error;
pub mod events;
mod name;
mod types;
mod validation;

pub use builder::*;
pub use error::*;
pub use events::{Channel, Event, EventSink, MemorySink, Severity, Tee, TracingSink};
pub use name::CustomerName;
pub use types::*;
pub use validation::*;
