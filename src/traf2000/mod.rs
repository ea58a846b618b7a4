//! TRAF2000 fixed-width export.
//!
//! Every accepted invoice becomes three records of [`RECORD_WIDTH`]
//! characters: record 0 (accounting header), record 5 (health-expense
//! declaration) and record 1 (original document). Records are described
//! by typed layouts, compiled once per [`Encoder`], and filled by field
//! name.
//!
//! # Example
//!
//! ```ignore
//! use traf2000::traf2000::*;
//!
//! let encoder = Encoder::new(EncoderConfig::default())?;
//! let encoded: Vec<_> = invoices.iter().map(|i| encoder.encode(i)).collect::<Result<_, _>>()?;
//! write_traf2000_file("TRAF2000".as_ref(), &encoded, encoder.config().line_ending)?;
//! ```

mod config;
mod encoder;
pub mod layout;
pub mod pack;
mod record0;
mod record1;
mod record5;
mod writer;

/// Width of every TRAF2000 record, line terminator excluded.
pub const RECORD_WIDTH: usize = 7001;

pub use config::{EncoderConfig, EncoderConfigBuilder, LineEnding};
pub use encoder::{EncodedInvoice, Encoder};
pub use layout::{FieldKind, FieldSpec, LayoutSpec, Record, RecordLayout, Segment};
pub use record0::{LINE_SLOTS, RECORD_0, causale};
pub use record1::RECORD_1;
pub use record5::{EXPENSE_SLOTS, RECORD_5};
pub use writer::{write_credit_note_report, write_traf2000, write_traf2000_file};
