//! # traf2000
//!
//! Converts periodic invoice exports of a hospital billing platform (CSV or
//! XML) into TRAF2000, the fixed-width positional format read by the
//! accounting package.
//!
//! Amounts are signed integer cents throughout; decimal text from the
//! sources is parsed with [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use traf2000::core::*;
//! use traf2000::traf2000::{Encoder, EncoderConfig, RECORD_WIDTH};
//!
//! let invoice = InvoiceBuilder::new("CCSR/00123", DocumentKind::Invoice, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .customer("ROSSI", "MARIO")
//!     .tax_id("RSSMRA80A01G702X")
//!     .add_line("Visita specialistica", 12000)
//!     .add_line("Bollo", 200)
//!     .build()
//!     .unwrap();
//!
//! assert!(validate_invoice(&invoice).is_empty());
//!
//! let encoder = Encoder::new(EncoderConfig::default()).unwrap();
//! let encoded = encoder.encode(&invoice).unwrap();
//! assert_eq!(encoded.record0().len(), RECORD_WIDTH);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, validation, diagnostics |
//! | `csv` (default) | CSV export importer |
//! | `xml` (default) | XML export importer and schema check |
//! | `traf2000` (default) | Record layouts, encoder, writer, pipeline |
//! | `cli` | `traf2000` command-line binary |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod import;

#[cfg(feature = "traf2000")]
pub mod traf2000;

#[cfg(feature = "traf2000")]
pub mod pipeline;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
