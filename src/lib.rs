//! sdc-suppress — iterative latent-revelation cell suppression for
//! privacy-safe tabular aggregates.
//!
//! Given a table of dimension-tuple counts, this crate redacts every cell
//! below a publication threshold (primary suppression), then repeatedly
//! checks every way the remaining cells could be combined and subtracted
//! to reconstruct a redacted cell's value, redacting further cells until
//! no such path remains (secondary / "complementary" suppression).
//!
//! # Theoretical basis
//!
//! - **Cox (1980)**: "Suppression Methodology and Statistical Disclosure
//!   Control", Journal of the American Statistical Association.
//! - **Cox (1995)**: "Network Models for Complementary Cell Suppression",
//!   JASA, the source of the subtraction/linear-system framing this
//!   crate's axis scan specializes to sum-consistent marginal tables.
//! - **Willenborg & de Waal (2001)**: "Elements of Statistical
//!   Disclosure Control", the standard reference for primary/secondary
//!   suppression terminology used throughout this crate's doc comments.
//!
//! # Entry point
//!
//! [`suppress`] is the only function most callers need:
//!
//! ```no_run
//! use sdc_suppress::{ConfigBuilder, InputRow, InputValue, suppress};
//!
//! let config = ConfigBuilder::new()
//!     .threshold(11)
//!     .dimensions(["zip", "age"])
//!     .incidence_column("n")
//!     .build()
//!     .unwrap();
//!
//! let mut row = InputRow::new();
//! row.set("zip", InputValue::Text("00000".into()));
//! row.set("age", InputValue::Text("35".into()));
//! row.set("n", InputValue::Integer(3));
//!
//! let output = suppress(vec![row], &config).unwrap();
//! assert!(output.rows[0].is_redacted);
//! ```

#![deny(unsafe_code)]
#![allow(dead_code)]

mod axis;
mod classify;
pub mod config;
pub mod dim;
pub mod error;
mod engine;
pub mod input;
mod merge;
pub mod output;
pub mod row;
mod scan;

pub use classify::PopulationLookup;
pub use config::{Config, ConfigBuilder};
pub use dim::{DimKey, DimValue};
pub use engine::{suppress, suppress_with_population};
pub use error::SuppressionError;
pub use input::{InputRow, InputValue};
pub use output::{OutputRow, SuppressionOutput, SuppressionStats};
pub use row::{PeerDescriptor, Row, RowId};
