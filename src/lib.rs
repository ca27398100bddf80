// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::redundant_closure)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Filler
//!
//! Populates PDF AcroForm templates from typed records.
//!
//! Every record field carries a declarative [`FieldPolicy`](policy::FieldPolicy):
//! whether a value is required, which font, size and color to use, where to
//! place text inside the widget, and whether the value is text, multi-line
//! text, an image file or an embedded 3D asset.
//!
//! ## Core pieces
//!
//! - **Text fitting** ([`layout::text_fit`]): largest integer font size at which
//!   wrapped multi-line text fits a fixed rectangle
//! - **Placement** ([`layout::placement`]): nine-way anchoring of a content box
//!   inside a widget rectangle
//! - **Population** ([`populate`]): the per-field decision sequence over a
//!   [`FormSurface`](form::FormSurface)
//! - **Deferred assets** ([`deferred`]): 3D annotations stamped after the
//!   filled document has been written
//! - **Sessions** ([`builder`]): one output document, its temp files and the
//!   deferred pass
//!
//! ## Quick start
//!
//! ```no_run
//! use pdf_filler::{FieldPolicy, FillConfig, PdfBuilder, RecordSchema};
//! use pdf_filler::policy::{FontStyle, Justification};
//!
//! struct Order {
//!     id: u32,
//!     total: i64,
//!     notes: Option<String>,
//! }
//!
//! # fn main() -> pdf_filler::Result<()> {
//! let schema = RecordSchema::new()
//!     .field("Order.Id", |o: &Order| Some(o.id.to_string()), FieldPolicy::required())
//!     .field(
//!         "Order.Total",
//!         |o: &Order| Some(o.total.to_string()),
//!         FieldPolicy::required().with_font(
//!             FontStyle::new()
//!                 .with_justification(Justification::CenterRight)
//!                 .with_warning("lt:0"),
//!         ),
//!     )
//!     .field("Order.Notes", |o: &Order| o.notes.clone(), FieldPolicy::optional().multi_line());
//!
//! let mut builder = PdfBuilder::open("order_template.pdf", "order_42.pdf", FillConfig::default())?;
//! builder.fill_with_schema(&schema, &Order { id: 42, total: -5, notes: None })?;
//! builder.place_deferred_assets()?;
//! builder.save()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Core types
pub mod geometry;
pub mod policy;
pub mod record;

// Fonts and layout
pub mod fonts;
pub mod layout;

// PDF output
pub mod form;
pub mod writer;

// Population
pub mod builder;
pub mod deferred;
pub mod populate;

pub use builder::{PdfBuilder, SessionState};
pub use config::{FillConfig, MultiLineSizing, VerticalAdjustment};
pub use error::{Error, Result};
pub use policy::{ContentKind, FieldPolicy, Presence};
pub use populate::{FieldOutcome, FieldPopulator, PopulateReport};
pub use record::{FieldManifest, FormRecord, RecordField, RecordSchema};
