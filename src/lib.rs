//! Convert QFX/OFX bank statements into flat CSV or JSON transaction records.
//!
//! ```rust,ignore
//! use qfx_convert::{ConvertOptions, OutputFormat, convert_file};
//!
//! let conversion = convert_file(
//!     Path::new("statement.qfx"),
//!     None,
//!     &ConvertOptions { format: OutputFormat::Json, compact: false },
//! )?;
//! println!("{} transactions -> {}", conversion.records, conversion.output.display());
//! ```

mod builder;
mod types;

pub mod cli;
pub mod convert;
pub mod encoding;
pub mod errors;
pub mod normalize;
pub mod parsers;
pub mod writer;

pub use builder::{FileFormat, ParserBuilder};
pub use convert::{ConvertOptions, Conversion, convert_file, default_output_path};
pub use normalize::{NormalizedRecord, normalize};
pub use parsers::prelude::*;
pub use types::{Account, AccountStatement, Statement, Transaction};
pub use writer::{OutputFormat, WriteOptions};
