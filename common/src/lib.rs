//! auction-ocr Common Library
//!
//! CLIとテストで共有される型とOCRテキストのパーサー

pub mod types;
pub mod layout;
pub mod error;
pub mod parser;
pub mod pairing;

pub use types::{ImageRegion, ParsedNumber, PricedRecord};
pub use layout::ScreenLayout;
pub use error::{Error, Result};
pub use parser::{normalize_title, parse_amounts, parse_prices, split_lines};
pub use pairing::{pair, Pairing};
