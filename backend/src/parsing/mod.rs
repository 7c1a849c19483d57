//! Parsers for planner input files.
//!
//! - [`targets_parser`]: plain-text target lists, one identifier per line
//!
//! # Example
//!
//! ```no_run
//! use obsplan::parsing::targets_parser::load_target_list;
//! use std::path::Path;
//!
//! let names = load_target_list(Path::new("targets.txt"))
//!     .expect("Failed to read targets");
//! ```

pub mod targets_parser;


pub use targets_parser::{load_target_list, parse_target_list};
