//! Export core modules shared across CLI and desktop wrappers.

#[cfg(feature = "excel")]
pub mod excel_core;

#[cfg(feature = "excel")]
pub use excel_core::{generate_excel_buffer, write_link_table};
