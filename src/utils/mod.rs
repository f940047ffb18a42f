//! Utility Functions
//!
//! User-friendly error formatting for the command-line front end.
//!
//! ```rust
//! use upright_diff::utils::format_user_error;
//!
//! let error = anyhow::anyhow!("Failed to open baseline image");
//! eprintln!("{}", format_user_error(&error));
//! ```

pub mod errors;

pub use errors::format_user_error;
