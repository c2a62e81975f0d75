//! # CLI Module
//!
//! Command implementations behind the `sporltop` binary. Argument parsing
//! lives in `main.rs`; this module turns parsed options into a running
//! service and reports progress on the console with the crate's colored
//! output macros.
//!
//! ## Commands
//!
//! - [`serve`] - Loads `.env` files and configuration, installs logging,
//!   binds the listener and serves the HTTP API until Ctrl-C. Optionally
//!   opens the login page in the default browser.
//!
//! Fatal startup problems (invalid configuration, port already in use) are
//! reported with `error!`, which exits the process with status 1.

mod serve;

pub use serve::{ServeOptions, serve};
