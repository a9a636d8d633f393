//! Script inventory and Subresource Integrity tooling for a web application's
//! build output.
//!
//! Two phases run against a build directory:
//!
//! - [`inventory::generate`] writes `scripts-inventory.json`, listing every
//!   local and external script the application may load together with its
//!   `sha384-` digest.
//! - [`sri::inject`] rewrites HTML files in place, adding `integrity`
//!   attributes to `<script>`/`<link>` elements that reference local assets.
//!
//! [`cli::run`] drives both phases from a single [`config::Config`].

pub mod args;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod html;
pub mod inventory;
pub mod path_utils;
pub mod sri;

pub use config::Config;
pub use error::{Error, Result};

/// File written into the target directory by the inventory phase.
pub const INVENTORY_FILE_NAME: &str = "scripts-inventory.json";

/// HTML entry point scanned by the inventory phase and rewritten by default.
pub const INDEX_FILE_NAME: &str = "index.html";
