//! Restoir - Restore Iran Flag.
//!
//! Two independent pieces:
//! - [`patcher`]: swaps the flag emoji image for a bundled one in a live
//!   document (compiled to wasm32 for the content script and userscript)
//! - [`site`]: the one-shot builder for the promotional site and the
//!   extension archives

pub mod patcher;

#[cfg(not(target_arch = "wasm32"))]
pub mod cache;
#[cfg(not(target_arch = "wasm32"))]
pub mod clean;
#[cfg(not(target_arch = "wasm32"))]
pub mod commands;
#[cfg(not(target_arch = "wasm32"))]
pub mod common;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod preflight;
#[cfg(not(target_arch = "wasm32"))]
pub mod site;
#[cfg(not(target_arch = "wasm32"))]
pub mod timing;
