//! LLM-assisted website content updater.
//!
//! One run sends a configured set of pages plus a natural-language
//! instruction to an OpenAI-compatible endpoint, then applies the reply:
//! changed file bodies are written back, and a constrained command vocabulary
//! may reorganize a single images directory. The crate enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (response parsing, command
//!   parsing, report types). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, page files, the images
//!   root, the network client).
//!
//! [`update`] coordinates core logic with I/O to implement the `run` command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod update;
