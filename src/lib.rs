//! Sitewright - theme runtime for a multi-tenant content platform.
//!
//! Three concerns, loosely coupled through the registry snapshot:
//!
//! ```text
//!  theme directory ──discover──► RegistrySnapshot ──compose──► RenderTree
//!                                       │
//!                    generate ◄─────────┘  (candidates, token merge)
//!                       │
//!                    backup + apply  (whole-theme mutation)
//! ```
//!
//! * [`registry`] scans a theme's component files for `@component`
//!   declarations and builds an immutable manifest.
//! * [`compose`] resolves a page's templates and renders an ordered tree,
//!   splicing page content at the reserved marker component.
//! * [`placeholder`] extracts and substitutes `{{TOKEN}}` placeholders.
//! * [`generate`] drives the LLM-assisted pipeline with deterministic
//!   fallbacks, guarded by [`backup`] snapshots before any mutation.

pub mod backup;
pub mod compose;
pub mod config;
pub mod error;
pub mod generate;
pub mod logger;
pub mod placeholder;
pub mod registry;

pub use config::RuntimeConfig;
pub use error::GenerateError;
