//! biomesort - Sort Minecraft screenshots into folders by biome
//!
//! Screenshots named `{x}_{z}_{id}.png` are looked up against a world's
//! biome data and moved to `{output}/{biome}/{id}.png`.
//!
//! # High-Level API
//!
//! [`pipeline::sort_screenshots`] opens a world, sorts one directory and
//! closes the world again:
//!
//! ```ignore
//! use biomesort::pipeline::{sort_screenshots, PipelineConfig};
//! use biomesort::session::SessionConfig;
//! use biomesort::store::AnvilOpener;
//!
//! let summary = sort_screenshots(
//!     Path::new("saves/MyWorld"),
//!     &SessionConfig::default(),
//!     PipelineConfig::new("screenshots", "sorted"),
//!     &AnvilOpener,
//!     None,
//! )?;
//! println!("{}", summary);
//! ```
//!
//! Lower-level pieces can be used on their own: [`session::WorldSession`]
//! for cached lookups, [`resolver::Resolver`] for coordinate queries and
//! [`naming`] for the filename conventions.

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod resolver;
pub mod session;
pub mod store;

/// Version of the biomesort library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
