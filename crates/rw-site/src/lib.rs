//! Site content for RW.
//!
//! Loads markdown content, front matter and data files at startup and
//! resolves request paths to render contexts. Also provides the markdown
//! [`MarkdownPageRenderer`] and the [`HeadingExtractor`] used by the
//! `rw-pages` pipeline.
//!
//! # Example
//!
//! ```ignore
//! use rw_site::{Site, SiteConfig};
//!
//! let site = Site::load(config)?;
//! let resolution = site.resolve("/en/get-started/quickstart");
//! ```

mod data;
mod error;
mod front_matter;
mod headings;
mod renderer;
mod scanner;
mod site;

pub use error::SiteError;
pub use headings::HeadingExtractor;
pub use renderer::{MarkdownPageRenderer, render_inline, render_markdown};
pub use site::{Resolution, Site, SiteConfig};
