//! Subtitle provider for the SubsCenter catalogue.
//!
//! A query goes through three stages:
//! 1. the title is resolved to a catalogue slug (`resolver`, cached);
//! 2. the nested listing for that slug is fetched and flattened into one
//!    record per subtitle id (`flatten`);
//! 3. the caller scores records against its video (`matcher`) and downloads
//!    the one it picks (`archive`).

mod archive;
mod flatten;
mod matcher;
mod resolver;
mod session;
mod subscenter;
mod types;

pub use archive::extract_subtitle;
pub use flatten::flatten_listing;
pub use matcher::{guess_matches, score};
pub use resolver::TitleResolver;
pub use session::{Credentials, Session};
pub use subscenter::SubsCenterProvider;
pub use types::*;
