pub mod cache;
pub mod config;
pub mod guess;
pub mod language;
pub mod metrics;
pub mod provider;
pub mod testing;
pub mod text;
pub mod transport;
pub mod video;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use language::{Language, LanguageError};
pub use provider::{
    MatchTag, MediaKind, ProviderError, SubsCenterProvider, SubtitleQuery, SubtitleRecord,
};
pub use transport::{HttpRequest, HttpResponse, Transport, TransportError};
pub use video::{Episode, Movie, ReleaseAttributes, Video};
