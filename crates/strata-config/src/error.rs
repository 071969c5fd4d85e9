//! Errors raised while loading, saving or validating `worldgen.ron`.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read worldgen config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write worldgen config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`crate::WorldGenConfig`].
    #[error("failed to parse worldgen config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize worldgen config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The file parsed but describes an impossible world.
    #[error("invalid worldgen setting `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending setting, e.g. `caves.tunnel_radius`.
        field: String,
        reason: String,
    },
}
