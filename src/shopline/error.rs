use thiserror::Error;

const PROFILE_HINT: &str = "run 'spl auth ls' to list profiles or 'spl auth login' to add one";

#[derive(Error, Debug)]
pub enum ShoplineError {
    #[error("profile not found: {requested}; {}", PROFILE_HINT)]
    ProfileNotFound { requested: String },

    #[error(
        "profile not found: {requested} (multiple matches: {}); use --store with an exact profile name and {}",
        .candidates.join(", "),
        PROFILE_HINT
    )]
    AmbiguousProfile {
        requested: String,
        candidates: Vec<String>,
    },

    #[error("no store profiles configured, run 'spl auth login'")]
    NoProfiles,

    #[error("multiple profiles configured, use --store to select one")]
    MultipleProfiles,

    #[error("failed to open credential store: {0}")]
    CredentialStore(String),

    #[error("command '{command}' has no flag --{flag}")]
    UnknownFlag { command: String, flag: String },

    #[error("{0}")]
    Usage(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShoplineError>;
