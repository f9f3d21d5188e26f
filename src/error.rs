use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, TrackerError>;

/// Everything a store or session operation can fail with. Input and lookup
/// failures are recoverable at the menu; the wrapped infrastructure errors
/// are not.
#[derive(Error, Debug)]
pub(crate) enum TrackerError {
    #[error("username '{0}' is already taken")]
    DuplicateUser(String),

    #[error("invalid username or password")]
    AuthenticationFailed,

    #[error("transaction type must be 'income' or 'expense', got '{0}'")]
    InvalidKind(String),

    #[error("amount must be a decimal number, got '{0}'")]
    InvalidAmount(String),

    #[error("expected an ISO date (YYYY-MM-DD), got '{0}'")]
    InvalidDate(String),

    #[error("id must be a positive integer, got '{0}'")]
    InvalidId(String),

    #[error("transaction {0} not found")]
    NotFound(i64),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    /// True for conditions the session loop reports and recovers from.
    pub(crate) fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUser(_)
                | Self::AuthenticationFailed
                | Self::InvalidKind(_)
                | Self::InvalidAmount(_)
                | Self::InvalidDate(_)
                | Self::InvalidId(_)
                | Self::NotFound(_)
        )
    }
}
