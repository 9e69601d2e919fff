use strum::{Display, IntoStaticStr};

/// Coarse classification used by callers to pick a response without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    CapacityExceeded,
    DeadlineExpired,
    Unauthorized,
    NotPayable,
    VerificationFailed,
    Persistence,
    Gateway,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("you are already registered for this event")]
    AlreadyRegistered,

    #[error("payment already completed")]
    AlreadyPaid,

    #[error("email already registered")]
    EmailTaken,

    #[error("event is full, no more seats available")]
    EventFull,

    #[error("registration deadline has passed")]
    DeadlinePassed,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("this is a free event")]
    NotPayable,

    #[error("payment verification failed")]
    VerificationFailed,

    #[error("payment gateway: {message}")]
    Gateway { message: String, retryable: bool },

    #[error("{0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        Self::Gateway {
            message: message.into(),
            retryable,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validate(_) | Self::Invalid(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyRegistered | Self::AlreadyPaid | Self::EmailTaken => ErrorKind::Conflict,
            Self::EventFull => ErrorKind::CapacityExceeded,
            Self::DeadlinePassed => ErrorKind::DeadlineExpired,
            Self::Forbidden | Self::InvalidCredentials => ErrorKind::Unauthorized,
            Self::NotPayable => ErrorKind::NotPayable,
            Self::VerificationFailed => ErrorKind::VerificationFailed,
            Self::Gateway { .. } => ErrorKind::Gateway,
            Self::Persistence(_) | Self::Server(_) | Self::Unknown(_) => ErrorKind::Persistence,
        }
    }

    /// Whether the caller may re-attempt the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Gateway { retryable: true, .. })
    }
}

impl From<time::error::Format> for Error {
    fn from(value: time::error::Format) -> Self {
        Self::Unknown(value.into())
    }
}

/// True when the statement was rejected by a UNIQUE index.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(err) => err.is_unique_violation(),
        _ => false,
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Server(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Server(format!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Server(format!($fmt, $($arg)*)))
    };
}
