use std::env;
use std::fmt::{self, Debug, Display};
use std::io;

pub const PERSISTENCE_FAILURE: i32 = 2;
pub const CORRUPT_STATE: i32 = 6;
pub const INVALID_INPUT: i32 = 101;
pub const MISSING_LOCATION: i32 = 102;
pub const PERMISSION_DENIED: i32 = 103;
pub const LOCATION_UNAVAILABLE: i32 = 104;
pub const LOCATION_TIMEOUT: i32 = 105;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    /// Codes below 100 are internal and only ever logged; the rest are shown to the user.
    pub fn is_user_facing(&self) -> bool {
        self.code >= 100
    }

    /// Any failure of the location provider leaves the app without a current position.
    pub fn is_location_failure(&self) -> bool {
        matches!(
            self.code,
            PERMISSION_DENIED | LOCATION_UNAVAILABLE | LOCATION_TIMEOUT
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        persistence_error(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        persistence_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        corrupt_state_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: INVALID_INPUT,
        message: "invalid input".into(),
    }
}

pub fn missing_location_error() -> Error {
    Error {
        code: MISSING_LOCATION,
        message: "current location unknown".into(),
    }
}

pub fn permission_denied_error() -> Error {
    Error {
        code: PERMISSION_DENIED,
        message: "location permission denied".into(),
    }
}

pub fn location_unavailable_error() -> Error {
    Error {
        code: LOCATION_UNAVAILABLE,
        message: "location unavailable".into(),
    }
}

pub fn location_timeout_error() -> Error {
    Error {
        code: LOCATION_TIMEOUT,
        message: "location request timed out".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn persistence_error<T: Debug>(err: T) -> Error {
    tracing::debug!("persistence error: {:?}", err);

    Error {
        code: PERSISTENCE_FAILURE,
        message: "persistence error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return location_timeout_error();
    }

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn config_error(message: impl Into<String>) -> Error {
    Error {
        code: 5,
        message: message.into(),
    }
}

pub fn corrupt_state_error<T: Debug>(err: T) -> Error {
    tracing::debug!("corrupt state: {:?}", err);

    Error {
        code: CORRUPT_STATE,
        message: "stored places are corrupt".into(),
    }
}

#[test]
fn user_facing_codes() {
    assert!(invalid_input_error().is_user_facing());
    assert!(missing_location_error().is_user_facing());
    assert!(!persistence_error("disk full").is_user_facing());
    assert!(!corrupt_state_error("eof").is_user_facing());
}

#[test]
fn location_failures() {
    assert!(permission_denied_error().is_location_failure());
    assert!(location_unavailable_error().is_location_failure());
    assert!(location_timeout_error().is_location_failure());
    assert!(!missing_location_error().is_location_failure());
}

#[test]
fn malformed_json_is_corrupt_state() {
    let err: Error = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
    assert_eq!(err.code, CORRUPT_STATE);
}
