use crate::index::JoinerType;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure is either a configuration error raised while building an
/// index, or a contract violation raised when a caller breaks the
/// insert/retract protocol.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `class`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a configuration error carrying its structured cause.
    pub(crate) fn config(origin: ErrorOrigin, err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Configuration,
            origin,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }

    /// Construct a factory-origin configuration error.
    pub(crate) fn factory_config(err: ConfigError) -> Self {
        Self::config(ErrorOrigin::Factory, err)
    }

    /// Construct an indexer-origin configuration error.
    pub(crate) fn indexer_config(err: ConfigError) -> Self {
        Self::config(ErrorOrigin::Indexer, err)
    }

    /// Construct a properties-origin contract violation.
    pub(crate) fn properties_contract(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::ContractViolation,
            ErrorOrigin::Properties,
            message,
        )
    }

    /// Construct an indexer-origin contract violation.
    pub(crate) fn indexer_contract(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ContractViolation, ErrorOrigin::Indexer, message)
    }

    /// Construct an interval-tree-origin contract violation.
    pub(crate) fn interval_contract(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::ContractViolation,
            ErrorOrigin::IntervalTree,
            message,
        )
    }

    /// Construct a join-origin contract violation.
    pub(crate) fn join_contract(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ContractViolation, ErrorOrigin::Join, message)
    }

    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self.class, ErrorClass::ContractViolation)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    /// Borrow the structured configuration cause, if any.
    #[must_use]
    pub const fn config_error(&self) -> Option<&ConfigError> {
        match &self.detail {
            Some(ErrorDetail::Config(err)) => Some(err),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, class-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Config(ConfigError),
}

///
/// ConfigError
///
/// Reasons an index cannot be built for the requested joiners or settings.
/// Never returned directly; always wrapped in [`ErrorDetail::Config`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("unsupported joiner type ({joiner}) for an indexer")]
    UnsupportedJoiner { joiner: JoinerType },

    #[error("joiner types ({first}, {second}) do not form a range")]
    InvalidRange {
        first: JoinerType,
        second: JoinerType,
    },

    #[error("invalid indexer configuration: {message}")]
    Parse { message: String },
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    ContractViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::ContractViolation => "contract_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Factory,
    Indexer,
    IntervalTree,
    Join,
    Properties,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Factory => "factory",
            Self::Indexer => "indexer",
            Self::IntervalTree => "interval_tree",
            Self::Join => "join",
            Self::Properties => "properties",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
