use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which of the two stores a reachability check was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Collection,
    Enrichment,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Collection => write!(f, "data collection"),
            StoreKind::Enrichment => write!(f, "data enrichment"),
        }
    }
}

/// Fatal: a store required by an enabled phase cannot be used
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Is the store for {store} accessible? {url} answered HTTP {status}")]
    UnexpectedStatus {
        store: StoreKind,
        url: String,
        status: u16,
    },

    #[error("Is the store for {store} accessible? {url}: {message}")]
    Unreachable {
        store: StoreKind,
        url: String,
        message: String,
    },
}

impl AccessError {
    pub fn store(&self) -> StoreKind {
        match self {
            AccessError::UnexpectedStatus { store, .. } | AccessError::Unreachable { store, .. } => {
                *store
            }
        }
    }
}

/// Recoverable: one target could not be processed, the rest carry on
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("target '{target}' is not a valid {backend} repository: expected '<owner>/<repository>' as the last two '/' segments")]
    MalformedTarget { backend: String, target: String },

    #[error("backend '{backend}' is missing configuration key '{key}'")]
    MissingBackendKey { backend: String, key: &'static str },

    #[error("no parameter composer registered for backend '{0}'")]
    UnsupportedBackend(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{operation} failed: {source:#}")]
    Execution {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{operation} panicked: {message}")]
    Panicked {
        operation: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_names_store() {
        let err = AccessError::UnexpectedStatus {
            store: StoreKind::Collection,
            url: "http://localhost:9200".to_string(),
            status: 503,
        };
        assert_eq!(err.store(), StoreKind::Collection);
        let message = err.to_string();
        assert!(message.contains("data collection"));
        assert!(message.contains("503"));
    }

    #[test]
    fn test_unreachable_message() {
        let err = AccessError::Unreachable {
            store: StoreKind::Enrichment,
            url: "http://es".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("data enrichment"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_target_error_display() {
        let err = TargetError::MalformedTarget {
            backend: "github".to_string(),
            target: "badtarget".to_string(),
        };
        assert!(err.to_string().contains("badtarget"));

        let err = TargetError::Timeout {
            operation: "collection",
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "collection timed out after 5s");

        let err = TargetError::Timeout {
            operation: "enrichment",
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "enrichment timed out after 250ms");

        let err = TargetError::Execution {
            operation: "enrichment",
            source: anyhow::anyhow!("exit status 2"),
        };
        assert_eq!(err.to_string(), "enrichment failed: exit status 2");
    }
}
