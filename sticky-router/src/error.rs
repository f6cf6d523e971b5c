//! The router's error taxonomy. Unlike the coordinator, nothing here ever
//! reaches a client as a structured body — the router is a byte pipe, so
//! every failure just closes the connection after being logged.

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("no backends configured")]
    NoBackends,
    #[error("failed to dial backend {addr}: {source}")]
    DialFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
