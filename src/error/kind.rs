//! Error kind enumeration for categorizing errors.

/// Categorization of crate errors.
///
/// | ErrorKind       | Raised by                       | Surfaced to caller |
/// |-----------------|---------------------------------|--------------------|
/// | `Configuration` | `TraceConfig` construction      | Yes, at startup    |
/// | `ClientIp`      | `ClientIpResolver` impls        | No, tags skipped   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid configuration value (bad obfuscation pattern, bad status range).
    ///
    /// **Fatal at initialization.** Fix the environment and restart.
    #[error("configuration error")]
    Configuration,

    /// No client address could be determined from headers or the peer address.
    #[error("client ip resolution failed")]
    ClientIp,
}
