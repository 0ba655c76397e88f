/// Classification of adapter failures.
///
/// Every class makes the orchestrator move on to the next provider; the
/// class only changes how the failure is logged and reported in
/// diagnostics.
///
/// | Class | Typical cause | Logged at |
/// |-------|---------------|-----------|
/// | `Transient` | network error, timeout, quota message | `warn` |
/// | `Malformed` | response schema mismatch | `warn` |
/// | `NotFound` | provider does not know the symbol or has no bars | `info` |
/// | `Unsupported` | capability missing on this provider | `debug` |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FailureKind {
    /// Network failure, timeout or provider-reported quota/error message.
    Transient,

    /// The provider answered with something that does not match its schema.
    Malformed,

    /// The provider has nothing for this entity or window.
    NotFound,

    /// The provider does not implement the requested operation.
    Unsupported,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Malformed => "malformed",
            FailureKind::NotFound => "not_found",
            FailureKind::Unsupported => "unsupported",
        }
    }
}
