//! Fallback tracking for provider selection diagnostics.

use crate::errors::FailureKind;
use crate::models::ProviderId;

/// Why a provider was skipped during fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider was switched off at runtime.
    Disabled,

    /// Provider excluded by the request's data mode.
    ModeMismatch,

    /// Provider doesn't implement this operation.
    NotSupported,
}

/// Where the fallback chain ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackState {
    NotTried,
    /// Index into the ordered candidate list.
    Trying(usize),
    Success(ProviderId),
    Exhausted,
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub kind: Option<FailureKind>,
    pub success: bool,
}

/// Detailed result of a fetch operation with skip diagnostics.
#[derive(Clone, Debug)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
    pub state: FallbackState,
}

impl Default for FetchDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
            state: FallbackState::NotTried,
        }
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: Some(reason),
            error: None,
            kind: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, provider_id: ProviderId, kind: FailureKind, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: None,
            error: Some(error),
            kind: Some(kind),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.state = FallbackState::Success(provider_id.clone());
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: None,
            error: None,
            kind: None,
            success: true,
        });
    }

    pub fn mark_trying(&mut self, index: usize) {
        self.state = FallbackState::Trying(index);
    }

    pub fn mark_exhausted(&mut self) {
        self.state = FallbackState::Exhausted;
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.provider_id)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({:?})", a.provider_id, skip)
                } else if let Some(err) = &a.error {
                    let kind = a.kind.map(|k| k.as_str()).unwrap_or("unknown");
                    format!("{}: ERROR [{}] ({})", a.provider_id, kind, err)
                } else {
                    format!("{}: UNKNOWN", a.provider_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Provider that produced the result, if any.
    pub fn winner(&self) -> Option<&ProviderId> {
        match &self.state {
            FallbackState::Success(id) => Some(id),
            _ => None,
        }
    }

    /// Providers actually invoked, in order.
    pub fn tried(&self) -> Vec<&ProviderId> {
        self.attempts
            .iter()
            .filter(|a| a.skipped.is_none())
            .map(|a| &a.provider_id)
            .collect()
    }

    /// Get all skip reasons.
    pub fn skip_reasons(&self) -> Vec<(&ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| a.skipped.as_ref().map(|s| (&a.provider_id, s)))
            .collect()
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<(&ProviderId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.provider_id, e.as_str())))
            .collect()
    }
}
