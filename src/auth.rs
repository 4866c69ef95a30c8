//! API key authorization.
//!
//! Every API key controls exactly one server. The table is built once from
//! the configuration and never mutated afterwards; [`AuthGate`] is a pure
//! lookup over it.

use crate::error::AuthError;
use std::collections::HashMap;

/// Immutable mapping from API key to the server it controls.
#[derive(Debug, Clone, Default)]
pub struct CredentialBinding {
    keys: HashMap<String, String>,
}

impl CredentialBinding {
    /// Create a binding from a key -> server table
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    /// Server bound to `credential`, if any
    pub fn lookup(&self, credential: &str) -> Option<&str> {
        self.keys.get(credential).map(String::as_str)
    }

    /// Number of known keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys are configured
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CredentialBinding {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Checks that a credential controls the server a request targets.
#[derive(Debug, Clone)]
pub struct AuthGate {
    binding: CredentialBinding,
}

impl AuthGate {
    /// Create a gate over a credential binding
    pub fn new(binding: CredentialBinding) -> Self {
        if binding.is_empty() {
            tracing::warn!("No API keys configured, every start and stop will be rejected");
        } else {
            tracing::info!(num_keys = binding.len(), "Loaded API keys");
        }
        Self { binding }
    }

    /// Authorize `credential` to act on `claimed_server`.
    ///
    /// # Errors
    ///
    /// * [`AuthError::UnknownCredential`] when the key is not bound
    /// * [`AuthError::ServerMismatch`] when the key controls another server
    pub fn authorize(&self, claimed_server: &str, credential: &str) -> Result<(), AuthError> {
        let bound_server = self
            .binding
            .lookup(credential)
            .ok_or(AuthError::UnknownCredential)?;

        if bound_server != claimed_server {
            tracing::warn!(
                bound_server = %bound_server,
                claimed_server = %claimed_server,
                "API key used against a server it does not control"
            );
            return Err(AuthError::ServerMismatch {
                bound_server: bound_server.to_string(),
                claimed_server: claimed_server.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new(CredentialBinding::from_iter([
            ("Survivors", "paper"),
            ("Survivors-Mods", "forge"),
        ]))
    }

    #[test]
    fn test_empty_binding_rejects_everything() {
        let binding = CredentialBinding::default();
        assert!(binding.is_empty());
        assert_eq!(binding.len(), 0);

        let gate = AuthGate::new(binding);
        assert_eq!(
            gate.authorize("paper", "Survivors"),
            Err(AuthError::UnknownCredential)
        );
    }

    #[test]
    fn test_authorize_matching_key() {
        assert_eq!(gate().authorize("paper", "Survivors"), Ok(()));
        assert_eq!(gate().authorize("forge", "Survivors-Mods"), Ok(()));
    }

    #[test]
    fn test_authorize_unknown_key() {
        assert_eq!(
            gate().authorize("paper", "nope"),
            Err(AuthError::UnknownCredential)
        );
    }

    #[test]
    fn test_authorize_mismatched_server() {
        assert_eq!(
            gate().authorize("paper", "Survivors-Mods"),
            Err(AuthError::ServerMismatch {
                bound_server: "forge".to_string(),
                claimed_server: "paper".to_string(),
            })
        );
    }

    #[test]
    fn test_server_name_is_not_a_key() {
        // Keys map to servers, never the other way round
        assert_eq!(
            gate().authorize("paper", "paper"),
            Err(AuthError::UnknownCredential)
        );
    }
}
