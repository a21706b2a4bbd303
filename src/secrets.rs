//! Platform secret-store lookup.
//!
//! Environment variables are the primary credential source; when one is
//! unset the platform secret store is consulted (Secret Service on Linux,
//! the keychain on macOS). Entries are stored under the `tahlil` service
//! with the environment variable name as the lookup key.

use crate::error::ConfigError;

const SERVICE_NAME: &str = "tahlil";

#[cfg(target_os = "linux")]
pub async fn lookup(key: &str) -> Result<Option<String>, ConfigError> {
    use std::collections::HashMap;

    use secret_service::{EncryptionType, SecretService};

    // No session bus means no store; treat it as absent rather than fatal.
    let service = match SecretService::connect(EncryptionType::Dh).await {
        Ok(service) => service,
        Err(e) => {
            tracing::debug!(error = %e, "secret service unavailable");
            return Ok(None);
        }
    };

    let search = service
        .search_items(HashMap::from([("service", SERVICE_NAME), ("key", key)]))
        .await
        .map_err(|e| ConfigError::SecretStore(e.to_string()))?;

    let Some(item) = search.unlocked.first() else {
        return Ok(None);
    };

    let secret = item
        .get_secret()
        .await
        .map_err(|e| ConfigError::SecretStore(e.to_string()))?;
    Ok(Some(String::from_utf8_lossy(&secret).into_owned()))
}

#[cfg(target_os = "macos")]
pub async fn lookup(key: &str) -> Result<Option<String>, ConfigError> {
    use security_framework::passwords::get_generic_password;

    match get_generic_password(SERVICE_NAME, key) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) => {
            tracing::debug!(error = %e, "keychain lookup missed");
            Ok(None)
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub async fn lookup(_key: &str) -> Result<Option<String>, ConfigError> {
    Ok(None)
}
