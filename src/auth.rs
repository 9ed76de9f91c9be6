use std::path::Path;
use std::sync::Arc;

use russh::keys::{HashAlg, PrivateKeyWithHashAlg, load_secret_key};

use crate::error::{Result, TransferError};
use crate::types::Auth;

/// Credential material resolved from the configuration and ready to present
/// to the server.
pub(crate) enum ResolvedAuth {
    Password(String),
    Key(PrivateKeyWithHashAlg),
}

impl ResolvedAuth {
    pub(crate) fn resolve(auth: &Auth) -> Result<Self> {
        match auth {
            Auth::Password(password) => Ok(ResolvedAuth::Password(password.clone())),
            Auth::Key { path, passphrase } => load_key_file(path, passphrase.as_deref()),
        }
    }

    /// Method name as it appears in diagnostics.
    pub(crate) fn method_name(&self) -> &'static str {
        match self {
            ResolvedAuth::Password(_) => "password",
            ResolvedAuth::Key(_) => "publickey",
        }
    }
}

/// Load an SSH private key from file, decrypting it with the passphrase when
/// one is configured.
fn load_key_file(path: &Path, passphrase: Option<&str>) -> Result<ResolvedAuth> {
    let key = load_secret_key(path, passphrase).map_err(|e| {
        TransferError::KeyFile(format!("failed to load key {}: {}", path.display(), e))
    })?;

    // RSA keys sign with SHA-512; other key types use their native
    // algorithm.
    let hash_alg = if key.algorithm().is_rsa() {
        Some(HashAlg::Sha512)
    } else {
        None
    };

    Ok(ResolvedAuth::Key(PrivateKeyWithHashAlg::new(
        Arc::new(key),
        hash_alg,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn password_auth_resolves_directly() {
        let resolved = ResolvedAuth::resolve(&Auth::Password("secret123".into())).unwrap();
        assert!(matches!(resolved, ResolvedAuth::Password(_)));
        assert_eq!(resolved.method_name(), "password");
    }

    #[test]
    fn missing_key_file_is_a_key_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ResolvedAuth::resolve(&Auth::Key {
            path: dir.path().join("no_such_key"),
            passphrase: None,
        });
        assert!(matches!(result, Err(TransferError::KeyFile(_))));
    }

    #[test]
    fn garbage_key_file_is_a_key_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("bogus_key");
        std::fs::write(&path, "not a private key").unwrap();

        let result = ResolvedAuth::resolve(&Auth::Key {
            path,
            passphrase: None,
        });
        assert!(matches!(result, Err(TransferError::KeyFile(_))));
    }
}
