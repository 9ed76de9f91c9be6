use std::future::Future;

use russh::client::Handler;
use russh::keys::PublicKey;
use tracing::debug;

use crate::error::TransferError;

/// russh event handler for the client side of the session.
///
/// Host keys are trusted and accepted on first use, with no known-hosts
/// pinning. That is the documented security posture of this helper, not an
/// oversight; callers needing verification should front the connection with
/// their own policy.
#[derive(Debug, Default)]
pub(crate) struct ClientHandler;

impl Handler for ClientHandler {
    type Error = TransferError;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        debug!(
            algorithm = %server_public_key.algorithm(),
            "accepting server host key on first use"
        );
        async { Ok(true) }
    }
}
