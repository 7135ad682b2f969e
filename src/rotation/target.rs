//! The seam between rotation bookkeeping and the protected resource.

use async_trait::async_trait;

use crate::secrets::SecretsManagerApi;

use super::error::Result;

/// Resource-side half of the rotation protocol.
///
/// The handler owns version staging in the secret store; a `RotationTarget`
/// owns whatever the credential actually authenticates against (a database
/// user, an API tenant, a message broker account). Implementations receive
/// the store handle so they can resolve the pending value themselves.
///
/// # Contract
///
/// - `set_secret`: after it returns, the resource accepts both the old and
///   the new credential for the remainder of the transition window.
/// - `test_secret`: fail with [`super::RotationError::CandidateRejected`]
///   when the pending credential is unusable, which blocks promotion.
///
/// Both operations must tolerate re-invocation for the same token: the
/// scheduler retries steps after timeouts and partial failures.
#[async_trait]
pub trait RotationTarget: Send + Sync {
    /// Propagate the pending candidate to the protected resource.
    async fn set_secret(
        &self,
        api: &dyn SecretsManagerApi,
        secret_id: &str,
        token: &str,
    ) -> Result<()>;

    /// Verify the pending candidate is usable against the protected resource.
    async fn test_secret(
        &self,
        api: &dyn SecretsManagerApi,
        secret_id: &str,
        token: &str,
    ) -> Result<()>;
}

/// A target with no resource behind it.
///
/// The default when constructing a handler: staging and promotion run with
/// the set and test phases as no-ops. Deployments whose consumers read the
/// credential straight from the store need nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTarget;

#[async_trait]
impl RotationTarget for NoopTarget {
    async fn set_secret(
        &self,
        _api: &dyn SecretsManagerApi,
        secret_id: &str,
        _token: &str,
    ) -> Result<()> {
        tracing::debug!(secret_id = %secret_id, "No rotation target configured, set phase is a no-op");
        Ok(())
    }

    async fn test_secret(
        &self,
        _api: &dyn SecretsManagerApi,
        secret_id: &str,
        _token: &str,
    ) -> Result<()> {
        tracing::debug!(secret_id = %secret_id, "No rotation target configured, test phase is a no-op");
        Ok(())
    }
}
