//! Session management over an external identity provider.
//!
//! The provider owns the actual sign-in exchange. [`SessionManager`] keeps the
//! current identity and publishes every change on a `watch` channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{AuthError, CoreError};

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned subject id.
    pub uid: String,
    /// Written to `created_by`, `updated_by` and history `by`.
    pub email: String,
}

/// How the provider runs its interactive sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInTransport {
    Popup,
    Redirect,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, transport: SignInTransport) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Identity produced by a completed redirect sign-in, if one is pending.
    async fn redirect_result(&self) -> Result<Option<Identity>, AuthError>;
}

pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    current: watch::Sender<Option<Identity>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    /// Receive every identity change (sign-in, sign-out, resumed redirect).
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    /// Adopt a pending redirect sign-in, if any. A failed lookup is logged
    /// and leaves the session signed out.
    pub async fn resume(&self) -> Option<Identity> {
        match self.provider.redirect_result().await {
            Ok(Some(identity)) => {
                tracing::info!(email = %identity.email, "Resumed redirect sign-in");
                self.current.send_replace(Some(identity.clone()));
                Some(identity)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Redirect result error");
                None
            }
        }
    }

    /// Interactive sign-in: popup first, redirect when the popup transport is
    /// unsupported here.
    pub async fn sign_in(&self) -> Result<Identity, CoreError> {
        let identity = match self.provider.sign_in(SignInTransport::Popup).await {
            Ok(identity) => identity,
            Err(AuthError::UnsupportedEnvironment(reason)) => {
                tracing::warn!(%reason, "Popup sign-in unsupported, falling back to redirect");
                self.provider.sign_in(SignInTransport::Redirect).await?
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(email = %identity.email, "Signed in");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<(), CoreError> {
        self.provider.sign_out().await?;
        self.current.send_replace(None);
        tracing::info!("Signed out");
        Ok(())
    }
}
