//! Sign-up, sign-in and the locally stored session.

use reqwest::Method;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::{AuthError, Result};
use crate::models::{Account, MessageResponse, PasswordResetRequested, TokenResponse, User};
use crate::session::Session;
use crate::storage::TokenStore;

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
    store: TokenStore,
}

impl AuthService {
    pub fn new(api: ApiClient, store: TokenStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Creates an account. The user still has to sign in afterwards.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Account> {
        let request = self
            .api
            .request(Method::POST, "/auth/signup")
            .json(&json!({ "email": email, "password": password }));
        let account: Account = self.api.send_json(request, "Signup failed").await?;
        tracing::info!(user_id = %account.id, "account created");
        Ok(account)
    }

    /// Exchanges credentials for a bearer token and stores it.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .api
            .request(Method::POST, "/auth/signin")
            .json(&json!({ "email": email, "password": password }));
        let token: TokenResponse = self.api.send_json(request, "Signin failed").await?;

        let session = Session::from_token(&token.access_token)?;
        self.store.save(&token.access_token)?;
        tracing::info!(user_id = %session.user_id(), "signed in");
        Ok(session)
    }

    /// Forgets the stored token.
    pub fn sign_out(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.load().is_some()
    }

    /// The stored session, if any.
    pub fn session(&self) -> Result<Session> {
        let token = self.store.load().ok_or(AuthError::NotAuthenticated)?;
        Ok(Session::from_token(&token)?)
    }

    /// Decoded user, or `None` when signed out or the token is unreadable.
    pub fn current_user(&self) -> Option<User> {
        self.session().ok().map(|s| s.user().clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.current_user().map(|u| u.id)
    }

    /// Asks the server to e-mail a reset link.
    ///
    /// The server answers the same way whether or not the account exists.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetRequested> {
        let request = self
            .api
            .request(Method::POST, "/auth/forgot-password")
            .json(&json!({ "email": email }));
        self.api.send_json(request, "Failed to request password reset").await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        let request = self
            .api
            .request(Method::POST, "/auth/reset-password")
            .json(&json!({ "token": token, "new_password": new_password }));
        let reply: MessageResponse = self.api.send_json(request, "Failed to reset password").await?;
        Ok(reply.message)
    }
}
