use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::endpoints::{self, AuthEndpoint};
use crate::api::{ApiRequest, ApiResponse, SessionGateway};
use crate::error::Result;
use crate::models::{LoginData, LoginResponse, SignUpData, UserSummary};

/// Typed account operations on top of a [`SessionGateway`].
///
/// Login and verified registration establish the session; logout always
/// ends it locally, whatever the server says.
pub struct AuthClient<'a> {
    gateway: &'a SessionGateway,
}

impl<'a> AuthClient<'a> {
    pub fn new(gateway: &'a SessionGateway) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, credentials: &LoginData) -> Result<UserSummary> {
        let request = ApiRequest::post(AuthEndpoint::Login.path()).with_json(credentials)?;
        let response = self.gateway.send(&request).await?;
        self.establish(response)
    }

    /// Complete registration with the token from the verification email
    pub async fn register_user(&self, token: &str) -> Result<UserSummary> {
        let request =
            ApiRequest::post(AuthEndpoint::RegisterUser.path()).with_body(json!({ "token": token }));
        let response = self.gateway.send(&request).await?;
        self.establish(response)
    }

    pub async fn sign_up(&self, data: &SignUpData) -> Result<String> {
        let request = ApiRequest::post(AuthEndpoint::SignUp.path()).with_json(data)?;
        let response = self.gateway.send(&request).await?;
        Ok(server_message(&response))
    }

    pub async fn forget_password(&self, email: &str) -> Result<String> {
        let request = ApiRequest::post(AuthEndpoint::ForgetPassword.path())
            .with_body(json!({ "email": email }));
        let response = self.gateway.send(&request).await?;
        Ok(server_message(&response))
    }

    /// The reset token from the email authorizes this call instead of the
    /// session token.
    pub async fn reset_password(&self, reset_token: &str, changed_password: &str) -> Result<String> {
        let request = ApiRequest::post(AuthEndpoint::ResetPassword.path())
            .with_header("Authorization", reset_token)
            .with_body(json!({ "changedPassword": changed_password }));
        let response = self.gateway.send(&request).await?;
        Ok(server_message(&response))
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<String> {
        let request = ApiRequest::patch(AuthEndpoint::ChangePassword.path()).with_body(json!({
            "oldPassword": old_password,
            "newPassword": new_password,
        }));
        let response = self.gateway.send(&request).await?;
        Ok(server_message(&response))
    }

    /// Tell the server, then drop the local session even if that failed
    pub async fn logout(&self) -> Result<()> {
        if self.gateway.is_authenticated() {
            let request = ApiRequest::post(AuthEndpoint::Logout.path());
            if let Err(e) = self.gateway.send(&request).await {
                warn!(error = %e, "server logout failed, clearing local session anyway");
            }
        }
        self.gateway.clear_session()
    }

    pub async fn current_user(&self) -> Result<Value> {
        let response = self.gateway.send(&ApiRequest::get(endpoints::USERS_ME)).await?;
        response.data()
    }

    pub fn update_cached_user(&self, user: UserSummary) -> Result<()> {
        self.gateway.store().update_user(user)
    }

    fn establish(&self, response: ApiResponse) -> Result<UserSummary> {
        let LoginResponse { user, access_token } = response.data()?;
        self.gateway.set_session(user.clone(), access_token)?;
        info!(email = %user.email, "logged in");
        Ok(user)
    }
}

fn server_message(response: &ApiResponse) -> String {
    response
        .body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
