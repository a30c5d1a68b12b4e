pub const API_VERSION: &str = "/api/v1";

pub const USERS_ME: &str = "/api/v1/users/me";
pub const MY_PURCHASES: &str = "/api/v1/purchase/get-all-my-purchase";

/// Authentication endpoints, matched by exact path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    SignUp,
    RegisterUser,
    ForgetPassword,
    ResetPassword,
    ChangePassword,
    AccessToken,
    Logout,
}

impl AuthEndpoint {
    pub const ALL: [AuthEndpoint; 8] = [
        AuthEndpoint::Login,
        AuthEndpoint::SignUp,
        AuthEndpoint::RegisterUser,
        AuthEndpoint::ForgetPassword,
        AuthEndpoint::ResetPassword,
        AuthEndpoint::ChangePassword,
        AuthEndpoint::AccessToken,
        AuthEndpoint::Logout,
    ];

    pub fn path(self) -> &'static str {
        match self {
            AuthEndpoint::Login => "/api/v1/auth/login",
            AuthEndpoint::SignUp => "/api/v1/auth/sign-up",
            AuthEndpoint::RegisterUser => "/api/v1/auth/register-user",
            AuthEndpoint::ForgetPassword => "/api/v1/auth/forget-password",
            AuthEndpoint::ResetPassword => "/api/v1/auth/reset-password",
            AuthEndpoint::ChangePassword => "/api/v1/auth/change-password",
            AuthEndpoint::AccessToken => "/api/v1/auth/access-token",
            AuthEndpoint::Logout => "/api/v1/auth/logout",
        }
    }

    /// Classify a request path. The scheme and host of an absolute URL, the
    /// query string and a trailing slash are ignored; anything else must
    /// match exactly.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = strip_origin(path);
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }

    /// A 401 from these endpoints means bad credentials, not an expired
    /// session. The refresh endpoint is listed so it can never recurse.
    pub fn is_refresh_exempt(self) -> bool {
        matches!(
            self,
            AuthEndpoint::Login
                | AuthEndpoint::SignUp
                | AuthEndpoint::RegisterUser
                | AuthEndpoint::ForgetPassword
                | AuthEndpoint::ResetPassword
                | AuthEndpoint::AccessToken
        )
    }
}

/// `https://host:port/api/v1/x?y` -> `/api/v1/x?y`; relative paths pass through.
pub fn strip_origin(url: &str) -> &str {
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        return url;
    };
    match rest.find(['/', '?', '#']) {
        Some(start) => &rest[start..],
        None => "/",
    }
}

pub fn is_refresh_exempt(path: &str) -> bool {
    AuthEndpoint::from_path(path).is_some_and(AuthEndpoint::is_refresh_exempt)
}
