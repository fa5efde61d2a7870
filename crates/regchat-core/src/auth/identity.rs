//! Identity provider endpoints: sign-in redirect, sign-out redirect and the
//! login callback.

use super::token::IdToken;
use crate::config::IdentityConfig;
use crate::error::{RegchatError, Result};
use urlencoding::{decode, encode};
use uuid::Uuid;

/// Path the provider redirects to after sign-in.
pub const LOGIN_CALLBACK_PATH: &str = "/login/callback";
/// Path the provider redirects to after sign-out.
pub const SIGNOUT_CALLBACK_PATH: &str = "/signout/callback";

/// A sign-in redirect and the values needed to verify its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub url: String,
    pub state: String,
    pub nonce: String,
}

/// Builds the provider URLs for the implicit `id_token` flow.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    issuer_url: String,
    client_id: String,
    scopes: Vec<String>,
    redirect_base_url: String,
}

impl IdentityProvider {
    pub fn new(identity: &IdentityConfig, redirect_base_url: impl Into<String>) -> Self {
        Self {
            issuer_url: identity.issuer_url.trim_end_matches('/').to_string(),
            client_id: identity.client_id.clone(),
            scopes: identity.scopes.clone(),
            redirect_base_url: redirect_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn login_redirect_uri(&self) -> String {
        format!("{}{}", self.redirect_base_url, LOGIN_CALLBACK_PATH)
    }

    pub fn signout_redirect_uri(&self) -> String {
        format!("{}{}", self.redirect_base_url, SIGNOUT_CALLBACK_PATH)
    }

    /// Authorize URL with a fresh `state` and `nonce`.
    pub fn authorize(&self) -> AuthorizeRequest {
        self.authorize_with(Uuid::new_v4().to_string(), Uuid::new_v4().to_string())
    }

    pub fn authorize_with(&self, state: String, nonce: String) -> AuthorizeRequest {
        let scope = self.scopes.join(" ");
        let url = format!(
            "{}/oauth2/v1/authorize?client_id={}&redirect_uri={}&response_type=id_token&scope={}&state={}&nonce={}",
            self.issuer_url,
            encode(&self.client_id),
            encode(&self.login_redirect_uri()),
            encode(&scope),
            encode(&state),
            encode(&nonce),
        );
        AuthorizeRequest { url, state, nonce }
    }

    /// Sign-out URL. Without a token the provider is skipped and the user is
    /// sent straight to the sign-out callback.
    pub fn logout_url(&self, token: Option<&IdToken>) -> String {
        match token {
            Some(token) => format!(
                "{}/oauth2/v1/logout?id_token_hint={}&post_logout_redirect_uri={}",
                self.issuer_url,
                encode(&token.id_token),
                encode(&self.signout_redirect_uri()),
            ),
            None => SIGNOUT_CALLBACK_PATH.to_string(),
        }
    }
}

/// Extracts the ID token from the URL the provider redirected to.
///
/// The token is read from the fragment first, then from the query. When
/// `expected_state` is given the callback's `state` must match it; when
/// `expected_nonce` is given the token's `nonce` claim must match it.
pub fn parse_callback(
    url: &str,
    expected_state: Option<&str>,
    expected_nonce: Option<&str>,
) -> Result<IdToken> {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let query = without_fragment.split_once('?').map(|(_, query)| query);

    if let Some(error) = [fragment, query]
        .into_iter()
        .flatten()
        .find_map(|params| param(params, "error"))
    {
        return Err(RegchatError::auth_required(format!(
            "identity provider returned error: {error}"
        )));
    }

    let (params, raw) = [fragment, query]
        .into_iter()
        .flatten()
        .find_map(|params| param(params, "id_token").map(|token| (params, token)))
        .ok_or_else(|| RegchatError::auth_required("callback URL carries no id_token"))?;

    if let Some(expected) = expected_state {
        if param(params, "state").as_deref() != Some(expected) {
            return Err(RegchatError::auth_required("callback state does not match"));
        }
    }

    let token = IdToken::from_jwt(&raw)?;
    if let Some(expected) = expected_nonce {
        if token.claims.nonce.as_deref() != Some(expected) {
            return Err(RegchatError::auth_required(
                "ID token nonce does not match the sign-in request",
            ));
        }
    }
    Ok(token)
}

fn param(params: &str, name: &str) -> Option<String> {
    params.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != name {
            return None;
        }
        decode(value).ok().map(|value| value.into_owned())
    })
}
