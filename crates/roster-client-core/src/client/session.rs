//! Mount-time session resolution. Exactly one [`Session`] value is delivered
//! per call; a failed validation clears the token and is final for that page
//! load, the viewer has to authenticate again.

use futures::channel::oneshot;
use reqwest::header;
use roster_shared::{
    const_config::path::{PATH_ROLE, PATH_VALIDATE},
    session::{Session, SessionIdentity},
    token::AuthToken,
    uac::{RoleResponse, ValidateResponse},
};
use tracing::info;

use super::{deliver, process_json_body, Client, UiCallBack, DUMMY_ARGUMENT};

impl Client {
    /// Resolves the viewer's session for the current page mount.
    ///
    /// With no stored token the resolution is [`Session::Anonymous`] and no
    /// request is made. Otherwise the token is validated and, on success, the
    /// role is derived in a second sequenced call. Dropping the receiver
    /// (page teardown) discards whatever resolution arrives later.
    #[tracing::instrument(skip(ui_notify))]
    pub fn validate_session<F: UiCallBack>(&self, ui_notify: F) -> oneshot::Receiver<Session> {
        let (tx, rx) = oneshot::channel();
        let Some(token) = self.stored_token() else {
            deliver(tx, Session::Anonymous);
            ui_notify();
            return rx;
        };
        let client = self.clone();
        let token_for_role = token.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let session = resolve_session(resp, &token_for_role, &client).await;
            deliver(tx, session);
            ui_notify();
        };
        self.initiate_request_with_token(PATH_VALIDATE, None, &token, &DUMMY_ARGUMENT, on_done);
        rx
    }

    /// Stateless logout: drops the token (idempotent) and the cached
    /// identity. No server round trip is made because the service does not
    /// invalidate tokens server-side.
    #[tracing::instrument]
    pub fn logout(&self) {
        self.clear_session_state();
    }

    async fn fetch_role(&self, token: &AuthToken) -> anyhow::Result<RoleResponse> {
        let request = self
            .api_client
            .request(PATH_ROLE.method, self.path_to_url(PATH_ROLE.path))
            .header(header::AUTHORIZATION, token.as_header_value())
            .query(&DUMMY_ARGUMENT);
        process_json_body(request.send().await).await
    }
}

#[tracing::instrument(ret, skip(response, token, client))]
async fn resolve_session(
    response: reqwest::Result<reqwest::Response>,
    token: &AuthToken,
    client: &Client,
) -> Session {
    let body: ValidateResponse = match process_json_body(response).await {
        Ok(body) => body,
        Err(e) => {
            info!("session validation failed: {e:?}");
            client.clear_session_state();
            return Session::Invalid;
        }
    };
    let Some(user_id) = body.user_id else {
        // A 200 whose body does not name the user is still not a validation
        client.clear_session_state();
        return Session::Invalid;
    };
    // Role derivation is sequenced behind the validation because it needs the
    // confirmed identity; it is re-derived on every mount, never cached
    let role = match client.fetch_role(token).await {
        Ok(role_body) => role_body.role(),
        Err(e) => {
            info!("role derivation failed: {e:?}");
            client.clear_session_state();
            return Session::Invalid;
        }
    };
    let identity = SessionIdentity { user_id, role };
    client.set_identity(identity);
    Session::Valid(identity)
}
