use anyhow::{anyhow, Context};
use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use reqwest::{header, Method, StatusCode};
use roster_shared::{
    const_config::{
        client::DEFAULT_SERVER_ADDRESS,
        path::{PathSpec, PATH_LOGIN, PATH_SIGNUP},
    },
    errors::NotLoggedInError,
    id::UserId,
    log_err_as_warn,
    req_args::{LoginReqArgs, SignupReqArgs},
    session::SessionIdentity,
    token::AuthToken,
    uac::{LoginResponse, SignupResponse},
};
use secrecy::ExposeSecret as _;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::info;

pub mod api;
pub mod session;
pub mod storage;

use storage::TokenStore;

#[cfg(not(target_arch = "wasm32"))]
use storage::MemoryTokenStore;
#[cfg(target_arch = "wasm32")]
use storage::WebStorageTokenStore;

pub const DUMMY_ARGUMENT: &[(&str, &str)] = &[("", "")];

#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    token_store: Arc<dyn TokenStore>,
    inner: Arc<Mutex<ClientInner>>,
}

#[derive(Debug)]
struct ClientInner {
    server_address: String,
    identity: Option<SessionIdentity>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_ADDRESS.to_string())
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Token stored; the caller should navigate to this user's profile
    Success { user_id: UserId },
    /// The server answered but rejected the attempt; `message` is the server's
    /// explanation and must be shown to the user as is
    Rejected { message: String },
}

impl LoginOutcome {
    /// Returns `true` if the login outcome is [`Success`]
    ///
    /// [`Success`]: LoginOutcome::Success
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Account created; the caller should navigate to the login page (signup
    /// does not authenticate)
    Created,
    /// The server answered but declined to create the account
    Rejected { message: String },
}

impl SignupOutcome {
    /// Returns `true` if the signup outcome is [`Created`]
    ///
    /// [`Created`]: SignupOutcome::Created
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

impl ClientInner {
    #[tracing::instrument]
    fn new(server_address: String) -> Self {
        Self {
            server_address,
            identity: None,
        }
    }
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE")]
    pub fn new(server_address: String) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let token_store = Arc::new(MemoryTokenStore::default());
        #[cfg(target_arch = "wasm32")]
        let token_store = Arc::new(WebStorageTokenStore);
        Self::new_with_store(server_address, token_store)
    }

    /// The token store is the single owner of the persisted credential; inject
    /// a custom one to change where it lives.
    pub fn new_with_store(server_address: String, token_store: Arc<dyn TokenStore>) -> Self {
        let api_client = reqwest::Client::builder()
            .build()
            .expect("Unable to create reqwest client");
        Self {
            api_client,
            token_store,
            inner: Arc::new(Mutex::new(ClientInner::new(server_address))),
        }
    }

    #[tracing::instrument(skip(args, ui_notify))]
    // WARNING: Must skip args as it may contain sensitive info and "safe"
    // versions would usually already be logged by the caller
    pub fn login<F: UiCallBack>(
        &self,
        args: LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<LoginOutcome>> {
        let (tx, rx) = oneshot::channel();
        let args = serde_json::json!({
            "email": args.email,
            "password": args.password.expose_secret(),
        });
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_login(resp, &client).await;
            deliver(tx, msg);
            ui_notify();
        };

        self.initiate_request(PATH_LOGIN, &args, on_done);
        rx
    }

    #[tracing::instrument(skip(args, ui_notify))]
    pub fn signup<F: UiCallBack>(
        &self,
        args: SignupReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<SignupOutcome>> {
        let (tx, rx) = oneshot::channel();
        let args = serde_json::json!({
            "username": args.username,
            "email": args.email,
            "password": args.password.expose_secret(),
        });
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_signup(resp).await;
            deliver(tx, msg);
            ui_notify();
        };

        self.initiate_request(PATH_SIGNUP, &args, on_done);
        rx
    }

    #[tracing::instrument(skip(args, on_done))]
    // WARNING: Must skip args as it my contain sensitive info and "safe" versions
    // would usually already be logged by the caller
    fn initiate_request<T, F, O>(&self, path_spec: PathSpec, args: &T, on_done: F)
    where
        T: serde::Serialize + Debug,
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        let is_get_method = path_spec.method == Method::GET;
        let mut request = self
            .api_client
            .request(path_spec.method, self.path_to_url(path_spec.path));
        request = if is_get_method {
            request.query(&args)
        } else {
            request.json(&args)
        };
        reqwest_cross::fetch(request, on_done)
    }

    /// Variant of [`Self::initiate_request`] for bearer authenticated
    /// endpoints; `id_suffix` is appended to the path for the `/…/:id` shapes
    #[tracing::instrument(skip(token, args, on_done))]
    // WARNING: Must skip token, it is a credential
    fn initiate_request_with_token<T, F, O>(
        &self,
        path_spec: PathSpec,
        id_suffix: Option<UserId>,
        token: &AuthToken,
        args: &T,
        on_done: F,
    ) where
        T: serde::Serialize + Debug,
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        let is_get_method = path_spec.method == Method::GET;
        let url = match id_suffix {
            Some(id) => format!("{}{id}", self.path_to_url(path_spec.path)),
            None => self.path_to_url(path_spec.path),
        };
        let mut request = self
            .api_client
            .request(path_spec.method, url)
            .header(header::AUTHORIZATION, token.as_header_value());
        request = if is_get_method {
            request.query(&args)
        } else {
            request.json(&args)
        };
        reqwest_cross::fetch(request, on_done)
    }

    fn send_bearer_request_expect_json<F, T, U>(
        &self,
        path_spec: PathSpec,
        id_suffix: Option<UserId>,
        args: &T,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<U>>
    where
        T: serde::Serialize + std::fmt::Debug,
        F: UiCallBack,
        U: Send + std::fmt::Debug + serde::de::DeserializeOwned + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let Some(token) = self.stored_token() else {
            deliver(tx, Err(NotLoggedInError.into()));
            ui_notify();
            return rx;
        };
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_bearer_json_body(resp, &client).await;
            deliver(tx, msg);
            ui_notify();
        };
        self.initiate_request_with_token(path_spec, id_suffix, &token, args, on_done);
        rx
    }

    fn send_bearer_request_expect_empty<F, T>(
        &self,
        path_spec: PathSpec,
        id_suffix: Option<UserId>,
        args: &T,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<()>>
    where
        T: serde::Serialize + std::fmt::Debug,
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let Some(token) = self.stored_token() else {
            deliver(tx, Err(NotLoggedInError.into()));
            ui_notify();
            return rx;
        };
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_bearer_empty(resp, &client).await;
            deliver(tx, msg);
            ui_notify();
        };
        self.initiate_request_with_token(path_spec, id_suffix, &token, args, on_done);
        rx
    }

    #[tracing::instrument(ret)]
    fn path_to_url(&self, path: &str) -> String {
        format!(
            "{}{path}",
            &self
                .inner
                .lock()
                .expect("failed to unlock client mutex")
                .server_address
        )
    }

    fn stored_token(&self) -> Option<AuthToken> {
        self.token_store.get()
    }

    /// The identity resolved by the most recent successful validation in this
    /// process, if any. Pages must not rely on this across mounts; it exists
    /// for in-page lookups like the admin self-action check.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.inner.lock().expect("mutex poisoned").identity
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub(crate) fn set_identity(&self, identity: SessionIdentity) {
        self.inner.lock().expect("mutex poisoned").identity = Some(identity);
    }

    /// Drops the persisted token (idempotent) and the cached identity. The
    /// mandated side effect of an authorization failure, and all of logout.
    pub(crate) fn clear_session_state(&self) {
        self.token_store.clear();
        self.inner.lock().expect("mutex poisoned").identity = None;
    }
}

/// Sends the result to the page that asked for it. If that page was torn down
/// in the meantime the result is discarded; a late response must never update
/// a page that no longer exists.
fn deliver<T: Debug>(tx: oneshot::Sender<T>, msg: T) {
    log_err_as_warn!(tx.send(msg));
}

#[tracing::instrument(ret, err(Debug), skip(client))]
// WARNING: Must skip client as its debug output includes the token store
async fn process_bearer_empty(
    response: reqwest::Result<reqwest::Response>,
    client: &Client,
) -> anyhow::Result<()> {
    let (response, status) = match extract_response(response) {
        Ok(x) => x,
        Err(e) => {
            // Transport failure on an auth bearing call invalidates the token
            client.clear_session_state();
            return Err(e);
        }
    };
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => {
            client.clear_session_state();
            Err(handle_error(response).await)
        }
        _ => Err(handle_error(response).await),
    }
}

#[tracing::instrument(ret, err(Debug), skip(client))]
// WARNING: Must skip client as its debug output includes the token store
async fn process_bearer_json_body<T>(
    response: reqwest::Result<reqwest::Response>,
    client: &Client,
) -> anyhow::Result<T>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let (response, status) = match extract_response(response) {
        Ok(x) => x,
        Err(e) => {
            client.clear_session_state();
            return Err(e);
        }
    };
    match status {
        StatusCode::OK => match response.json().await.context("failed to parse result as json") {
            Ok(body) => Ok(body),
            Err(e) => {
                // A malformed body counts as a transport failure
                client.clear_session_state();
                Err(e)
            }
        },
        StatusCode::UNAUTHORIZED => {
            client.clear_session_state();
            Err(handle_error(response).await)
        }
        _ => Err(handle_error(response).await),
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_json_body<T>(response: reqwest::Result<reqwest::Response>) -> anyhow::Result<T>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let (response, status) = extract_response(response)?;
    match status {
        StatusCode::OK => Ok(response
            .json()
            .await
            .context("failed to parse result as json")?),
        _ => Err(handle_error(response).await),
    }
}

#[tracing::instrument(ret, err(Debug), skip(client))]
// WARNING: Must skip client as its debug output includes the token store
async fn process_login(
    response: reqwest::Result<reqwest::Response>,
    client: &Client,
) -> anyhow::Result<LoginOutcome> {
    let body: LoginResponse = process_json_body(response).await?;
    Ok(classify_login(body, client))
}

/// An HTTP 200 is only a success if the body names the user; otherwise the
/// body's message is the server's rejection and there are no side effects.
fn classify_login(body: LoginResponse, client: &Client) -> LoginOutcome {
    match (body.user_id, body.token) {
        (Some(user_id), Some(token)) => {
            client.token_store.set(&AuthToken::from_raw(&token));
            LoginOutcome::Success { user_id }
        }
        _ => LoginOutcome::Rejected {
            message: body.message,
        },
    }
}

#[tracing::instrument(ret, err(Debug))]
async fn process_signup(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<SignupOutcome> {
    let body: SignupResponse = process_json_body(response).await?;
    Ok(if body.created {
        SignupOutcome::Created
    } else {
        SignupOutcome::Rejected {
            message: body.message,
        }
    })
}

#[tracing::instrument(ret)]
async fn handle_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    debug_assert!(
        !status.is_success(),
        "this is supposed to be an error, right? Status code is: {status}"
    );
    let Ok(body) = response.text().await else {
        return anyhow!("failed to get response body");
    };
    if body.is_empty() {
        anyhow!("request failed with status code: {status} and no body")
    } else {
        anyhow!("{body}")
    }
}

/// Provides a way to standardize the error message
#[tracing::instrument(ret, err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<(reqwest::Response, StatusCode)> {
    if response.is_err() {
        info!("Response is err: {:#?}", response);
    }
    let response = response.context("failed to send request")?;
    let status = response.status();
    Ok((response, status))
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

#[cfg(not(target_arch = "wasm32"))]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}

#[cfg(target_arch = "wasm32")]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> {}
}
