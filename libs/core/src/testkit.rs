//! In-memory adapter and token service for exercising dialogs in tests.
//!
//! Enabled for this crate's own tests and, for downstream crates, through the
//! `testkit` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use dlg_schema::{
    Activity, ActivityType, ChannelAccount, ConversationAccount, InvokeResponse, ResourceResponse,
    SignInResource, TokenExchangeRequest, TokenExchangeResource, TokenResponse, channels,
};
use serde_json::Value;
use uuid::Uuid;

use crate::adapter::{BotAdapter, ConnectorClient, ConnectorClientBuilder, UserTokenProvider};
use crate::credentials::{AppCredentials, ClaimsIdentity};
use crate::turn::{TurnContext, keys};

pub const TEST_SERVICE_URL: &str = "https://test.example.com";
pub const USER_ID: &str = "user";
pub const BOT_ID: &str = "bot";
pub const CONVERSATION_ID: &str = "conv";

/// Adapter that records every outbound activity instead of delivering it.
///
/// Clones share the same recording, so a test can keep one handle while
/// turns hold others.
#[derive(Clone, Default)]
pub struct TestAdapter {
    sent: Arc<Mutex<Vec<Activity>>>,
    token_provider: Option<Arc<MockTokenProvider>>,
    connector_builder: Option<Arc<MockConnectorBuilder>>,
    bot_identity: Option<ClaimsIdentity>,
}

impl TestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_provider(mut self, provider: impl Into<Arc<MockTokenProvider>>) -> Self {
        self.token_provider = Some(provider.into());
        self
    }

    pub fn with_connector_builder(
        mut self,
        builder: impl Into<Arc<MockConnectorBuilder>>,
    ) -> Self {
        self.connector_builder = Some(builder.into());
        self
    }

    /// Identity placed in turn state under [`keys::BOT_IDENTITY`] for every turn.
    pub fn with_bot_identity(mut self, identity: ClaimsIdentity) -> Self {
        self.bot_identity = Some(identity);
        self
    }

    /// Wraps `activity` in a turn, filling in the addressing a channel would set.
    pub fn turn(&self, mut activity: Activity) -> TurnContext {
        if activity.id.is_none() {
            activity.id = Some(Uuid::new_v4().to_string());
        }
        if activity.channel_id.is_none() {
            activity.channel_id = Some(channels::TEST.to_string());
        }
        if activity.service_url.is_none() {
            activity.service_url = Some(TEST_SERVICE_URL.to_string());
        }
        if activity.from.is_none() {
            activity.from = Some(ChannelAccount::new(USER_ID));
        }
        if activity.recipient.is_none() {
            activity.recipient = Some(ChannelAccount::new(BOT_ID));
        }
        if activity.conversation.is_none() {
            activity.conversation = Some(ConversationAccount::new(CONVERSATION_ID));
        }

        let turn = TurnContext::new(Arc::new(self.clone()), activity);
        if let Some(identity) = &self.bot_identity {
            turn.state().insert(keys::BOT_IDENTITY, identity.clone());
        }
        turn
    }

    pub fn message(text: impl Into<String>) -> Activity {
        Activity::text(text)
    }

    pub fn event(name: impl Into<String>, value: Value) -> Activity {
        Activity {
            name: Some(name.into()),
            value: Some(value),
            ..Activity::new(ActivityType::Event)
        }
    }

    pub fn invoke(name: impl Into<String>, value: Value) -> Activity {
        Activity {
            name: Some(name.into()),
            value: Some(value),
            ..Activity::new(ActivityType::Invoke)
        }
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<Activity> {
        self.sent.lock().expect("sent activities lock poisoned").clone()
    }

    /// Drains the recording.
    pub fn take_sent(&self) -> Vec<Activity> {
        std::mem::take(&mut *self.sent.lock().expect("sent activities lock poisoned"))
    }

    /// Invoke responses among the sent activities.
    pub fn invoke_responses(&self) -> Vec<InvokeResponse> {
        self.sent()
            .iter()
            .filter(|activity| activity.is_type(ActivityType::InvokeResponse))
            .filter_map(|activity| activity.value_as::<InvokeResponse>())
            .collect()
    }
}

#[async_trait]
impl BotAdapter for TestAdapter {
    async fn send_activities(
        &self,
        _turn: &TurnContext,
        activities: Vec<Activity>,
    ) -> Result<Vec<ResourceResponse>> {
        let responses = activities
            .iter()
            .map(|_| ResourceResponse {
                id: Uuid::new_v4().to_string(),
            })
            .collect();
        self.sent
            .lock()
            .expect("sent activities lock poisoned")
            .extend(activities);
        Ok(responses)
    }

    fn user_token_provider(&self) -> Option<&dyn UserTokenProvider> {
        self.token_provider
            .as_deref()
            .map(|provider| provider as &dyn UserTokenProvider)
    }

    fn connector_client_builder(&self) -> Option<&dyn ConnectorClientBuilder> {
        self.connector_builder
            .as_deref()
            .map(|builder| builder as &dyn ConnectorClientBuilder)
    }
}

#[derive(Debug, Clone, Default)]
enum ExchangeBehavior {
    #[default]
    Nothing,
    Token(String),
    Fail,
}

/// Scriptable token service.
///
/// Answers `get_user_token` from a cached token (no magic code) or a table of
/// magic codes, and records every call it receives.
#[derive(Debug, Default)]
pub struct MockTokenProvider {
    cached: Mutex<Option<String>>,
    codes: HashMap<String, String>,
    failing_lookups: bool,
    exchange: ExchangeBehavior,
    sign_in_link: Option<String>,
    exchange_resource: Option<TokenExchangeResource>,
    requested_codes: Mutex<Vec<Option<String>>>,
    exchange_requests: Mutex<Vec<TokenExchangeRequest>>,
    signed_out: Mutex<Vec<(String, String)>>,
}

impl MockTokenProvider {
    pub fn new() -> Self {
        Self {
            sign_in_link: Some("https://token.example.com/sign-in".into()),
            ..Default::default()
        }
    }

    /// Token returned when no magic code is given, i.e. the user is already signed in.
    pub fn with_cached_token(self, token: impl Into<String>) -> Self {
        self.set_cached_token(token);
        self
    }

    pub fn with_magic_code(mut self, code: impl Into<String>, token: impl Into<String>) -> Self {
        self.codes.insert(code.into(), token.into());
        self
    }

    /// Makes every `get_user_token` call fail.
    pub fn failing_lookups(mut self) -> Self {
        self.failing_lookups = true;
        self
    }

    pub fn with_exchanged_token(mut self, token: impl Into<String>) -> Self {
        self.exchange = ExchangeBehavior::Token(token.into());
        self
    }

    pub fn failing_exchange(mut self) -> Self {
        self.exchange = ExchangeBehavior::Fail;
        self
    }

    pub fn with_sign_in_link(mut self, link: Option<String>) -> Self {
        self.sign_in_link = link;
        self
    }

    pub fn with_token_exchange_resource(mut self, resource: TokenExchangeResource) -> Self {
        self.exchange_resource = Some(resource);
        self
    }

    pub fn set_cached_token(&self, token: impl Into<String>) {
        *self.cached.lock().expect("cached token lock poisoned") = Some(token.into());
    }

    /// Magic codes passed to `get_user_token`, `None` for cache lookups.
    pub fn requested_codes(&self) -> Vec<Option<String>> {
        self.requested_codes
            .lock()
            .expect("requested codes lock poisoned")
            .clone()
    }

    pub fn exchange_requests(&self) -> Vec<TokenExchangeRequest> {
        self.exchange_requests
            .lock()
            .expect("exchange requests lock poisoned")
            .clone()
    }

    /// `(connection_name, user_id)` pairs that were signed out.
    pub fn signed_out(&self) -> Vec<(String, String)> {
        self.signed_out.lock().expect("sign-out lock poisoned").clone()
    }

    fn token(turn: &TurnContext, connection_name: &str, token: String) -> TokenResponse {
        TokenResponse {
            channel_id: Some(turn.channel_id()),
            connection_name: Some(connection_name.to_string()),
            token,
            expiration: None,
        }
    }
}

#[async_trait]
impl UserTokenProvider for MockTokenProvider {
    async fn get_user_token(
        &self,
        turn: &TurnContext,
        _credentials: Option<&AppCredentials>,
        connection_name: &str,
        magic_code: Option<&str>,
    ) -> Result<Option<TokenResponse>> {
        self.requested_codes
            .lock()
            .expect("requested codes lock poisoned")
            .push(magic_code.map(str::to_string));
        if self.failing_lookups {
            return Err(anyhow!("token service unavailable"));
        }

        let token = match magic_code {
            Some(code) => self.codes.get(code).cloned(),
            None => self.cached.lock().expect("cached token lock poisoned").clone(),
        };
        Ok(token.map(|token| Self::token(turn, connection_name, token)))
    }

    async fn exchange_token(
        &self,
        turn: &TurnContext,
        connection_name: &str,
        _user_id: &str,
        request: TokenExchangeRequest,
    ) -> Result<Option<TokenResponse>> {
        self.exchange_requests
            .lock()
            .expect("exchange requests lock poisoned")
            .push(request);
        match &self.exchange {
            ExchangeBehavior::Nothing => Ok(None),
            ExchangeBehavior::Token(token) => {
                Ok(Some(Self::token(turn, connection_name, token.clone())))
            }
            ExchangeBehavior::Fail => Err(anyhow!("token exchange rejected")),
        }
    }

    async fn sign_out_user(
        &self,
        _turn: &TurnContext,
        _credentials: Option<&AppCredentials>,
        connection_name: &str,
        user_id: &str,
    ) -> Result<()> {
        self.signed_out
            .lock()
            .expect("sign-out lock poisoned")
            .push((connection_name.to_string(), user_id.to_string()));
        *self.cached.lock().expect("cached token lock poisoned") = None;
        Ok(())
    }

    async fn get_sign_in_resource(
        &self,
        _turn: &TurnContext,
        _credentials: Option<&AppCredentials>,
        _connection_name: &str,
        _user_id: &str,
        _final_redirect: Option<&str>,
    ) -> Result<SignInResource> {
        Ok(SignInResource {
            sign_in_link: self.sign_in_link.clone(),
            token_exchange_resource: self.exchange_resource.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConnectorClient {
    pub base_url: String,
    pub audience: Option<String>,
}

impl ConnectorClient for MockConnectorClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builds [`MockConnectorClient`]s and records `(service_url, audience)` per call.
#[derive(Debug, Default)]
pub struct MockConnectorBuilder {
    created: Mutex<Vec<(String, Option<String>)>>,
}

impl MockConnectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<(String, Option<String>)> {
        self.created.lock().expect("connector calls lock poisoned").clone()
    }
}

#[async_trait]
impl ConnectorClientBuilder for MockConnectorBuilder {
    async fn create_connector_client(
        &self,
        service_url: &str,
        _identity: Option<&ClaimsIdentity>,
        audience: Option<&str>,
    ) -> Result<Arc<dyn ConnectorClient>> {
        let audience = audience.map(str::to_string);
        self.created
            .lock()
            .expect("connector calls lock poisoned")
            .push((service_url.to_string(), audience.clone()));
        Ok(Arc::new(MockConnectorClient {
            base_url: service_url.to_string(),
            audience,
        }))
    }
}
