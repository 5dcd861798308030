use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dlg_schema::{
    Activity, ResourceResponse, SignInResource, TokenExchangeRequest, TokenResponse,
};

use crate::credentials::{AppCredentials, ClaimsIdentity};
use crate::turn::TurnContext;

/// Transport the dialogs talk back through.
///
/// Optional capabilities are exposed through accessor methods so callers can
/// probe for them at runtime and report an unsupported operation when absent.
#[async_trait]
pub trait BotAdapter: Send + Sync {
    async fn send_activities(
        &self,
        turn: &TurnContext,
        activities: Vec<Activity>,
    ) -> anyhow::Result<Vec<ResourceResponse>>;

    fn user_token_provider(&self) -> Option<&dyn UserTokenProvider> {
        None
    }

    fn connector_client_builder(&self) -> Option<&dyn ConnectorClientBuilder> {
        None
    }
}

/// Token service operations used by the OAuth prompt.
#[async_trait]
pub trait UserTokenProvider: Send + Sync {
    /// Returns the cached token for the current user, or redeems `magic_code`.
    async fn get_user_token(
        &self,
        turn: &TurnContext,
        credentials: Option<&AppCredentials>,
        connection_name: &str,
        magic_code: Option<&str>,
    ) -> anyhow::Result<Option<TokenResponse>>;

    async fn exchange_token(
        &self,
        turn: &TurnContext,
        connection_name: &str,
        user_id: &str,
        request: TokenExchangeRequest,
    ) -> anyhow::Result<Option<TokenResponse>>;

    async fn sign_out_user(
        &self,
        turn: &TurnContext,
        credentials: Option<&AppCredentials>,
        connection_name: &str,
        user_id: &str,
    ) -> anyhow::Result<()>;

    async fn get_sign_in_resource(
        &self,
        turn: &TurnContext,
        credentials: Option<&AppCredentials>,
        connection_name: &str,
        user_id: &str,
        final_redirect: Option<&str>,
    ) -> anyhow::Result<SignInResource>;
}

/// Client bound to one service URL, used to deliver replies.
pub trait ConnectorClient: Send + Sync + Debug {
    fn base_url(&self) -> &str;
}

#[async_trait]
pub trait ConnectorClientBuilder: Send + Sync {
    async fn create_connector_client(
        &self,
        service_url: &str,
        identity: Option<&ClaimsIdentity>,
        audience: Option<&str>,
    ) -> anyhow::Result<Arc<dyn ConnectorClient>>;
}
