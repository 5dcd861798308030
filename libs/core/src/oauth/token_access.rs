//! Token-service calls made on behalf of an OAuth prompt.
//!
//! Each helper resolves the capability it needs from the turn's adapter and
//! fails with [`DialogError::Unsupported`] when the adapter does not offer it.

use std::sync::Arc;

use dlg_schema::{SignInResource, TokenExchangeRequest, TokenResponse};

use crate::adapter::{ConnectorClient, ConnectorClientBuilder, UserTokenProvider};
use crate::credentials::ClaimsIdentity;
use crate::error::{DialogError, DialogResult};
use crate::oauth::OAuthPromptSettings;
use crate::turn::TurnContext;

const NOT_SUPPORTED: &str = "OAuth prompt is not supported by the current adapter";

fn token_provider(turn: &TurnContext) -> DialogResult<&dyn UserTokenProvider> {
    turn.adapter()
        .user_token_provider()
        .ok_or_else(|| DialogError::unsupported(NOT_SUPPORTED))
}

fn connector_builder(turn: &TurnContext) -> DialogResult<&dyn ConnectorClientBuilder> {
    turn.adapter()
        .connector_client_builder()
        .ok_or_else(|| DialogError::unsupported(NOT_SUPPORTED))
}

/// Id of the user the inbound activity came from, or `""`.
pub(crate) fn user_id(turn: &TurnContext) -> String {
    turn.with_activity(|a| a.from.as_ref().map(|f| f.id.clone()).unwrap_or_default())
}

/// Cached token for the current user, or the token redeemed for `magic_code`.
pub async fn get_user_token(
    turn: &TurnContext,
    settings: &OAuthPromptSettings,
    magic_code: Option<&str>,
) -> DialogResult<Option<TokenResponse>> {
    token_provider(turn)?
        .get_user_token(
            turn,
            settings.oauth_app_credentials.as_ref(),
            &settings.connection_name,
            magic_code,
        )
        .await
        .map_err(DialogError::TokenService)
}

pub async fn get_sign_in_resource(
    turn: &TurnContext,
    settings: &OAuthPromptSettings,
) -> DialogResult<SignInResource> {
    token_provider(turn)?
        .get_sign_in_resource(
            turn,
            settings.oauth_app_credentials.as_ref(),
            &settings.connection_name,
            &user_id(turn),
            None,
        )
        .await
        .map_err(DialogError::TokenService)
}

pub async fn sign_out_user(turn: &TurnContext, settings: &OAuthPromptSettings) -> DialogResult<()> {
    token_provider(turn)?
        .sign_out_user(
            turn,
            settings.oauth_app_credentials.as_ref(),
            &settings.connection_name,
            &user_id(turn),
        )
        .await
        .map_err(DialogError::TokenService)
}

/// Swaps an SSO token from the channel for a token of the prompt's connection.
pub async fn exchange_token(
    turn: &TurnContext,
    settings: &OAuthPromptSettings,
    request: TokenExchangeRequest,
) -> DialogResult<Option<TokenResponse>> {
    token_provider(turn)?
        .exchange_token(turn, &settings.connection_name, &user_id(turn), request)
        .await
        .map_err(DialogError::TokenService)
}

pub async fn create_connector_client(
    turn: &TurnContext,
    service_url: &str,
    identity: Option<&ClaimsIdentity>,
    audience: Option<&str>,
) -> DialogResult<Arc<dyn ConnectorClient>> {
    connector_builder(turn)?
        .create_connector_client(service_url, identity, audience)
        .await
        .map_err(DialogError::Connector)
}
