use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dlg_schema::card::content_types;
use dlg_schema::token::signin;
use dlg_schema::{
    ActionType, Activity, ActivityType, CardAction, InputHint, InvokeResponse, OAuthCard,
    SigninCard, TokenExchangeInvokeRequest, TokenExchangeInvokeResponse, TokenExchangeRequest,
    TokenResponse, channels,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::dialogs::{Dialog, DialogContext, DialogInstance, DialogReason, DialogTurnResult};
use crate::error::{DialogError, DialogResult};
use crate::oauth::{CallerInfo, OAuthPromptSettings, token_access};
use crate::prompts::prompt::{init_state, load_state, parse_options, record_attempt};
use crate::prompts::{PromptRecognizerResult, PromptValidator, PromptValidatorContext};
use crate::telemetry;
use crate::turn::{TurnContext, keys};

/// Dialog state slot holding the RFC 3339 instant after which sign-in gives up.
pub const PERSISTED_EXPIRES: &str = "expires";
/// Dialog state slot holding the [`CallerInfo`] of a skill call.
pub const PERSISTED_CALLER: &str = "caller";

const KIND: &str = "oauth";

static MAGIC_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{6})").expect("magic code pattern is valid"));

const MISSING_EXCHANGE_REQUEST: &str = "The bot received an InvokeActivity that is missing a \
     TokenExchangeInvokeRequest value. This is required to be sent with the InvokeActivity.";
const CONNECTION_NAME_MISMATCH: &str = "The bot received an InvokeActivity with a \
     TokenExchangeInvokeRequest containing a ConnectionName that does not match the \
     ConnectionName expected by the bot's active OAuthPrompt. Ensure these names match when \
     sending the InvokeActivity.";
const EXCHANGE_NOT_SUPPORTED: &str = "The bot's BotAdapter does not support token exchange \
     operations. Ensure the bot's Adapter supports the UserTokenProvider interface.";
const UNABLE_TO_EXCHANGE: &str =
    "The bot is unable to exchange token. Proceed with regular login.";

/// Asks the user to sign in and ends with their [`TokenResponse`].
///
/// The prompt first checks for a cached token and completes immediately when
/// one exists. Otherwise it sends a sign-in card (an OAuth card where the
/// channel renders one, a plain sign-in card elsewhere) and waits for one of:
///
/// * a `tokens/response` event,
/// * a Teams `signin/verifyState` invoke,
/// * a `signin/tokenExchange` invoke carrying an SSO token,
/// * a message containing a six-digit magic code.
///
/// The prompt ends with no result once the login timeout passes.
pub struct OAuthPrompt {
    id: String,
    settings: OAuthPromptSettings,
    validator: Option<Arc<dyn PromptValidator<TokenResponse>>>,
}

impl OAuthPrompt {
    pub fn new(id: impl Into<String>, settings: OAuthPromptSettings) -> DialogResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DialogError::invalid_argument("dialog id cannot be blank"));
        }
        Ok(Self {
            id,
            settings,
            validator: None,
        })
    }

    pub fn with_validator(
        mut self,
        validator: impl PromptValidator<TokenResponse> + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn settings(&self) -> &OAuthPromptSettings {
        &self.settings
    }

    /// Token already cached for the current user, if any.
    pub async fn get_user_token(&self, turn: &TurnContext) -> DialogResult<Option<TokenResponse>> {
        require_token_provider(turn, "OAuthPrompt.get_user_token()")?;
        token_access::get_user_token(turn, &self.settings, None).await
    }

    pub async fn sign_out_user(&self, turn: &TurnContext) -> DialogResult<()> {
        require_token_provider(turn, "OAuthPrompt.sign_out_user()")?;
        token_access::sign_out_user(turn, &self.settings).await
    }

    /// Adds a sign-in card to `prompt` (a blank message when `None`) and sends it.
    ///
    /// An existing sign-in or OAuth card attachment is kept as-is. The login
    /// timeout is published in turn state for the adapter when not already set.
    pub async fn send_oauth_card(
        settings: &OAuthPromptSettings,
        turn: &TurnContext,
        prompt: Option<Activity>,
    ) -> DialogResult<()> {
        require_token_provider(turn, "OAuthPrompt.send_oauth_card()")?;

        let mut prompt = prompt.unwrap_or_else(Activity::message);
        let channel_id = turn.channel_id();

        if !channel_supports_oauth_card(&channel_id) {
            if !has_attachment(&prompt, content_types::SIGNIN_CARD) {
                let resource = token_access::get_sign_in_resource(turn, settings).await?;
                let card = SigninCard {
                    text: settings.text.clone(),
                    buttons: vec![CardAction {
                        title: settings.title.clone(),
                        ..CardAction::new(ActionType::Signin).with_value(resource.sign_in_link)
                    }],
                };
                prompt.attachments.push(card.to_attachment());
            }
        } else if !has_attachment(&prompt, content_types::OAUTH_CARD) {
            let resource = token_access::get_sign_in_resource(turn, settings).await?;
            let mut action = ActionType::Signin;
            let mut value = resource.sign_in_link;

            let from_streaming = turn.with_activity(Activity::is_from_streaming_connection);
            let from_skill = turn
                .bot_identity()
                .is_some_and(|identity| identity.is_skill_claim());
            if from_streaming || from_skill || settings.oauth_app_credentials.is_some() {
                if channel_id != channels::EMULATOR {
                    action = ActionType::OpenUrl;
                }
            } else if !channel_requires_sign_in_link(&channel_id) {
                value = None;
            }

            let card = OAuthCard {
                text: settings.text.clone(),
                connection_name: settings.connection_name.clone(),
                buttons: vec![CardAction {
                    title: settings.title.clone(),
                    text: settings.text.clone(),
                    ..CardAction::new(action).with_value(value)
                }],
                token_exchange_resource: resource.token_exchange_resource,
            };
            prompt.attachments.push(card.to_attachment());
        }

        if !turn.state().contains_key(keys::OAUTH_LOGIN_TIMEOUT) {
            turn.state()
                .insert(keys::OAUTH_LOGIN_TIMEOUT, settings.login_timeout());
        }
        if prompt.input_hint.is_none() {
            prompt.input_hint = Some(InputHint::AcceptingInput);
        }

        debug!(
            channel_id = %channel_id,
            connection_name = %settings.connection_name,
            "sending sign-in card"
        );
        turn.send_activity(prompt).await?;
        Ok(())
    }

    /// Tries to pull a token out of the current turn's activity.
    ///
    /// Invoke activities are always answered with an invoke response, even
    /// when recognition fails.
    pub async fn recognize_token(
        settings: &OAuthPromptSettings,
        dc: &mut DialogContext<'_>,
    ) -> DialogResult<PromptRecognizerResult<TokenResponse>> {
        let turn = dc.turn();
        let activity = turn.activity();

        if is_token_response_event(&activity) {
            let token = activity.value_as::<TokenResponse>().unwrap_or_default();
            let caller = match dc.active_dialog() {
                Some(instance) => instance.slot::<CallerInfo>(PERSISTED_CALLER)?,
                None => None,
            };
            if let Some(caller) = caller {
                redirect_to_caller(turn, &caller).await?;
            }
            return Ok(PromptRecognizerResult::success(token));
        }

        if is_teams_verify_invoke(&activity) {
            return recognize_verify_state(settings, turn, &activity).await;
        }

        if is_token_exchange_invoke(&activity) {
            return recognize_token_exchange(settings, turn, &activity).await;
        }

        if activity.is_type(ActivityType::Message)
            && let Some(code) = MAGIC_CODE.find(activity.text_or_empty())
        {
            require_token_provider(turn, "OAuthPrompt.recognize_token()")?;
            let token = token_access::get_user_token(turn, settings, Some(code.as_str())).await?;
            if let Some(token) = token {
                return Ok(PromptRecognizerResult::success(token));
            }
        }

        Ok(PromptRecognizerResult::none())
    }

    async fn validate(
        &self,
        turn: &TurnContext,
        recognized: &PromptRecognizerResult<TokenResponse>,
        instance: &DialogInstance,
    ) -> DialogResult<bool> {
        let Some(validator) = &self.validator else {
            return Ok(recognized.succeeded());
        };
        let (options, state) = load_state(instance)?;
        let ctx = PromptValidatorContext {
            turn,
            recognized,
            state: &state,
            options: &options,
        };
        validator.validate(&ctx).await.map_err(DialogError::Validator)
    }
}

impl fmt::Debug for OAuthPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthPrompt")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

#[async_trait]
impl Dialog for OAuthPrompt {
    fn id(&self) -> &str {
        &self.id
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let turn = dc.turn();
        let mut options = parse_options(options)?.unwrap_or_default();
        options.ensure_input_hints(InputHint::AcceptingInput);

        let expires = expiry_after(self.settings.login_timeout())?;
        let service_url = turn.with_activity(|a| a.service_url.clone());
        let identity = turn.bot_identity();
        let caller = CallerInfo::from_skill_call(identity.as_deref(), service_url.as_deref());

        let instance = dc.require_active_mut()?;
        init_state(instance, &options)?;
        write_expires(instance, expires)?;
        if let Some(caller) = &caller {
            instance.set_slot(PERSISTED_CALLER, caller)?;
        }
        telemetry::record_prompt_started(KIND);
        debug!(
            dialog_id = %self.id,
            connection_name = %self.settings.connection_name,
            skill_caller = caller.is_some(),
            "oauth prompt started"
        );

        if let Some(token) = token_access::get_user_token(turn, &self.settings, None).await? {
            telemetry::record_prompt_completed(KIND, "recognized");
            info!(dialog_id = %self.id, "user already signed in");
            return dc.end_dialog(Some(serde_json::to_value(token)?)).await;
        }

        Self::send_oauth_card(&self.settings, turn, options.prompt.clone()).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let turn = dc.turn();
        let activity = turn.activity();
        let is_message = activity.is_type(ActivityType::Message);

        let instance = dc.require_active_mut()?;
        let (options, mut state) = load_state(instance)?;
        let expires = read_expires(instance)?;

        let expired = expires.is_some_and(|at| OffsetDateTime::now_utc() > at);
        if expired && is_timeout_activity(&activity) {
            warn!(
                dialog_id = %self.id,
                connection_name = %self.settings.connection_name,
                "sign-in timed out"
            );
            telemetry::record_oauth_timeout(&self.settings.connection_name);
            telemetry::record_prompt_completed(KIND, "timeout");
            return dc.end_dialog(None).await;
        }

        let recognized = Self::recognize_token(&self.settings, dc).await?;
        let instance = dc.require_active_mut()?;
        let attempt = record_attempt(instance, &mut state)?;

        if self.validate(turn, &recognized, instance).await? {
            telemetry::record_prompt_completed(KIND, "recognized");
            info!(dialog_id = %self.id, attempt, "sign-in completed");
            let value = recognized
                .into_value()
                .map(serde_json::to_value)
                .transpose()?;
            return dc.end_dialog(value).await;
        }

        if is_message && self.settings.end_on_invalid_message {
            telemetry::record_prompt_completed(KIND, "invalid_message");
            info!(dialog_id = %self.id, attempt, "ending sign-in after invalid message");
            return dc.end_dialog(None).await;
        }

        if is_message
            && !turn.responded()
            && let Some(retry) = &options.retry_prompt
        {
            telemetry::record_prompt_retry(KIND);
            turn.send_activity(retry.clone()).await?;
        }
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _reason: DialogReason,
        _result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let instance = dc.require_active_mut()?.clone();
        self.reprompt_dialog(dc.turn(), &instance).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn reprompt_dialog(
        &self,
        turn: &TurnContext,
        instance: &DialogInstance,
    ) -> DialogResult<()> {
        let (options, _) = load_state(instance)?;
        Self::send_oauth_card(&self.settings, turn, options.prompt).await
    }
}

fn require_token_provider(turn: &TurnContext, operation: &str) -> DialogResult<()> {
    match turn.adapter().user_token_provider() {
        Some(_) => Ok(()),
        None => Err(DialogError::unsupported(format!(
            "{operation}: not supported by the current adapter"
        ))),
    }
}

/// Points the rest of the turn at the parent bot that called this skill.
async fn redirect_to_caller(turn: &TurnContext, caller: &CallerInfo) -> DialogResult<()> {
    if let Some(url) = &caller.caller_service_url {
        turn.set_service_url(url.clone());
    }
    if turn.adapter().connector_client_builder().is_none() {
        return Err(DialogError::unsupported(
            "OAuthPrompt: connector client builder not implemented by the current adapter",
        ));
    }

    let service_url = turn.with_activity(|a| a.service_url.clone().unwrap_or_default());
    let identity = turn.bot_identity();
    let client = token_access::create_connector_client(
        turn,
        &service_url,
        identity.as_deref(),
        caller.scope.as_deref(),
    )
    .await?;

    if !turn.state().replace(keys::CONNECTOR_CLIENT, Arc::clone(&client)) {
        turn.state().insert(keys::CONNECTOR_CLIENT, client);
    }
    debug!(service_url = %service_url, "replies redirected to skill caller");
    Ok(())
}

async fn recognize_verify_state(
    settings: &OAuthPromptSettings,
    turn: &TurnContext,
    activity: &Activity,
) -> DialogResult<PromptRecognizerResult<TokenResponse>> {
    let magic_code = activity.value.as_ref().and_then(|value| {
        value
            .get("state")
            .and_then(Value::as_str)
            .or_else(|| value.as_str())
            .map(str::to_string)
    });
    require_token_provider(turn, "OAuthPrompt.recognize_token()")?;

    match token_access::get_user_token(turn, settings, magic_code.as_deref()).await {
        Ok(Some(token)) => {
            send_verify_response(turn, 200).await?;
            Ok(PromptRecognizerResult::success(token))
        }
        Ok(None) => {
            send_verify_response(turn, 404).await?;
            Ok(PromptRecognizerResult::none())
        }
        Err(err) => {
            warn!(
                error = %err,
                connection_name = %settings.connection_name,
                "verifyState token lookup failed"
            );
            send_verify_response(turn, 500).await?;
            Ok(PromptRecognizerResult::none())
        }
    }
}

async fn recognize_token_exchange(
    settings: &OAuthPromptSettings,
    turn: &TurnContext,
    activity: &Activity,
) -> DialogResult<PromptRecognizerResult<TokenResponse>> {
    let connection_name = settings.connection_name.as_str();
    let failure = |id: Option<String>, status: u16, detail: &str| {
        InvokeResponse::with_body(
            status,
            &TokenExchangeInvokeResponse {
                id,
                connection_name: Some(connection_name.to_string()),
                failure_detail: Some(detail.to_string()),
            },
        )
    };

    let Some(request) = activity.value_as::<TokenExchangeInvokeRequest>() else {
        send_exchange_response(turn, failure(None, 400, MISSING_EXCHANGE_REQUEST)).await?;
        return Ok(PromptRecognizerResult::none());
    };

    if request.connection_name.as_deref() != Some(connection_name) {
        send_exchange_response(turn, failure(request.id, 400, CONNECTION_NAME_MISMATCH)).await?;
        return Ok(PromptRecognizerResult::none());
    }

    if turn.adapter().user_token_provider().is_none() {
        send_exchange_response(turn, failure(request.id, 400, EXCHANGE_NOT_SUPPORTED)).await?;
        return Err(DialogError::unsupported(
            "OAuthPrompt.recognize_token(): not supported by the current adapter",
        ));
    }

    let exchange = TokenExchangeRequest {
        uri: None,
        token: request.token.clone(),
    };
    let exchanged = match token_access::exchange_token(turn, settings, exchange).await {
        Ok(token) => token,
        Err(err) => {
            warn!(
                error = %err,
                connection_name,
                "token exchange failed, falling back to sign-in"
            );
            None
        }
    };

    match exchanged.filter(TokenResponse::has_token) {
        None => {
            send_exchange_response(turn, failure(request.id, 412, UNABLE_TO_EXCHANGE)).await?;
            Ok(PromptRecognizerResult::none())
        }
        Some(token) => {
            let body = TokenExchangeInvokeResponse {
                id: request.id,
                connection_name: Some(connection_name.to_string()),
                failure_detail: None,
            };
            send_exchange_response(turn, InvokeResponse::with_body(200, &body)).await?;
            Ok(PromptRecognizerResult::success(TokenResponse {
                channel_id: token.channel_id,
                connection_name: token.connection_name,
                token: token.token,
                expiration: None,
            }))
        }
    }
}

async fn send_verify_response(turn: &TurnContext, status: u16) -> DialogResult<()> {
    let response = InvokeResponse::new(status);
    send_invoke_response(turn, signin::VERIFY_STATE_OPERATION_NAME, response).await
}

async fn send_exchange_response(turn: &TurnContext, response: InvokeResponse) -> DialogResult<()> {
    send_invoke_response(turn, signin::TOKEN_EXCHANGE_OPERATION_NAME, response).await
}

async fn send_invoke_response(
    turn: &TurnContext,
    operation: &str,
    response: InvokeResponse,
) -> DialogResult<()> {
    telemetry::record_oauth_invoke_response(operation, response.status);
    debug!(operation, status = response.status, "sending invoke response");
    turn.send_activity(Activity::invoke_response(response)).await?;
    Ok(())
}

fn expiry_after(timeout: Duration) -> DialogResult<OffsetDateTime> {
    time::Duration::try_from(timeout)
        .ok()
        .and_then(|timeout| OffsetDateTime::now_utc().checked_add(timeout))
        .ok_or_else(|| DialogError::invalid_argument("OAuth prompt timeout is out of range"))
}

fn write_expires(instance: &mut DialogInstance, at: OffsetDateTime) -> DialogResult<()> {
    let raw = at
        .format(&Rfc3339)
        .map_err(|err| DialogError::State(format!("cannot format sign-in expiry: {err}")))?;
    instance.set_slot(PERSISTED_EXPIRES, &raw)
}

fn read_expires(instance: &DialogInstance) -> DialogResult<Option<OffsetDateTime>> {
    let Some(raw) = instance.slot::<String>(PERSISTED_EXPIRES)? else {
        return Ok(None);
    };
    OffsetDateTime::parse(&raw, &Rfc3339)
        .map(Some)
        .map_err(|err| DialogError::State(format!("invalid sign-in expiry '{raw}': {err}")))
}

fn is_token_response_event(activity: &Activity) -> bool {
    activity.is_type(ActivityType::Event)
        && activity.name.as_deref() == Some(signin::TOKEN_RESPONSE_EVENT_NAME)
}

fn is_teams_verify_invoke(activity: &Activity) -> bool {
    activity.is_type(ActivityType::Invoke)
        && activity.name.as_deref() == Some(signin::VERIFY_STATE_OPERATION_NAME)
}

fn is_token_exchange_invoke(activity: &Activity) -> bool {
    activity.is_type(ActivityType::Invoke)
        && activity.name.as_deref() == Some(signin::TOKEN_EXCHANGE_OPERATION_NAME)
}

/// Activities that count against the login timeout.
fn is_timeout_activity(activity: &Activity) -> bool {
    activity.is_type(ActivityType::Message)
        || is_token_response_event(activity)
        || is_teams_verify_invoke(activity)
        || is_token_exchange_invoke(activity)
}

fn has_attachment(activity: &Activity, content_type: &str) -> bool {
    activity
        .attachments
        .iter()
        .any(|attachment| attachment.is_content_type(content_type))
}

fn channel_supports_oauth_card(channel_id: &str) -> bool {
    !matches!(
        channel_id,
        channels::CORTANA | channels::SKYPE | channels::SKYPE_FOR_BUSINESS
    )
}

fn channel_requires_sign_in_link(channel_id: &str) -> bool {
    channel_id == channels::MSTEAMS
}
