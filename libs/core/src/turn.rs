use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use dashmap::DashMap;
use dlg_schema::{Activity, ActivityType, ResourceResponse};
use tracing::debug;

use crate::adapter::{BotAdapter, ConnectorClient};
use crate::credentials::ClaimsIdentity;
use crate::error::{DialogError, DialogResult};

/// Well-known [`TurnState`] keys.
pub mod keys {
    /// [`ClaimsIdentity`](crate::ClaimsIdentity) of the bot for this turn.
    pub const BOT_IDENTITY: &str = "BotIdentity";
    /// `std::time::Duration` the OAuth prompt waits for a sign-in.
    pub const OAUTH_LOGIN_TIMEOUT: &str = "loginTimeout";
    /// `Arc<dyn ConnectorClient>` used to deliver replies.
    pub const CONNECTOR_CLIENT: &str = "ConnectorClient";
}

/// Per-turn typed key/value store shared by middleware, adapters and dialogs.
#[derive(Default)]
pub struct TurnState {
    entries: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl TurnState {
    pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Overwrites an existing entry; returns false when `key` was absent.
    pub fn replace<T: Any + Send + Sync>(&self, key: &str, value: T) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                *entry = Arc::new(value);
                true
            }
            None => false,
        }
    }

    /// Typed lookup; a value stored under `key` with another type reads as absent.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.entries.get(key).map(|entry| Arc::clone(entry.value()))?;
        value.downcast::<T>().ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

impl fmt::Debug for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("TurnState").field("keys", &keys).finish()
    }
}

/// Everything a dialog needs to process one inbound activity.
pub struct TurnContext {
    adapter: Arc<dyn BotAdapter>,
    activity: RwLock<Activity>,
    state: TurnState,
    responded: AtomicBool,
}

impl TurnContext {
    pub fn new(adapter: Arc<dyn BotAdapter>, activity: Activity) -> Self {
        Self {
            adapter,
            activity: RwLock::new(activity),
            state: TurnState::default(),
            responded: AtomicBool::new(false),
        }
    }

    pub fn adapter(&self) -> &dyn BotAdapter {
        self.adapter.as_ref()
    }

    /// Snapshot of the inbound activity.
    pub fn activity(&self) -> Activity {
        self.with_activity(Activity::clone)
    }

    /// Runs `f` against the inbound activity.
    ///
    /// # Panics
    ///
    /// Panics if the activity lock was poisoned by a panicking writer.
    pub fn with_activity<R>(&self, f: impl FnOnce(&Activity) -> R) -> R {
        let guard = self.activity.read().expect("turn activity lock poisoned");
        f(&guard)
    }

    pub fn channel_id(&self) -> String {
        self.with_activity(|a| a.channel_id.clone().unwrap_or_default())
    }

    pub fn is_type(&self, kind: ActivityType) -> bool {
        self.with_activity(|a| a.is_type(kind))
    }

    /// Redirects replies for the rest of the turn to `service_url`.
    ///
    /// # Panics
    ///
    /// Panics if the activity lock was poisoned by a panicking writer.
    pub fn set_service_url(&self, service_url: impl Into<String>) {
        let mut guard = self.activity.write().expect("turn activity lock poisoned");
        guard.service_url = Some(service_url.into());
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// True once any non-trace activity has been sent during this turn.
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    pub fn bot_identity(&self) -> Option<Arc<ClaimsIdentity>> {
        self.state.get::<ClaimsIdentity>(keys::BOT_IDENTITY)
    }

    pub fn login_timeout(&self) -> Option<Duration> {
        self.state
            .get::<Duration>(keys::OAUTH_LOGIN_TIMEOUT)
            .map(|timeout| *timeout)
    }

    pub fn connector_client(&self) -> Option<Arc<dyn ConnectorClient>> {
        self.state
            .get::<Arc<dyn ConnectorClient>>(keys::CONNECTOR_CLIENT)
            .map(|client| (*client).clone())
    }

    pub async fn send_activity(&self, activity: Activity) -> DialogResult<ResourceResponse> {
        let mut responses = self.send_activities(vec![activity]).await?;
        Ok(responses.pop().unwrap_or_default())
    }

    /// Addresses each activity as a reply to the inbound one and hands them to the adapter.
    pub async fn send_activities(
        &self,
        activities: Vec<Activity>,
    ) -> DialogResult<Vec<ResourceResponse>> {
        let reference = self.with_activity(Activity::conversation_reference);
        let activities: Vec<Activity> = activities
            .into_iter()
            .map(|mut activity| {
                activity.apply_conversation_reference(&reference);
                activity
            })
            .collect();
        let responds = activities.iter().any(|a| !a.is_type(ActivityType::Trace));

        debug!(
            count = activities.len(),
            channel_id = reference.channel_id.as_deref().unwrap_or_default(),
            "sending activities"
        );
        let responses = self
            .adapter
            .send_activities(self, activities)
            .await
            .map_err(DialogError::Transport)?;

        if responds {
            self.responded.store(true, Ordering::SeqCst);
        }
        Ok(responses)
    }
}

impl fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnContext")
            .field("activity", &self.activity)
            .field("state", &self.state)
            .field("responded", &self.responded())
            .finish()
    }
}
