use chrono::Duration;
use roadlog_core::{parse_timestamp, AnalyticsWindowConfig, UtcDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;

/// Event names emitted by the web client that the growth funnels read.
pub mod event_names {
    pub const LANDING_VIEW: &str = "landing_view";
    pub const AUTH_SUBMIT: &str = "auth_submit";
    pub const AUTH_SUCCESS: &str = "auth_success";
    pub const AUTH_ERROR: &str = "auth_error";
    pub const FIRST_VEHICLE_VISIBLE: &str = "first_vehicle_visible";
    pub const FIRST_CHAT_SENT: &str = "first_chat_sent";
    pub const PUSH_PERMISSION_GRANTED: &str = "push_permission_granted";

    pub const INSTALL_VIEW: &str = "install_view";
    pub const INSTALL_CTA_CLICK: &str = "install_cta_click";
    pub const INSTALL_BEFORE_PROMPT: &str = "install_beforeinstallprompt";
    pub const INSTALL_PROMPT_ACCEPTED: &str = "install_prompt_accepted";
    pub const INSTALL_APP_INSTALLED: &str = "install_appinstalled";
    pub const INSTALL_ERROR: &str = "install_error";
}

/// A single analytics event as recorded by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    /// Set once the session is attributed to a signed-in user
    pub user_id: Option<String>,
    pub session_id: String,
    pub timestamp: UtcDateTime,
}

impl Event {
    pub fn anonymous(
        name: impl Into<String>,
        session_id: impl Into<String>,
        timestamp: UtcDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            user_id: None,
            session_id: session_id.into(),
            timestamp,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Row shape of the `analytics_events` table as exported by the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventRow {
    pub event_name: String,
    pub user_id: Option<String>,
    pub session_id: String,
    /// ISO 8601 timestamp
    pub created_at: String,
}

impl EventRow {
    /// Returns `None` when `created_at` is not a readable timestamp.
    pub fn into_event(self) -> Option<Event> {
        let timestamp = parse_timestamp(&self.created_at)?;
        Some(Event {
            name: self.event_name,
            user_id: self.user_id,
            session_id: self.session_id,
            timestamp,
        })
    }
}

/// Bounds of one fetch: events at or after `since`, newest first, at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowQuery {
    pub since: UtcDateTime,
    pub limit: u64,
}

impl WindowQuery {
    pub fn trailing(now: UtcDateTime, config: &AnalyticsWindowConfig) -> Self {
        Self {
            since: now - Duration::days(i64::from(config.lookback_days)),
            limit: config.max_rows,
        }
    }
}

/// The bounded, newest-first set of events a single dashboard render works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow {
    events: Vec<Event>,
    query: WindowQuery,
}

impl EventWindow {
    /// Builds a window from whatever a store returned, dropping events older than
    /// `query.since`, ordering newest first and applying the row cap.
    pub fn new(mut events: Vec<Event>, query: WindowQuery) -> Self {
        events.retain(|event| event.timestamp >= query.since);
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        Self { events, query }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn query(&self) -> &WindowQuery {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True when the row cap was hit, so older events in the period were left out.
    pub fn is_capped(&self) -> bool {
        self.events.len() as u64 >= self.query.limit
    }
}

/// A conversion percentage kept at one decimal place.
///
/// Stored as tenths of a percent so equality is exact. Not clamped: stages are
/// counted independently, so a later stage can outnumber an earlier one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage {
    tenths: u64,
}

impl Percentage {
    pub const ZERO: Percentage = Percentage { tenths: 0 };

    /// `numerator / denominator * 100`, rounded half away from zero to one
    /// decimal. A zero denominator yields 0.0.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        let tenths = (numerator as f64 * 1000.0 / denominator as f64).round();
        Self {
            tenths: tenths as u64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Activation funnel: landing through first chat and push opt-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActivationMetrics {
    /// Distinct sessions that viewed the landing page
    pub landing: u64,
    /// Distinct sessions that submitted the auth form
    pub auth_submit: u64,
    /// Distinct users that signed in
    pub auth_success: u64,
    /// Distinct users that saw their first vehicle
    pub first_vehicle: u64,
    /// Distinct users that sent a first chat message
    pub first_chat: u64,
    /// Distinct users that granted push permission
    pub push_granted: u64,
    /// Every auth error, repeats included
    pub auth_errors: u64,
    #[schema(value_type = String, example = "50.0")]
    pub auth_conversion_pct: Percentage,
    #[schema(value_type = String, example = "50.0")]
    pub activation_pct: Percentage,
    #[schema(value_type = String, example = "50.0")]
    pub first_chat_pct: Percentage,
    #[schema(value_type = String, example = "50.0")]
    pub push_opt_in_pct: Percentage,
}

/// Install funnel for the installable web app, one stage per prompt step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstallMetrics {
    pub install_views: u64,
    pub install_cta: u64,
    pub install_prompt: u64,
    pub install_accepted: u64,
    pub install_installed: u64,
    /// Every install error, repeats included
    pub install_errors: u64,
    #[schema(value_type = String, example = "40.0")]
    pub install_view_to_cta_pct: Percentage,
    #[schema(value_type = String, example = "40.0")]
    pub install_cta_to_prompt_pct: Percentage,
    #[schema(value_type = String, example = "40.0")]
    pub install_prompt_to_accept_pct: Percentage,
    #[schema(value_type = String, example = "40.0")]
    pub install_accept_to_installed_pct: Percentage,
    #[schema(value_type = String, example = "40.0")]
    pub install_view_to_installed_pct: Percentage,
}

/// Everything the growth dashboard shows for one event window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FunnelMetrics {
    pub activation: ActivationMetrics,
    pub install: InstallMetrics,
}
