//! Funnel aggregation over an in-memory event window.
//!
//! Every stage is counted on its own (distinct sessions or users per event
//! name), not by following one session through the funnel. Chained ratios can
//! therefore exceed 100% and are reported as-is.

use std::collections::HashSet;
use std::hash::Hash;

use crate::types::event_names::*;
use crate::types::{ActivationMetrics, Event, EventWindow, FunnelMetrics, InstallMetrics, Percentage};

/// How a funnel stage turns matching events into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// Every matching event
    Events,
    /// Distinct `session_id`
    Sessions,
    /// Distinct non-null `user_id`
    Users,
}

/// One funnel stage: an event name and how to count it.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub event_name: &'static str,
    pub tally: Tally,
}

impl Stage {
    const fn events(event_name: &'static str) -> Self {
        Self {
            event_name,
            tally: Tally::Events,
        }
    }

    const fn sessions(event_name: &'static str) -> Self {
        Self {
            event_name,
            tally: Tally::Sessions,
        }
    }

    const fn users(event_name: &'static str) -> Self {
        Self {
            event_name,
            tally: Tally::Users,
        }
    }

    pub fn measure(&self, events: &[Event]) -> u64 {
        match self.tally {
            Tally::Events => count(events, self.event_name),
            Tally::Sessions => unique_sessions(events, self.event_name),
            Tally::Users => unique_users(events, self.event_name),
        }
    }
}

pub mod activation {
    use super::*;

    pub const LANDING: Stage = Stage::sessions(LANDING_VIEW);
    pub const AUTH_SUBMITTED: Stage = Stage::sessions(AUTH_SUBMIT);
    pub const AUTH_SUCCEEDED: Stage = Stage::users(AUTH_SUCCESS);
    pub const FIRST_VEHICLE: Stage = Stage::users(FIRST_VEHICLE_VISIBLE);
    pub const FIRST_CHAT: Stage = Stage::users(FIRST_CHAT_SENT);
    pub const PUSH_GRANTED: Stage = Stage::users(PUSH_PERMISSION_GRANTED);
    pub const AUTH_ERRORS: Stage = Stage::events(AUTH_ERROR);
}

pub mod install {
    use super::*;

    pub const VIEWS: Stage = Stage::sessions(INSTALL_VIEW);
    pub const CTA: Stage = Stage::sessions(INSTALL_CTA_CLICK);
    pub const PROMPT: Stage = Stage::sessions(INSTALL_BEFORE_PROMPT);
    pub const ACCEPTED: Stage = Stage::sessions(INSTALL_PROMPT_ACCEPTED);
    pub const INSTALLED: Stage = Stage::sessions(INSTALL_APP_INSTALLED);
    pub const ERRORS: Stage = Stage::events(INSTALL_ERROR);
}

/// Number of events named `name`.
pub fn count(events: &[Event], name: &str) -> u64 {
    events.iter().filter(|event| event.name == name).count() as u64
}

/// Number of distinct sessions among events named `name`.
pub fn unique_sessions(events: &[Event], name: &str) -> u64 {
    group_count_distinct(events, name, |event| Some(event.session_id.as_str()))
}

/// Number of distinct signed-in users among events named `name`.
pub fn unique_users(events: &[Event], name: &str) -> u64 {
    group_count_distinct(events, name, |event| event.user_id.as_deref())
}

/// Size of the set of keys produced by `key_fn` over events named `name`.
/// Events for which `key_fn` returns `None` are left out.
pub fn group_count_distinct<'a, K, F>(events: &'a [Event], name: &str, key_fn: F) -> u64
where
    K: Eq + Hash,
    F: Fn(&'a Event) -> Option<K>,
{
    events
        .iter()
        .filter(|event| event.name == name)
        .filter_map(key_fn)
        .collect::<HashSet<K>>()
        .len() as u64
}

/// Compute both funnels for a window. Never fails; an empty window gives all zeros.
pub fn compute(window: &EventWindow) -> FunnelMetrics {
    compute_events(window.events())
}

pub fn compute_events(events: &[Event]) -> FunnelMetrics {
    FunnelMetrics {
        activation: activation_metrics(events),
        install: install_metrics(events),
    }
}

fn activation_metrics(events: &[Event]) -> ActivationMetrics {
    let landing = activation::LANDING.measure(events);
    let auth_submit = activation::AUTH_SUBMITTED.measure(events);
    let auth_success = activation::AUTH_SUCCEEDED.measure(events);
    let first_vehicle = activation::FIRST_VEHICLE.measure(events);
    let first_chat = activation::FIRST_CHAT.measure(events);
    let push_granted = activation::PUSH_GRANTED.measure(events);

    ActivationMetrics {
        landing,
        auth_submit,
        auth_success,
        first_vehicle,
        first_chat,
        push_granted,
        auth_errors: activation::AUTH_ERRORS.measure(events),
        auth_conversion_pct: Percentage::ratio(auth_submit, landing),
        activation_pct: Percentage::ratio(first_vehicle, auth_success),
        first_chat_pct: Percentage::ratio(first_chat, first_vehicle),
        push_opt_in_pct: Percentage::ratio(push_granted, auth_success),
    }
}

fn install_metrics(events: &[Event]) -> InstallMetrics {
    let install_views = install::VIEWS.measure(events);
    let install_cta = install::CTA.measure(events);
    let install_prompt = install::PROMPT.measure(events);
    let install_accepted = install::ACCEPTED.measure(events);
    let install_installed = install::INSTALLED.measure(events);

    InstallMetrics {
        install_views,
        install_cta,
        install_prompt,
        install_accepted,
        install_installed,
        install_errors: install::ERRORS.measure(events),
        install_view_to_cta_pct: Percentage::ratio(install_cta, install_views),
        install_cta_to_prompt_pct: Percentage::ratio(install_prompt, install_cta),
        install_prompt_to_accept_pct: Percentage::ratio(install_accepted, install_prompt),
        install_accept_to_installed_pct: Percentage::ratio(install_installed, install_accepted),
        install_view_to_installed_pct: Percentage::ratio(install_installed, install_views),
    }
}
