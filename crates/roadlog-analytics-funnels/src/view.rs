//! Dashboard presentation: labelled tiles for each funnel.

use serde::Serialize;

use crate::types::{FunnelMetrics, Percentage};

/// Shown in every tile while the event window is still being fetched.
pub const LOADING_PLACEHOLDER: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Loading,
    Ready(FunnelMetrics),
    /// Fetch failed; the message is surfaced to the operator as-is
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSection {
    pub title: &'static str,
    pub tiles: Vec<MetricTile>,
}

enum Value {
    Count(u64),
    Percent(Percentage),
}

impl Value {
    fn render(&self) -> String {
        match self {
            Value::Count(n) => n.to_string(),
            Value::Percent(p) => format!("{}%", p),
        }
    }
}

type Field = (&'static str, fn(&FunnelMetrics) -> Value);

const ACTIVATION_TILES: &[Field] = &[
    ("Landing sessions", |m| Value::Count(m.activation.landing)),
    ("Auth submits", |m| Value::Count(m.activation.auth_submit)),
    ("Auth conversion", |m| Value::Percent(m.activation.auth_conversion_pct)),
    ("Signed-in users", |m| Value::Count(m.activation.auth_success)),
    ("First vehicle", |m| Value::Count(m.activation.first_vehicle)),
    ("Activation", |m| Value::Percent(m.activation.activation_pct)),
    ("First chat", |m| Value::Count(m.activation.first_chat)),
    ("First chat rate", |m| Value::Percent(m.activation.first_chat_pct)),
    ("Push granted", |m| Value::Count(m.activation.push_granted)),
    ("Push opt-in", |m| Value::Percent(m.activation.push_opt_in_pct)),
    ("Auth errors", |m| Value::Count(m.activation.auth_errors)),
];

const INSTALL_TILES: &[Field] = &[
    ("Install views", |m| Value::Count(m.install.install_views)),
    ("CTA clicks", |m| Value::Count(m.install.install_cta)),
    ("View → CTA", |m| Value::Percent(m.install.install_view_to_cta_pct)),
    ("Prompts shown", |m| Value::Count(m.install.install_prompt)),
    ("CTA → prompt", |m| Value::Percent(m.install.install_cta_to_prompt_pct)),
    ("Prompts accepted", |m| Value::Count(m.install.install_accepted)),
    ("Prompt → accept", |m| Value::Percent(m.install.install_prompt_to_accept_pct)),
    ("Installed", |m| Value::Count(m.install.install_installed)),
    ("Accept → installed", |m| Value::Percent(m.install.install_accept_to_installed_pct)),
    ("View → installed", |m| Value::Percent(m.install.install_view_to_installed_pct)),
    ("Install errors", |m| Value::Count(m.install.install_errors)),
];

const SECTIONS: &[(&str, &[Field])] = &[
    ("Activation funnel", ACTIVATION_TILES),
    ("Install funnel", INSTALL_TILES),
];

pub struct DashboardView;

impl DashboardView {
    /// Sections to draw for `state`. A failed fetch renders nothing; the caller
    /// reports the error instead.
    pub fn render(state: &DashboardState) -> Vec<MetricSection> {
        let metrics = match state {
            DashboardState::Failed(_) => return Vec::new(),
            DashboardState::Loading => None,
            DashboardState::Ready(metrics) => Some(metrics),
        };

        SECTIONS
            .iter()
            .map(|&(title, fields)| MetricSection {
                title,
                tiles: fields
                    .iter()
                    .map(|&(label, value)| MetricTile {
                        label,
                        value: metrics
                            .map(|m| value(m).render())
                            .unwrap_or_else(|| LOADING_PLACEHOLDER.to_string()),
                    })
                    .collect(),
            })
            .collect()
    }
}
