//! Settings flow
//!
//! The settings surface never edits a shared preferences value in place.
//! Each form change becomes a [`SettingsEvent`]; [`apply`] derives the next
//! value; the controller persists it with `SET_PREFS` and then re-reads it
//! with `GET_PREFS` so the view always shows what the store holds.

use delight_types::{OverlayColor, Preferences};

use crate::error::ChannelError;
use crate::messaging::PrefsClient;

/// A single change emitted by the settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    ToggleEnabled,
    SetEnabled(bool),
    /// Raw text of the overlay color input
    OverlayColor(String),
    /// Raw text of the lit-region width input
    LitWidth(String),
    /// Raw text of the lit-region height input
    LitHeight(String),
}

/// Derive the next preferences value from a form event.
///
/// Input that does not parse leaves the corresponding field unchanged.
pub fn apply(prefs: &Preferences, event: &SettingsEvent) -> Preferences {
    let mut next = *prefs;
    match event {
        SettingsEvent::ToggleEnabled => next.enabled = !prefs.enabled,
        SettingsEvent::SetEnabled(enabled) => next.enabled = *enabled,
        SettingsEvent::OverlayColor(text) => match text.parse::<OverlayColor>() {
            Ok(color) => next.overlay_color = color,
            Err(e) => tracing::debug!(input = %text, error = %e, "Ignoring overlay color"),
        },
        SettingsEvent::LitWidth(text) => match parse_dimension(text) {
            Some(width) => next.lit_region.width = width,
            None => tracing::debug!(input = %text, "Ignoring lit region width"),
        },
        SettingsEvent::LitHeight(text) => match parse_dimension(text) {
            Some(height) => next.lit_region.height = height,
            None => tracing::debug!(input = %text, "Ignoring lit region height"),
        },
    }
    next
}

/// Parse leading decimal digits the way a browser number field's `parseInt`
/// does ("320px" is 320). Negative, empty and overflowing input is rejected.
pub fn parse_dimension(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}

/// What the settings surface currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsView {
    /// First `GET_PREFS` still in flight
    Loading,
    Ready(Preferences),
}

/// Drives the unidirectional form → store → form loop for one host
#[derive(Debug)]
pub struct SettingsController {
    client: PrefsClient,
    host: String,
    view: SettingsView,
}

impl SettingsController {
    pub fn new(client: PrefsClient, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
            view: SettingsView::Loading,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn view(&self) -> SettingsView {
        self.view
    }

    /// Fetch the stored preferences and show them
    pub async fn load(&mut self) -> Result<Preferences, ChannelError> {
        let prefs = self.client.get(&self.host).await?;
        self.view = SettingsView::Ready(prefs);
        Ok(prefs)
    }

    /// Apply one form event: compute, persist, re-read.
    ///
    /// Loads first if the view is still loading.
    pub async fn dispatch(&mut self, event: SettingsEvent) -> Result<Preferences, ChannelError> {
        let current = match self.view {
            SettingsView::Ready(prefs) => prefs,
            SettingsView::Loading => self.load().await?,
        };

        let next = apply(&current, &event);
        if next != current {
            self.client.set(&self.host, next).await?;
        }
        self.load().await
    }
}
