//! Delight core: overlay state, preferences storage and messaging
//!
//! Everything here is free of drawing concerns. The overlay crate turns
//! [`OverlayState`] into pixels; the CLI wires the store, the channel and the
//! settings flow together.

pub mod error;
pub mod geometry;
pub mod messaging;
pub mod settings;
pub mod state;
pub mod store;

pub use error::{ChannelError, StoreError, WireError};
pub use geometry::{Point, Rect};
pub use messaging::{PrefsClient, PrefsMessage, PrefsService, PrefsUpdate, channel};
pub use settings::{SettingsController, SettingsEvent, SettingsView, apply};
pub use state::{FocusTarget, LitTargets, OverlayState};
pub use store::{FileStore, MemoryStore, PreferencesStore, StoredPreferences};
