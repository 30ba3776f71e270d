use std::path::Path;

use delight_core::geometry::Rect;
use delight_core::messaging::PrefsClient;
use delight_core::settings::{SettingsController, SettingsEvent, parse_dimension};
use delight_core::state::FocusTarget;
use delight_overlay::{HeadlessSurface, InputEvent, Overlay, run_page};
use delight_types::{OverlayColor, Preferences};
use tokio::sync::mpsc;

use crate::context::{CliContext, open_store};

/// Changes requested by `delight set`
#[derive(Debug, Default)]
pub struct SetArgs {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl SetArgs {
    /// Validate the raw inputs and turn them into settings events
    pub fn into_events(self) -> Result<Vec<SettingsEvent>, String> {
        let mut events = Vec::new();
        if let Some(enabled) = self.enabled {
            events.push(SettingsEvent::SetEnabled(enabled));
        }
        if let Some(color) = self.color {
            color
                .parse::<OverlayColor>()
                .map_err(|e| format!("invalid color {color:?}: {e}"))?;
            events.push(SettingsEvent::OverlayColor(color));
        }
        if let Some(width) = self.width {
            parse_dimension(&width).ok_or_else(|| format!("invalid width {width:?}"))?;
            events.push(SettingsEvent::LitWidth(width));
        }
        if let Some(height) = self.height {
            parse_dimension(&height).ok_or_else(|| format!("invalid height {height:?}"))?;
            events.push(SettingsEvent::LitHeight(height));
        }
        Ok(events)
    }
}

/// Input replayed by `delight render`
#[derive(Debug, Default)]
pub struct RenderArgs {
    pub viewport: (u32, u32),
    pub pointers: Vec<(f32, f32)>,
    pub focus: Option<Rect>,
    pub blur: bool,
}

impl RenderArgs {
    /// Events in replay order: pointer moves, then focus, then blur
    pub fn events(&self) -> Vec<InputEvent> {
        let mut events: Vec<InputEvent> = self
            .pointers
            .iter()
            .map(|&(x, y)| InputEvent::PointerMove { x, y })
            .collect();
        if let Some(rect) = self.focus {
            events.push(InputEvent::Focus(FocusTarget::Element(rect)));
        }
        if self.blur {
            events.push(InputEvent::Blur);
        }
        events
    }
}

fn to_json(prefs: &Preferences) -> Result<String, String> {
    serde_json::to_string_pretty(prefs).map_err(|e| e.to_string())
}

pub async fn get(host: &str, ctx: &CliContext) -> Result<(), String> {
    let prefs = ctx.client.get(host).await.map_err(|e| e.to_string())?;
    println!("{}", to_json(&prefs)?);
    Ok(())
}

pub async fn set(host: &str, args: SetArgs, ctx: &CliContext) -> Result<(), String> {
    let events = args.into_events()?;
    if events.is_empty() {
        return Err("nothing to set; pass --enabled, --color, --width or --height".to_string());
    }

    let mut settings = SettingsController::new(ctx.client.clone(), host);
    let mut shown = settings.load().await.map_err(|e| e.to_string())?;
    for event in events {
        shown = settings.dispatch(event).await.map_err(|e| e.to_string())?;
    }
    println!("{}", to_json(&shown)?);
    Ok(())
}

pub async fn toggle(host: &str, ctx: &CliContext) -> Result<(), String> {
    let mut settings = SettingsController::new(ctx.client.clone(), host);
    let shown = settings
        .dispatch(SettingsEvent::ToggleEnabled)
        .await
        .map_err(|e| e.to_string())?;
    let state = if shown.enabled { "enabled" } else { "disabled" };
    println!("{host}: {state}");
    Ok(())
}

/// Replay `args` against a headless surface for `host`.
///
/// Returns `None` when the host has the overlay switched off, and an error
/// when its preferences could not be loaded.
pub async fn render_frame(
    host: &str,
    args: &RenderArgs,
    client: &PrefsClient,
) -> Result<Option<HeadlessSurface>, String> {
    let (width, height) = args.viewport;
    let surface = HeadlessSurface::new(width, height).map_err(|e| e.to_string())?;
    let overlay = Overlay::create(host, surface).map_err(|e| e.to_string())?;

    let events = args.events();
    let (tx, rx) = mpsc::channel(events.len().max(1));
    for event in events {
        tx.try_send(event).map_err(|e| e.to_string())?;
    }
    drop(tx);

    let overlay = run_page(overlay, client.clone(), rx).await;
    let loaded = overlay.state().is_loaded();
    let enabled = overlay.state().is_enabled();
    let surface = overlay.destroy();

    if !loaded {
        return Err(format!("could not load preferences for {host}"));
    }
    Ok(enabled.then_some(surface))
}

pub async fn render(
    host: &str,
    args: &RenderArgs,
    out: &Path,
    ctx: &CliContext,
) -> Result<(), String> {
    let Some(surface) = render_frame(host, args, &ctx.client).await? else {
        println!("{host}: overlay disabled, nothing rendered");
        return Ok(());
    };

    surface.save_png(out).map_err(|e| e.to_string())?;
    println!(
        "wrote {}x{} frame to {}",
        surface.width(),
        surface.height(),
        out.display()
    );
    Ok(())
}

pub fn hosts(store: Option<&Path>) -> Result<(), String> {
    let store = open_store(store)?;
    let hosts = store.hosts();
    if hosts.is_empty() {
        println!("No stored preferences in {}", store.path().display());
        return Ok(());
    }
    for host in hosts {
        println!("{host}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use delight_core::messaging::channel;
    use delight_core::store::{MemoryStore, PreferencesStore};
    use delight_types::{DEFAULT_PREFERENCES, LitRegion};

    #[test]
    fn set_args_validate_inputs() {
        let events = SetArgs {
            enabled: Some(false),
            color: Some("#000000cc".into()),
            width: Some("320px".into()),
            height: None,
        }
        .into_events()
        .unwrap();
        assert_eq!(
            events,
            vec![
                SettingsEvent::SetEnabled(false),
                SettingsEvent::OverlayColor("#000000cc".into()),
                SettingsEvent::LitWidth("320px".into()),
            ]
        );

        let bad = SetArgs {
            color: Some("blue-ish".into()),
            ..Default::default()
        };
        assert!(bad.into_events().is_err());

        let bad = SetArgs {
            height: Some("-3".into()),
            ..Default::default()
        };
        assert!(bad.into_events().is_err());
    }

    #[test]
    fn render_events_follow_replay_order() {
        let args = RenderArgs {
            viewport: (10, 10),
            pointers: vec![(1.0, 2.0), (3.0, 4.0)],
            focus: Some(Rect::new(0.0, 0.0, 5.0, 5.0)),
            blur: true,
        };
        assert_eq!(
            args.events(),
            vec![
                InputEvent::PointerMove { x: 1.0, y: 2.0 },
                InputEvent::PointerMove { x: 3.0, y: 4.0 },
                InputEvent::Focus(FocusTarget::Element(Rect::new(0.0, 0.0, 5.0, 5.0))),
                InputEvent::Blur,
            ]
        );
    }

    fn pointer_at_center() -> RenderArgs {
        RenderArgs {
            viewport: (40, 30),
            pointers: vec![(20.0, 15.0)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn render_frame_draws_enabled_hosts() {
        let mut store = MemoryStore::new();
        let prefs = Preferences {
            lit_region: LitRegion::new(40, 40),
            ..DEFAULT_PREFERENCES
        };
        PreferencesStore::set(&mut store, "example.com", prefs).unwrap();
        let (client, service) = channel(store, 4);
        tokio::spawn(service.run());

        let surface = render_frame("example.com", &pointer_at_center(), &client)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((surface.width(), surface.height()), (40, 30));
        assert!(surface.frames() >= 1);
        assert!(surface.alpha_at(20, 15).unwrap() < surface.alpha_at(0, 0).unwrap());
    }

    #[tokio::test]
    async fn render_frame_skips_disabled_hosts() {
        let mut store = MemoryStore::new();
        PreferencesStore::set(&mut store, "example.com", DEFAULT_PREFERENCES.with_enabled(false))
            .unwrap();
        let (client, service) = channel(store, 4);
        tokio::spawn(service.run());

        let frame = render_frame("example.com", &pointer_at_center(), &client).await;
        assert!(matches!(frame, Ok(None)));
    }

    #[tokio::test]
    async fn render_frame_fails_when_preferences_cannot_load() {
        let (client, service) = channel(MemoryStore::new(), 4);
        drop(service);

        let frame = render_frame("example.com", &pointer_at_center(), &client).await;
        assert!(matches!(frame, Err(e) if e.contains("could not load preferences")));
    }

    #[tokio::test]
    async fn commands_round_trip_through_the_file_store() {
        let path = std::env::temp_dir().join(format!(
            "delight-cli-test-{}/preferences.toml",
            std::process::id()
        ));
        let ctx = CliContext::open(Some(path.as_path())).unwrap();

        let args = SetArgs {
            width: Some("300".into()),
            ..Default::default()
        };
        set("example.com", args, &ctx).await.unwrap();
        toggle("example.com", &ctx).await.unwrap();

        let prefs = ctx.client.get("example.com").await.unwrap();
        assert!(!prefs.enabled);
        assert_eq!(prefs.lit_region.width, 300);

        let store = ctx.shutdown().await.unwrap();
        assert_eq!(store.hosts(), vec!["example.com"]);

        let reopened = open_store(Some(path.as_path())).unwrap();
        assert_eq!(reopened.hosts(), vec!["example.com"]);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
