//! Page session: one overlay driven by input events and preference updates
//!
//! The session runs on a single task. It asks for the page host's preferences
//! once, listens for later `SET_PREFS` broadcasts for the same host, and
//! applies input events in delivery order with one full render each. Events
//! that arrive before the preferences still update state; the first render
//! that draws happens when the preferences land.

use delight_core::messaging::PrefsClient;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::events::InputEvent;
use crate::overlay::Overlay;
use crate::surface::DrawingSurface;

/// Drive `overlay` until the event sender is dropped, then hand it back.
///
/// If the event stream ends before the preferences arrive, the session waits
/// for them so the final frame is drawn.
pub async fn run_page<S: DrawingSurface>(
    mut overlay: Overlay<S>,
    client: PrefsClient,
    mut events: mpsc::Receiver<InputEvent>,
) -> Overlay<S> {
    let host = overlay.host().to_string();
    // Subscribe before asking so no update slips between the two
    let mut updates = client.subscribe();
    let fetch = client.get(&host);
    tokio::pin!(fetch);

    let mut fetched = false;
    let mut listening = true;
    tracing::debug!(%host, "Page session started");

    loop {
        tokio::select! {
            biased;

            prefs = &mut fetch, if !fetched => {
                fetched = true;
                match prefs {
                    Ok(prefs) => {
                        overlay.set_preferences(prefs);
                    }
                    Err(e) => tracing::warn!(%host, error = %e, "Could not load preferences"),
                }
            }

            update = updates.recv(), if listening => match update {
                Ok(update) if update.host == host => {
                    overlay.set_preferences(update.data);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%host, skipped, "Missed preference updates");
                }
                Err(RecvError::Closed) => listening = false,
            },

            event = events.recv() => match event {
                Some(event) => {
                    overlay.dispatch(event);
                }
                None => break,
            },
        }
    }

    if !fetched {
        match fetch.await {
            Ok(prefs) => {
                overlay.set_preferences(prefs);
            }
            Err(e) => tracing::warn!(%host, error = %e, "Could not load preferences"),
        }
    }

    tracing::debug!(%host, "Page session ended");
    overlay
}
