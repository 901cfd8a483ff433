// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Panel item using ksni (StatusNotifierItem).
//!
//! The item runs on its own single-threaded tokio runtime and forwards
//! activations to the applet over a channel.

use crate::config::PanelConfig;
use crate::panel::{PanelApplet, PanelError, PanelEvent, PanelSlot, WidgetHandle};
use ksni::{menu::StandardItem, Handle, MenuItem, Tray, TrayMethods};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// State shared with the panel item.
struct MixletTray {
    /// Channel to send events to the applet.
    tx: mpsc::Sender<PanelEvent>,
    slot: PanelSlot,
    icon_name: String,
    /// Number of streams currently known.
    streams: usize,
}

impl Tray for MixletTray {
    fn id(&self) -> String {
        self.slot.id.clone()
    }

    fn title(&self) -> String {
        self.slot.title.clone()
    }

    fn icon_name(&self) -> String {
        self.icon_name.clone()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: self.slot.title.clone(),
            description: stream_summary(self.streams),
            icon_name: String::new(),
            icon_pixmap: vec![],
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        vec![MenuItem::Standard(StandardItem {
            label: "Quit".to_string(),
            activate: Box::new(|tray: &mut Self| {
                debug!("Panel item: Quit clicked");
                let _ = tray.tx.send(PanelEvent::Quit);
            }),
            ..Default::default()
        })]
    }

    fn activate(&mut self, x: i32, y: i32) {
        debug!("Panel item activated at ({}, {})", x, y);
        let _ = self.tx.send(PanelEvent::Activate { x, y });
    }
}

/// Tooltip text for the number of streams.
fn stream_summary(count: usize) -> String {
    match count {
        0 => "No applications playing audio".to_string(),
        1 => "1 application playing audio".to_string(),
        n => format!("{} applications playing audio", n),
    }
}

/// A running panel item.
pub struct TrayApplet {
    handle: Handle<MixletTray>,
    runtime: tokio::runtime::Handle,
    events: mpsc::Receiver<PanelEvent>,
    stop_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    widget: WidgetHandle,
}

impl PanelApplet for TrayApplet {
    /// Start the panel item and wait until the host accepted it.
    fn create(slot: PanelSlot, config: &PanelConfig) -> Result<Self, PanelError> {
        let (tx, events) = mpsc::channel();
        let widget = WidgetHandle {
            item_id: slot.id.clone(),
            icon_name: config.icon_name.clone(),
        };
        let tray = MixletTray {
            tx,
            slot,
            icon_name: config.icon_name.clone(),
            streams: 0,
        };

        let (handle_tx, handle_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("mixlet-panel".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = handle_tx.send(Err(PanelError::ThreadError(e.to_string())));
                        return;
                    }
                };

                rt.block_on(async {
                    match tray.spawn().await {
                        Ok(handle) => {
                            info!("Panel item registered");
                            let runtime = tokio::runtime::Handle::current();
                            let _ = handle_tx.send(Ok((handle, runtime)));
                            // Keep the runtime alive until destroyed
                            let _ = stop_rx.await;
                        }
                        Err(e) => {
                            error!("Failed to register panel item: {}", e);
                            let _ = handle_tx.send(Err(PanelError::HostUnavailable(e.to_string())));
                        }
                    }
                });
            })
            .map_err(|e| PanelError::ThreadError(e.to_string()))?;

        match handle_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok((handle, runtime))) => Ok(Self {
                handle,
                runtime,
                events,
                stop_tx: Some(stop_tx),
                thread: Some(thread),
                widget,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                error!("Timeout waiting for panel item");
                Err(PanelError::Timeout)
            }
        }
    }

    fn widget_handle(&self) -> WidgetHandle {
        self.widget.clone()
    }

    fn poll_events(&self) -> Vec<PanelEvent> {
        self.events.try_iter().collect()
    }

    fn set_stream_count(&self, count: usize) {
        let handle = self.handle.clone();
        self.runtime.spawn(async move {
            handle
                .update(move |tray: &mut MixletTray| {
                    tray.streams = count;
                })
                .await;
        });
    }

    fn destroy(mut self: Box<Self>) {
        info!("Removing panel item");
        let _ = self.handle.shutdown();
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_summary() {
        assert_eq!(stream_summary(0), "No applications playing audio");
        assert_eq!(stream_summary(1), "1 application playing audio");
        assert_eq!(stream_summary(4), "4 applications playing audio");
    }
}
