// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Iced daemon implementation for Mixlet.

use crate::audio::{PulseCommand, PulseEvent, PulseThread};
use crate::config::AppConfig;
use crate::message::Message;
use crate::panel::{self, PanelApplet, PanelEvent, PanelSlot};
use crate::popup::PopupTransition;
use crate::state::AppState;
use crate::ui::theme;
use iced::widget::Space;
use iced::{window, Element, Event, Point, Subscription, Task, Theme};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

/// Main application state.
pub struct Mixlet {
    /// Application state.
    state: AppState,
    /// Sound server thread handle.
    pulse_thread: Option<PulseThread>,
    /// Receiver for sound server events.
    pulse_event_rx: mpsc::Receiver<PulseEvent>,
    /// The panel item this instance lives in.
    applet: Option<Box<dyn PanelApplet>>,
}

impl Mixlet {
    /// Create a new application instance.
    pub fn new(config: AppConfig) -> (Self, Task<Message>) {
        let state = AppState::new(&config);

        let (event_tx, event_rx) = mpsc::channel();

        let pulse_thread = match PulseThread::spawn(config.connection.clone(), event_tx) {
            Ok(thread) => {
                info!("Sound server thread started");
                Some(thread)
            }
            Err(e) => {
                error!("Failed to start sound server thread: {}", e);
                None
            }
        };

        let (applet, task) = match panel::construct(PanelSlot::default(), &config.panel) {
            Ok(applet) => {
                let widget = applet.widget_handle();
                info!("Panel item {} ready ({})", widget.item_id, widget.icon_name);
                (Some(applet), Task::none())
            }
            Err(e) => {
                error!("Failed to construct panel applet: {}", e);
                (None, iced::exit())
            }
        };

        let app = Self {
            state,
            pulse_thread,
            pulse_event_rx: event_rx,
            applet,
        };

        (app, task)
    }

    /// Handle messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let mut tasks = self.poll_pulse_events();
                tasks.extend(self.poll_panel_events());
                Task::batch(tasks)
            }
            Message::VolumeChanged(index, value) => {
                self.state.mixer.set_slider(index, value);
                if let Some(cmd) = self.state.sync.volume_request(index, value) {
                    trace!("Stream {} volume -> {:.0}", index, value);
                    self.send_pulse_command(cmd);
                }
                Task::none()
            }
            Message::PopupOpened(id) => {
                debug!("Popup window {:?} opened", id);
                Task::none()
            }
            Message::WindowFocusLost(id) => match self.state.popup.focus_lost(id) {
                Some(id) => window::close(id),
                None => Task::none(),
            },
            Message::WindowClosed(id) => {
                self.state.popup.closed(id);
                Task::none()
            }
        }
    }

    /// Render a window. Only the popup has content.
    pub fn view(&self, id: window::Id) -> Element<'_, Message> {
        if self.state.popup.window() == Some(id) {
            self.state.mixer.view()
        } else {
            Space::new().into()
        }
    }

    /// Get the application theme.
    pub fn theme(&self, _id: window::Id) -> Theme {
        theme::mixlet_theme()
    }

    /// Subscription for external events.
    pub fn subscription(&self) -> Subscription<Message> {
        // Tick every 50ms to poll the worker channels
        let tick = iced::time::every(Duration::from_millis(50)).map(|_| Message::Tick);

        let windows = iced::event::listen_with(|event, _status, id| match event {
            Event::Window(window::Event::Unfocused) => Some(Message::WindowFocusLost(id)),
            Event::Window(window::Event::Closed) => Some(Message::WindowClosed(id)),
            _ => None,
        });

        Subscription::batch([tick, windows])
    }

    /// Send a command to the sound server thread.
    fn send_pulse_command(&self, cmd: PulseCommand) {
        if let Some(ref thread) = self.pulse_thread {
            if let Err(e) = thread.send(cmd) {
                error!("Failed to send command to sound server thread: {}", e);
            }
        }
    }

    /// Apply pending sound server events in order.
    fn poll_pulse_events(&mut self) -> Vec<Task<Message>> {
        let events: Vec<PulseEvent> = self.pulse_event_rx.try_iter().collect();
        let mut tasks = Vec::new();

        for event in events {
            let outcome = self.state.handle_pulse_event(event);
            for cmd in outcome.requests {
                self.send_pulse_command(cmd);
            }
            if let (Some(count), Some(applet)) = (outcome.stream_count, &self.applet) {
                applet.set_stream_count(count);
            }
            if let Some((id, size)) = outcome.resize {
                tasks.push(window::resize(id, size));
            }
        }

        tasks
    }

    /// Apply pending panel activations.
    fn poll_panel_events(&mut self) -> Vec<Task<Message>> {
        let events = match &self.applet {
            Some(applet) => applet.poll_events(),
            None => Vec::new(),
        };

        let mut tasks = Vec::new();
        for event in events {
            match event {
                PanelEvent::Activate { .. } => {
                    let anchor = event.anchor().unwrap_or(Point::ORIGIN);
                    tasks.push(self.toggle_popup(anchor));
                }
                PanelEvent::Quit => {
                    info!("Quit requested from panel");
                    self.teardown();
                    tasks.push(iced::exit());
                    break;
                }
            }
        }
        tasks
    }

    fn toggle_popup(&mut self, anchor: Point) -> Task<Message> {
        match self.state.activate() {
            PopupTransition::Show => {
                let open = self.state.prepare_open(anchor);
                if let Some(cmd) = open.enumerate {
                    self.send_pulse_command(cmd);
                }

                let (id, task) = window::open(window::Settings {
                    size: open.size,
                    position: window::Position::Specific(open.position),
                    decorations: false,
                    resizable: false,
                    level: window::Level::AlwaysOnTop,
                    ..window::Settings::default()
                });
                self.state.opened(id);
                task.map(Message::PopupOpened)
            }
            PopupTransition::Hide(id) => {
                debug!("Hiding popup");
                window::close(id)
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(applet) = self.applet.take() {
            applet.destroy();
        }
        if let Some(thread) = self.pulse_thread.take() {
            thread.shutdown();
        }
    }
}

impl Drop for Mixlet {
    fn drop(&mut self) {
        self.teardown();
    }
}
