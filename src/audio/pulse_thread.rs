// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sound server thread management and event handling.
//!
//! The libpulse mainloop and context are not Send, so they live on a
//! dedicated thread. The UI talks to it through [`PulseCommand`]s and
//! receives every server callback as a [`PulseEvent`], in the order the
//! server emitted them.

use crate::audio::types::{ConnectionState, StreamDescriptor, StreamProperties};
use crate::audio::volume;
use crate::config::ConnectionConfig;
use libpulse_binding::callbacks::ListResult;
use libpulse_binding::context::introspect::SinkInputInfo;
use libpulse_binding::context::subscribe::{Facility, InterestMaskSet, Operation};
use libpulse_binding::context::{Context, FlagSet as ContextFlagSet, State as ContextState};
use libpulse_binding::mainloop::standard::{IterateResult, Mainloop};
use libpulse_binding::proplist::properties;
use std::sync::mpsc::{self, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Poll interval of the mainloop when idle.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Commands sent from the UI thread to the sound server thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PulseCommand {
    /// List every live stream.
    EnumerateStreams,
    /// Fetch a single stream by index.
    FetchStream(u32),
    /// Set all channels of a stream to the same volume.
    SetVolume { index: u32, channels: u8, volume: u32 },
    /// Disconnect and stop the thread.
    Shutdown,
}

/// Events sent from the sound server thread to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PulseEvent {
    /// Context handshake in progress.
    Connecting,
    /// Connection established and subscribed.
    Ready,
    /// Connection failed or was terminated.
    Failed(String),
    /// Thread shut down.
    Disconnected,
    /// A stream appeared.
    StreamNew(u32),
    /// A stream's properties or volume changed.
    StreamChanged(u32),
    /// A stream went away.
    StreamRemoved(u32),
    /// One stream of an enumeration or fetch.
    EnumerationItem(StreamDescriptor),
    /// End of an enumeration or fetch.
    EnumerationDone,
}

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Sound server initialization failed: {0}")]
    InitFailed(String),
    #[error("Failed to connect to sound server: {0}")]
    ConnectionFailed(String),
    #[error("Sound server thread error: {0}")]
    ThreadError(String),
}

/// Handle to the sound server thread.
pub struct PulseThread {
    cmd_tx: mpsc::Sender<PulseCommand>,
    handle: Option<JoinHandle<()>>,
}

impl PulseThread {
    /// Spawn the sound server thread and return a handle.
    pub fn spawn(
        config: ConnectionConfig,
        event_tx: mpsc::Sender<PulseEvent>,
    ) -> Result<Self, PulseError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PulseCommand>();

        let handle = thread::Builder::new()
            .name("pulse".to_string())
            .spawn(move || {
                let result = run_pulse_loop(&config, &cmd_rx, &event_tx);
                if let Err(ref e) = result {
                    error!("Sound server thread error: {}", e);
                }
                let _ = event_tx.send(exit_event(result));
            })
            .map_err(|e| PulseError::ThreadError(e.to_string()))?;

        Ok(Self {
            cmd_tx,
            handle: Some(handle),
        })
    }

    /// Send a command to the sound server thread.
    pub fn send(&self, cmd: PulseCommand) -> Result<(), PulseError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| PulseError::ThreadError("Channel closed".to_string()))
    }

    /// Request shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(PulseCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PulseThread {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One context and the last state reported for it.
struct Session {
    context: Context,
    state: ConnectionState,
}

impl Session {
    fn connect(mainloop: &Mainloop, client_name: &str) -> Result<Self, PulseError> {
        let mut context = Context::new(mainloop, client_name)
            .ok_or_else(|| PulseError::InitFailed("could not create context".to_string()))?;

        context
            .connect(None, ContextFlagSet::NOFLAGS, None)
            .map_err(|e| PulseError::ConnectionFailed(format!("{:?}", e)))?;

        debug!("Context connecting as '{}'", client_name);
        Ok(Self {
            context,
            state: ConnectionState::Disconnected,
        })
    }

    /// Poll the context state; returns the new state if it changed.
    fn poll_state(&mut self) -> Option<ConnectionState> {
        let state = match self.context.get_state() {
            ContextState::Unconnected => ConnectionState::Disconnected,
            ContextState::Connecting | ContextState::Authorizing | ContextState::SettingName => {
                ConnectionState::Connecting
            }
            ContextState::Ready => ConnectionState::Ready,
            ContextState::Failed | ContextState::Terminated => ConnectionState::Failed,
        };

        if state == self.state {
            return None;
        }
        self.state = state;
        Some(state)
    }

    /// Subscribe to stream lifecycle events.
    fn subscribe(&mut self, event_tx: &mpsc::Sender<PulseEvent>) {
        let tx = event_tx.clone();
        self.context
            .set_subscribe_callback(Some(Box::new(move |facility, operation, index| {
                if !matches!(facility, Some(Facility::SinkInput)) {
                    return;
                }
                let event = match operation {
                    Some(Operation::New) => PulseEvent::StreamNew(index),
                    Some(Operation::Changed) => PulseEvent::StreamChanged(index),
                    Some(Operation::Removed) => PulseEvent::StreamRemoved(index),
                    None => return,
                };
                trace!("Subscription event: {:?}", event);
                let _ = tx.send(event);
            })));

        self.context
            .subscribe(InterestMaskSet::SINK_INPUT, |success| {
                if !success {
                    warn!("Stream subscription was rejected by the server");
                }
            });
    }

    fn handle_command(&mut self, cmd: PulseCommand, event_tx: &mpsc::Sender<PulseEvent>) {
        if !self.state.is_ready() {
            debug!("Dropping {:?}: connection is {}", cmd, self.state);
            return;
        }

        match cmd {
            PulseCommand::EnumerateStreams => {
                debug!("Enumerating streams");
                let tx = event_tx.clone();
                self.context
                    .introspect()
                    .get_sink_input_info_list(move |result| forward_list_result(&tx, result));
            }
            PulseCommand::FetchStream(index) => {
                debug!("Fetching stream {}", index);
                let tx = event_tx.clone();
                self.context
                    .introspect()
                    .get_sink_input_info(index, move |result| forward_list_result(&tx, result));
            }
            PulseCommand::SetVolume {
                index,
                channels,
                volume,
            } => {
                if channels == 0 {
                    debug!("Stream {} has no volume channels, ignoring", index);
                    return;
                }
                trace!("Setting volume on stream {}: {} x {}", index, channels, volume);
                let cv = volume::to_channel_volumes(channels, volume);
                self.context.introspect().set_sink_input_volume(
                    index,
                    &cv,
                    Some(Box::new(move |success| {
                        trace!("Volume set on stream {} finished: {}", index, success);
                    })),
                );
            }
            PulseCommand::Shutdown => {}
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.context.set_subscribe_callback(None);
        self.context.disconnect();
    }
}

/// Last event of the thread: a clean shutdown disconnects, an error leaves
/// the connection failed.
fn exit_event(result: Result<(), PulseError>) -> PulseEvent {
    match result {
        Ok(()) => PulseEvent::Disconnected,
        Err(e) => PulseEvent::Failed(e.to_string()),
    }
}

/// Forward one introspection callback as events.
fn forward_list_result(tx: &mpsc::Sender<PulseEvent>, result: ListResult<&SinkInputInfo>) {
    let event = match result {
        ListResult::Item(info) => PulseEvent::EnumerationItem(descriptor_from_info(info)),
        ListResult::End => PulseEvent::EnumerationDone,
        ListResult::Error => {
            warn!("Stream introspection failed");
            PulseEvent::EnumerationDone
        }
    };
    let _ = tx.send(event);
}

fn descriptor_from_info(info: &SinkInputInfo) -> StreamDescriptor {
    StreamDescriptor {
        index: info.index,
        name: info.name.as_ref().map(|n| n.to_string()),
        properties: StreamProperties {
            icon_name: info.proplist.get_str(properties::APPLICATION_ICON_NAME),
            application_id: info.proplist.get_str(properties::APPLICATION_ID),
            application_name: info.proplist.get_str(properties::APPLICATION_NAME),
        },
        volume: volume::from_channel_volumes(&info.volume),
        has_volume: info.has_volume,
        volume_writable: info.volume_writable,
        sink: info.sink,
    }
}

/// Main sound server loop (runs on the dedicated thread).
fn run_pulse_loop(
    config: &ConnectionConfig,
    cmd_rx: &mpsc::Receiver<PulseCommand>,
    event_tx: &mpsc::Sender<PulseEvent>,
) -> Result<(), PulseError> {
    let mut mainloop =
        Mainloop::new().ok_or_else(|| PulseError::InitFailed("could not create mainloop".into()))?;

    let _ = event_tx.send(PulseEvent::Connecting);
    let mut session = match Session::connect(&mainloop, &config.client_name) {
        Ok(session) => Some(session),
        Err(e) if config.auto_reconnect => {
            warn!("{}", e);
            let _ = event_tx.send(PulseEvent::Failed(e.to_string()));
            None
        }
        Err(e) => return Err(e),
    };
    let mut reconnect_at = session
        .is_none()
        .then(|| Instant::now() + config.reconnect_delay());

    loop {
        // Drain commands from the UI
        loop {
            match cmd_rx.try_recv() {
                Ok(PulseCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    info!("Sound server thread shutting down");
                    return Ok(());
                }
                Ok(cmd) => match session.as_mut() {
                    Some(session) => session.handle_command(cmd, event_tx),
                    None => debug!("Dropping {:?}: no connection", cmd),
                },
                Err(TryRecvError::Empty) => break,
            }
        }

        match mainloop.iterate(false) {
            IterateResult::Quit(_) | IterateResult::Err(_) => {
                return Err(PulseError::ThreadError("mainloop iteration failed".into()));
            }
            IterateResult::Success(_) => {}
        }

        if let Some(active) = session.as_mut() {
            match active.poll_state() {
                Some(ConnectionState::Connecting) => {
                    let _ = event_tx.send(PulseEvent::Connecting);
                }
                Some(ConnectionState::Ready) => {
                    info!("Connected to sound server");
                    active.subscribe(event_tx);
                    let _ = event_tx.send(PulseEvent::Ready);
                }
                Some(ConnectionState::Failed) => {
                    let reason = format!("{:?}", active.context.errno());
                    warn!("Sound server connection failed: {}", reason);
                    let _ = event_tx.send(PulseEvent::Failed(reason));
                    if config.auto_reconnect {
                        session = None;
                        reconnect_at = Some(Instant::now() + config.reconnect_delay());
                    }
                }
                Some(ConnectionState::Disconnected) | None => {}
            }
        }

        if let Some(at) = reconnect_at {
            if Instant::now() >= at {
                reconnect_at = None;
                info!("Reconnecting to sound server");
                let _ = event_tx.send(PulseEvent::Connecting);
                match Session::connect(&mainloop, &config.client_name) {
                    Ok(fresh) => session = Some(fresh),
                    Err(e) => {
                        warn!("{}", e);
                        let _ = event_tx.send(PulseEvent::Failed(e.to_string()));
                        reconnect_at = Some(Instant::now() + config.reconnect_delay());
                    }
                }
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}
