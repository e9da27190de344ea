use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::FancoilClient;
use crate::logger::MessageLogMode;
use crate::protocol::Command;
use crate::status::decode;
use crate::types::{
    CapabilityState, CapabilityUpdate, DeviceIdentity, DiscoverySignal, FanSpeed, WorkingMode,
};
use crate::{Error, Result};

/// Default refresh cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300_000);

type UpdateCallback = Box<dyn Fn(&CapabilityUpdate) + Send + Sync>;
type AvailabilityCallback = Box<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Polling,
    Unavailable,
    Disposed,
}

enum SessionEvent {
    Tick,
    Signal(DiscoverySignal),
    Apply(Command, oneshot::Sender<Result<()>>),
    Query(oneshot::Sender<Option<CapabilityState>>),
    Renamed(String),
    Dispose,
}

pub struct SessionBuilder {
    identity: DeviceIdentity,
    name: String,
    protocol: String,
    poll_interval: Duration,
    mock: bool,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
    update_callbacks: Vec<UpdateCallback>,
    availability_callbacks: Vec<AvailabilityCallback>,
}

impl SessionBuilder {
    pub fn new(identity: DeviceIdentity) -> Self {
        let name = identity.id.clone();
        Self {
            identity,
            name,
            protocol: "http".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            mock: false,
            log_mode: None,
            log_path: None,
            update_callbacks: Vec::new(),
            availability_callbacks: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Explicit debug toggle; the session never inspects ambient
    /// process state.
    pub fn mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    /// Capability write-out, one call per field per successful poll.
    pub fn on_update(mut self, f: impl Fn(&CapabilityUpdate) + Send + Sync + 'static) -> Self {
        self.update_callbacks.push(Box::new(f));
        self
    }

    /// Availability transitions (set-available / set-unavailable).
    pub fn on_availability(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.availability_callbacks.push(Box::new(f));
        self
    }

    pub fn build(self) -> (DeviceSession, SessionHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut client = FancoilClient::builder(self.identity.ip.clone())
            .protocol(&self.protocol)
            .mock(self.mock);
        if let (Some(mode), Some(path)) = (self.log_mode, self.log_path) {
            client = client.message_log(mode, path);
        }

        let handle = SessionHandle {
            tx: events_tx.clone(),
        };
        let session = DeviceSession {
            client: client.build(),
            identity: self.identity,
            name: self.name,
            state: SessionState::Uninitialized,
            capabilities: None,
            poll_interval: self.poll_interval,
            timer: None,
            events_tx,
            events_rx,
            update_callbacks: self.update_callbacks,
            availability_callbacks: self.availability_callbacks,
        };
        (session, handle)
    }
}

/// One appliance's lifecycle: immediate fetch plus recurring timer
/// while polling, command dispatch, capability write-out, availability
/// from discovery signals. All mutable state is owned by the event
/// loop; everything external arrives as a message through the handle.
pub struct DeviceSession {
    client: FancoilClient,
    identity: DeviceIdentity,
    name: String,
    state: SessionState,
    capabilities: Option<CapabilityState>,
    poll_interval: Duration,
    timer: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    update_callbacks: Vec<UpdateCallback>,
    availability_callbacks: Vec<AvailabilityCallback>,
}

impl DeviceSession {
    pub fn builder(identity: DeviceIdentity) -> SessionBuilder {
        SessionBuilder::new(identity)
    }

    /// Drive the session until disposal. Consumes the session; the
    /// [`SessionHandle`] is the remaining surface.
    pub async fn run(mut self) {
        info!(device = %self.identity.id, name = %self.name, "device session initialized");
        self.enter_polling().await;

        while let Some(event) = self.events_rx.recv().await {
            match event {
                SessionEvent::Tick => self.refresh().await,
                SessionEvent::Signal(signal) => self.handle_signal(signal).await,
                SessionEvent::Apply(command, reply) => {
                    let result = self.apply(command).await;
                    let _ = reply.send(result);
                }
                SessionEvent::Query(reply) => {
                    let _ = reply.send(self.capabilities.clone());
                }
                SessionEvent::Renamed(name) => {
                    debug!(device = %self.identity.id, name = %name, "device renamed");
                    self.name = name;
                }
                SessionEvent::Dispose => break,
            }
        }

        self.dispose();
    }

    async fn enter_polling(&mut self) {
        self.state = SessionState::Polling;
        self.refresh().await;
        self.arm_timer();
    }

    /// Fetch, decode, overwrite wholesale, push every field. Transport
    /// failure, a refused call, or a malformed body keeps the
    /// last-known-good state until the next tick.
    async fn refresh(&mut self) {
        debug!(device = %self.identity.id, "refreshing status");
        match self.client.status().await {
            Ok(snapshot) => {
                let state = decode(&snapshot.raw);
                self.push_state(&state);
                self.capabilities = Some(state);
                if self.state == SessionState::Unavailable {
                    self.state = SessionState::Polling;
                    self.notify_availability(true);
                }
            }
            Err(err) => {
                warn!(
                    device = %self.identity.id,
                    error = %err,
                    "status fetch failed, keeping last known state"
                );
            }
        }
    }

    async fn handle_signal(&mut self, signal: DiscoverySignal) {
        match signal {
            DiscoverySignal::Connected => {
                debug!(device = %self.identity.id, "discovery reports device connected");
                self.notify_availability(true);
                self.enter_polling().await;
            }
            DiscoverySignal::Disconnected => {
                // Timer keeps running; the next successful fetch
                // restores availability.
                debug!(device = %self.identity.id, "discovery reports device disconnected");
                self.state = SessionState::Unavailable;
                self.notify_availability(false);
            }
            DiscoverySignal::AddressChanged(ip) => {
                debug!(device = %self.identity.id, ip = %ip, "device address changed");
                self.client.set_ip(&ip);
                self.identity.ip = ip;
            }
        }
    }

    /// Dispatch one user-initiated change. On acceptance the changed
    /// field is mirrored locally so the hub reflects it until the next
    /// poll reconciles; on any failure state is left untouched and the
    /// error surfaces to the caller.
    async fn apply(&mut self, command: Command) -> Result<()> {
        if self.state == SessionState::Disposed {
            return Err(Error::Disposed);
        }
        self.client.send(&command).await?;

        let update = match command {
            Command::Power(on) => {
                if let Some(caps) = &mut self.capabilities {
                    caps.power = on;
                }
                CapabilityUpdate::Power(on)
            }
            Command::Scheduling(on) => {
                if let Some(caps) = &mut self.capabilities {
                    caps.scheduling = on;
                }
                CapabilityUpdate::Scheduling(on)
            }
            Command::Mode(mode) => {
                if let Some(caps) = &mut self.capabilities {
                    caps.mode = mode;
                }
                CapabilityUpdate::Mode(mode)
            }
            Command::Setpoint(temp) => {
                if let Some(caps) = &mut self.capabilities {
                    caps.target_temperature = temp;
                }
                CapabilityUpdate::TargetTemperature(temp)
            }
            Command::Fan(speed) => {
                if let Some(caps) = &mut self.capabilities {
                    caps.fan_speed = speed;
                }
                CapabilityUpdate::FanSpeed(speed)
            }
        };
        self.notify_update(&update);
        Ok(())
    }

    /// Replace the recurring timer. Re-arming aborts the previous
    /// ticker first so at most one is live per session.
    fn arm_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let tx = self.events_tx.clone();
        let interval = self.poll_interval;
        self.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if tx.send(SessionEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.state = SessionState::Disposed;
        info!(device = %self.identity.id, "device session disposed");
    }

    fn push_state(&self, state: &CapabilityState) {
        self.notify_update(&CapabilityUpdate::Power(state.power));
        self.notify_update(&CapabilityUpdate::Scheduling(state.scheduling));
        self.notify_update(&CapabilityUpdate::TargetTemperature(state.target_temperature));
        self.notify_update(&CapabilityUpdate::CurrentTemperature(state.current_temperature));
        self.notify_update(&CapabilityUpdate::WaterTemperature(state.water_temperature));
        self.notify_update(&CapabilityUpdate::Mode(state.mode));
        self.notify_update(&CapabilityUpdate::FanSpeed(state.fan_speed));
        self.notify_update(&CapabilityUpdate::Alarm {
            active: state.alarm_active(),
            label: state.alarm_label(),
        });
    }

    fn notify_update(&self, update: &CapabilityUpdate) {
        for cb in &self.update_callbacks {
            cb(update);
        }
    }

    fn notify_availability(&self, available: bool) {
        for cb in &self.availability_callbacks {
            cb(available);
        }
    }
}

/// Cloneable hub-facing surface of a running session. Every method is
/// a message to the session's event loop; once the session is
/// disposed they return [`Error::Disposed`].
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Forward a discovery-layer transition.
    pub fn signal(&self, signal: DiscoverySignal) -> Result<()> {
        self.tx
            .send(SessionEvent::Signal(signal))
            .map_err(|_| Error::Disposed)
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.request(Command::Power(on)).await
    }

    pub async fn set_scheduling(&self, on: bool) -> Result<()> {
        self.request(Command::Scheduling(on)).await
    }

    pub async fn set_mode(&self, mode: WorkingMode) -> Result<()> {
        self.request(Command::Mode(mode)).await
    }

    pub async fn set_target_temperature(&self, temp: f64) -> Result<()> {
        self.request(Command::Setpoint(temp)).await
    }

    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<()> {
        self.request(Command::Fan(speed)).await
    }

    /// Last decoded capability state; `None` before the first
    /// successful fetch.
    pub async fn state(&self) -> Result<Option<CapabilityState>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionEvent::Query(reply_tx))
            .map_err(|_| Error::Disposed)?;
        reply_rx.await.map_err(|_| Error::Disposed)
    }

    /// Flow condition: "mode is X".
    pub async fn mode_is(&self, mode: WorkingMode) -> Result<bool> {
        Ok(self.state().await?.is_some_and(|s| s.mode == mode))
    }

    /// Flow condition: "fan speed is X".
    pub async fn fan_speed_is(&self, speed: FanSpeed) -> Result<bool> {
        Ok(self.state().await?.is_some_and(|s| s.fan_speed == speed))
    }

    pub fn rename(&self, name: impl Into<String>) -> Result<()> {
        self.tx
            .send(SessionEvent::Renamed(name.into()))
            .map_err(|_| Error::Disposed)
    }

    /// End the session: the timer is cleared and no further network
    /// activity happens. Safe to call more than once.
    pub fn dispose(&self) {
        let _ = self.tx.send(SessionEvent::Dispose);
    }

    async fn request(&self, command: Command) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionEvent::Apply(command, reply_tx))
            .map_err(|_| Error::Disposed)?;
        reply_rx.await.map_err(|_| Error::Disposed)?
    }
}
