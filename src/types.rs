use std::fmt;

use serde::Deserialize;

/// One registered appliance: hub-assigned `id` (opaque, stable across
/// renames) plus its current network address. Only `ip` may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub id: String,
    pub ip: String,
}

impl DeviceIdentity {
    pub fn new(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
        }
    }
}

/// Wire-level status snapshot (`RESULT` object of `/api/v/1/status`).
/// Every field defaults when absent so decoding never fails on a sparse
/// payload; diagnostic counters the unit also reports are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStatus {
    /// Setpoint in tenths of a degree.
    #[serde(default)]
    pub sp: i32,
    /// Working-mode code (3 heating, 5 cooling).
    #[serde(default)]
    pub wm: i32,
    /// Fan-function code (1 auto, 2 night, 3 min, 4 max).
    #[serde(default, rename = "fn")]
    pub fan: i32,
    /// Ambient temperature in tenths of a degree.
    #[serde(default)]
    pub ta: i32,
    /// Water temperature in tenths of a degree.
    #[serde(default)]
    pub tw: i32,
    /// Power flag (0/1).
    #[serde(default)]
    pub ps: i32,
    /// Scheduling-enabled flag (0/1).
    #[serde(default)]
    pub cm: i32,
    /// Active alarm/error codes.
    #[serde(default)]
    pub a: Vec<String>,
}

/// One successful status call: the appliance-reported unique id plus
/// the raw snapshot. The `uid` keys manual pairing candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub uid: String,
    pub raw: RawStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingMode {
    Heat,
    Cool,
}

impl WorkingMode {
    /// Wire decode: 5 is cooling, every other code reports heating.
    /// Policy, not error detection: an unrecognized code stays silent.
    pub fn from_code(code: i32) -> Self {
        if code == 5 {
            WorkingMode::Cool
        } else {
            WorkingMode::Heat
        }
    }

    pub fn as_code(&self) -> i32 {
        match self {
            WorkingMode::Heat => 3,
            WorkingMode::Cool => 5,
        }
    }

    /// Hub-facing value for the `fancoil_mode` capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkingMode::Heat => "heat",
            WorkingMode::Cool => "cool",
        }
    }
}

impl fmt::Display for WorkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanSpeed {
    Auto,
    Night,
    Min,
    Max,
}

impl FanSpeed {
    /// Wire decode: unrecognized codes fall back to auto.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => FanSpeed::Night,
            3 => FanSpeed::Min,
            4 => FanSpeed::Max,
            _ => FanSpeed::Auto,
        }
    }

    pub fn as_code(&self) -> i32 {
        match self {
            FanSpeed::Auto => 1,
            FanSpeed::Night => 2,
            FanSpeed::Min => 3,
            FanSpeed::Max => 4,
        }
    }

    /// Route segment of `set/function/{speed}` and the hub-facing
    /// value for the `fan_speed` capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Auto => "auto",
            FanSpeed::Night => "night",
            FanSpeed::Min => "min",
            FanSpeed::Max => "max",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hub-facing mirror of one appliance, overwritten wholesale on every
/// successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityState {
    pub power: bool,
    pub scheduling: bool,
    /// Target temperature in °C, one decimal.
    pub target_temperature: f64,
    /// Ambient temperature in °C.
    pub current_temperature: f64,
    /// Water temperature in °C.
    pub water_temperature: f64,
    pub mode: WorkingMode,
    pub fan_speed: FanSpeed,
    /// Active alarm messages, empty when the unit reports none.
    pub alarms: Vec<String>,
}

impl CapabilityState {
    pub fn alarm_active(&self) -> bool {
        !self.alarms.is_empty()
    }

    /// Display label for the alarm capability, pluralized on count.
    /// `None` while no alarm is active.
    pub fn alarm_label(&self) -> Option<String> {
        if self.alarms.is_empty() {
            return None;
        }
        let plural = if self.alarms.len() > 1 { "s" } else { "" };
        Some(format!(
            "Current error message{plural}: {}",
            self.alarms.join(", ")
        ))
    }
}

/// One capability write pushed to the hub registry after a poll or an
/// accepted command. Mirror capabilities fan out hub-side: `Mode`
/// feeds `fancoil_mode` and `fancoil_mode_state`, `FanSpeed` feeds
/// `fan_speed` and `fan_speed_state`, `TargetTemperature` feeds
/// `target_temperature` and `measure_temperature.target`,
/// `CurrentTemperature` feeds `measure_temperature` and
/// `measure_temperature.current`, `WaterTemperature` feeds
/// `measure_temperature.water`, `Alarm` feeds `alarm_generic` plus its
/// dynamic display label.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityUpdate {
    Power(bool),
    Scheduling(bool),
    TargetTemperature(f64),
    CurrentTemperature(f64),
    WaterTemperature(f64),
    Mode(WorkingMode),
    FanSpeed(FanSpeed),
    Alarm { active: bool, label: Option<String> },
}

/// A candidate record handed over by the hub's discovery layer.
/// Reachability was already validated there, so staging one needs no
/// verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub id: String,
    pub address: String,
    pub name: Option<String>,
}

/// Availability transitions delivered by the hub's discovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverySignal {
    Connected,
    Disconnected,
    AddressChanged(String),
}
