use serde::Deserialize;
use serde_json::{Value, json};

use crate::types::{FanSpeed, RawStatus, StatusSnapshot, WorkingMode};
use crate::{Error, Result};

/// Version prefix shared by every appliance endpoint.
pub const API_PATH: &str = "api/v/1";

pub(crate) const MOCK_UID: &str = "INNOVA-MOCK";

/// Fixed-point tenths on the wire to decimal degrees.
pub fn tenths_to_degrees(tenths: i32) -> f64 {
    f64::from(tenths) / 10.0
}

/// Decimal degrees back to wire tenths (setpoint commands).
pub fn degrees_to_tenths(degrees: f64) -> i32 {
    (degrees * 10.0).round() as i32
}

/// An outbound appliance command: one POST route plus optional body.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Power(bool),
    Scheduling(bool),
    Mode(WorkingMode),
    /// Target temperature in °C.
    Setpoint(f64),
    Fan(FanSpeed),
}

impl Command {
    /// Route below [`API_PATH`].
    pub fn route(&self) -> String {
        match self {
            Command::Power(true) => "power/on".to_string(),
            Command::Power(false) => "power/off".to_string(),
            Command::Scheduling(true) => "set/calendar/on".to_string(),
            Command::Scheduling(false) => "set/calendar/off".to_string(),
            Command::Mode(WorkingMode::Cool) => "set/mode/cooling".to_string(),
            Command::Mode(WorkingMode::Heat) => "set/mode/heating".to_string(),
            Command::Setpoint(_) => "set/setpoint".to_string(),
            Command::Fan(speed) => format!("set/function/{speed}"),
        }
    }

    /// JSON body, where the route takes one.
    pub fn body(&self) -> Option<Value> {
        match self {
            Command::Setpoint(temp) => Some(json!({ "temp": degrees_to_tenths(*temp) })),
            Command::Fan(_) => Some(json!({ "value": 1 })),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "UID")]
    uid: String,
    #[serde(rename = "RESULT")]
    result: Option<RawStatus>,
}

#[derive(Deserialize)]
struct CommandReply {
    #[serde(default)]
    success: bool,
}

/// Parse a `/status` body. A refused call (`success: false`) and a
/// body without `RESULT` are both errors; a sparse `RESULT` is not.
pub fn parse_status_response(body: &str) -> Result<StatusSnapshot> {
    let parsed: StatusResponse =
        serde_json::from_str(body).map_err(|e| Error::Payload(e.to_string()))?;
    if !parsed.success {
        return Err(Error::Rejected {
            action: "status".to_string(),
        });
    }
    let raw = parsed
        .result
        .ok_or_else(|| Error::Payload("status response without RESULT".to_string()))?;
    Ok(StatusSnapshot {
        uid: parsed.uid,
        raw,
    })
}

/// Parse a command acknowledgement into the command's result.
pub fn parse_command_reply(body: &str, action: &str) -> Result<()> {
    let parsed: CommandReply =
        serde_json::from_str(body).map_err(|e| Error::Payload(e.to_string()))?;
    if !parsed.success {
        return Err(Error::Rejected {
            action: action.to_string(),
        });
    }
    Ok(())
}

/// Canned snapshot served in mock mode: unit on, heating, fan auto,
/// setpoint 22.0 °C, ambient 21.0 °C, water 28.0 °C, no alarms.
pub(crate) fn mock_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        uid: MOCK_UID.to_string(),
        raw: RawStatus {
            sp: 220,
            wm: 3,
            fan: 1,
            ta: 210,
            tw: 280,
            ps: 1,
            cm: 0,
            a: Vec::new(),
        },
    }
}
