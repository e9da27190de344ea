use crate::protocol::tenths_to_degrees;
use crate::types::{CapabilityState, FanSpeed, RawStatus, WorkingMode};

/// Map a wire snapshot onto the hub's capability model. Total over all
/// integer inputs: unknown mode/fan codes fall back to their defaults
/// and missing fields already defaulted during deserialization, so
/// decoding has no failure path.
pub fn decode(raw: &RawStatus) -> CapabilityState {
    CapabilityState {
        power: raw.ps == 1,
        scheduling: raw.cm == 1,
        target_temperature: tenths_to_degrees(raw.sp),
        current_temperature: tenths_to_degrees(raw.ta),
        water_temperature: tenths_to_degrees(raw.tw),
        mode: WorkingMode::from_code(raw.wm),
        fan_speed: FanSpeed::from_code(raw.fan),
        alarms: raw.a.clone(),
    }
}
