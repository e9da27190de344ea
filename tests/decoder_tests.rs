use innova_fancoil::{
    CapabilityState, FanSpeed, RawStatus, WorkingMode, decode, degrees_to_tenths,
    tenths_to_degrees,
};

fn raw(sp: i32, wm: i32, fan: i32, ta: i32, tw: i32, ps: i32, cm: i32, a: &[&str]) -> RawStatus {
    RawStatus {
        sp,
        wm,
        fan,
        ta,
        tw,
        ps,
        cm,
        a: a.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn working_mode_table() {
    assert_eq!(WorkingMode::from_code(5), WorkingMode::Cool);
    for code in [3, 0, 1, 4, 6, 99, -1, i32::MIN, i32::MAX] {
        assert_eq!(WorkingMode::from_code(code), WorkingMode::Heat, "code {code}");
    }
}

#[test]
fn fan_speed_table() {
    assert_eq!(FanSpeed::from_code(2), FanSpeed::Night);
    assert_eq!(FanSpeed::from_code(3), FanSpeed::Min);
    assert_eq!(FanSpeed::from_code(4), FanSpeed::Max);
    for code in [1, 0, 5, 42, -7] {
        assert_eq!(FanSpeed::from_code(code), FanSpeed::Auto, "code {code}");
    }
}

#[test]
fn code_round_trips() {
    for mode in [WorkingMode::Heat, WorkingMode::Cool] {
        assert_eq!(WorkingMode::from_code(mode.as_code()), mode);
    }
    for speed in [FanSpeed::Auto, FanSpeed::Night, FanSpeed::Min, FanSpeed::Max] {
        assert_eq!(FanSpeed::from_code(speed.as_code()), speed);
    }
}

#[test]
fn temperature_round_trip() {
    for degrees in [15, 18, 21, 22, 30] {
        let wire = degrees * 10;
        assert_eq!(degrees_to_tenths(tenths_to_degrees(wire)), wire);
    }
    assert_eq!(degrees_to_tenths(21.5), 215);
    assert_eq!(tenths_to_degrees(215), 21.5);
}

#[test]
fn cooling_snapshot_scenario() {
    let state = decode(&raw(220, 5, 4, 205, 280, 1, 0, &[]));
    assert_eq!(
        state,
        CapabilityState {
            power: true,
            scheduling: false,
            target_temperature: 22.0,
            current_temperature: 20.5,
            water_temperature: 28.0,
            mode: WorkingMode::Cool,
            fan_speed: FanSpeed::Max,
            alarms: vec![],
        }
    );
    assert!(!state.alarm_active());
    assert_eq!(state.alarm_label(), None);
}

#[test]
fn single_alarm_label_is_singular() {
    let state = decode(&raw(220, 3, 1, 210, 280, 1, 0, &["E01"]));
    assert!(state.alarm_active());
    assert_eq!(
        state.alarm_label().unwrap(),
        "Current error message: E01"
    );
}

#[test]
fn multiple_alarms_label_is_plural_and_joined() {
    let state = decode(&raw(220, 3, 1, 210, 280, 1, 0, &["E01", "E02"]));
    assert!(state.alarm_active());
    let label = state.alarm_label().unwrap();
    assert_eq!(label, "Current error messages: E01, E02");
    assert!(label.contains("E01") && label.contains("E02"));
}

#[test]
fn decoding_twice_is_identical() {
    let snapshot = raw(195, 5, 2, 201, 299, 1, 1, &["E05"]);
    assert_eq!(decode(&snapshot), decode(&snapshot));
}

#[test]
fn sparse_wire_payload_decodes_to_defaults() {
    let raw: RawStatus = serde_json::from_str("{}").unwrap();
    let state = decode(&raw);
    assert!(!state.power);
    assert!(!state.scheduling);
    assert_eq!(state.mode, WorkingMode::Heat);
    assert_eq!(state.fan_speed, FanSpeed::Auto);
    assert_eq!(state.target_temperature, 0.0);
}

#[test]
fn unknown_wire_fields_are_ignored() {
    let body = r#"{"sp": 220, "wm": 3, "fn": 1, "ta": 210, "tw": 280, "ps": 1, "cm": 0,
        "a": [], "ns": 3, "heap": 11344, "uptime": 18432, "cloudStatus": 2}"#;
    let raw: RawStatus = serde_json::from_str(body).unwrap();
    assert_eq!(raw.sp, 220);
    assert_eq!(raw.fan, 1);
}
