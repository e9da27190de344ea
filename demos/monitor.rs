use std::env;
use std::time::Duration;

use innova_fancoil::{CapabilityUpdate, DeviceIdentity, SessionBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let ip = args.get(1).expect("usage: monitor <ip> [interval-secs]");
    let interval = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(300u64);

    let (session, _handle) = SessionBuilder::new(DeviceIdentity::new("monitor", ip.clone()))
        .poll_interval(Duration::from_secs(interval))
        .on_update(|update| match update {
            CapabilityUpdate::CurrentTemperature(temp) => {
                println!("ambient: {temp:.1}\u{00b0}C");
            }
            CapabilityUpdate::WaterTemperature(temp) => {
                println!("water:   {temp:.1}\u{00b0}C");
            }
            CapabilityUpdate::Alarm { active: true, label: Some(label) } => {
                println!("ALARM: {label}");
            }
            other => println!("{other:?}"),
        })
        .on_availability(|available| {
            println!("available: {available}");
        })
        .build();

    println!("Polling {ip} every {interval}s...");
    session.run().await;
}
