//! Pairing flow: stage verified candidates from discovery results or
//! manual IP entry, deduplicated against already-registered devices.
//!
//! Manual dedup compares the entered IP against registrations only;
//! the appliance uid is consulted just to key the new candidate. An
//! appliance whose address changed between two pairing attempts is
//! therefore not detected as a duplicate.

use tracing::{debug, info};

use crate::client::FancoilClient;
use crate::types::{DeviceIdentity, DiscoveryRecord};
use crate::{Error, Result};

/// Fallback display name for discovery results without one.
pub const DEFAULT_CANDIDATE_NAME: &str = "Fancoil";

type FoundCallback = Box<dyn Fn(&Candidate) + Send + Sync>;

/// A verified device the user may confirm. `id` is the discovery id
/// for automatic results and the appliance-reported uid for manual
/// entries; the hub persists it as the device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub ip: String,
}

/// Owns the transient candidate list of one pairing flow; discarded
/// once pairing completes or is cancelled.
pub struct PairingCoordinator {
    registered: Vec<DeviceIdentity>,
    staged: Vec<Candidate>,
    protocol: String,
    mock: bool,
    found_callbacks: Vec<FoundCallback>,
}

impl PairingCoordinator {
    pub fn new(registered: Vec<DeviceIdentity>) -> Self {
        Self {
            registered,
            staged: Vec::new(),
            protocol: "http".to_string(),
            mock: false,
            found_callbacks: Vec::new(),
        }
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    /// Explicit debug toggle: verification calls are answered with the
    /// canned payload instead of the network.
    pub fn mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Fired for every candidate that grows the staged list.
    pub fn on_found(mut self, f: impl Fn(&Candidate) + Send + Sync + 'static) -> Self {
        self.found_callbacks.push(Box::new(f));
        self
    }

    /// Stage automatic discovery results. The discovery layer already
    /// validated reachability, so no verification call is made; results
    /// registered or staged under the same id are skipped.
    pub fn stage_discovered(&mut self, results: &[DiscoveryRecord]) {
        for record in results {
            if self.registered.iter().any(|d| d.id == record.id) {
                debug!(id = %record.id, "discovery result already registered");
                continue;
            }
            if self.staged.iter().any(|c| c.id == record.id) {
                continue;
            }
            self.stage(Candidate {
                id: record.id.clone(),
                name: record
                    .name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string()),
                ip: record.address.clone(),
            });
        }
    }

    /// Verify a manually entered IP with one status call and stage the
    /// appliance under its self-reported uid. An IP matching a
    /// registered device is rejected; a verification failure
    /// propagates with its raw detail and stages nothing.
    pub async fn stage_manual(&mut self, name: &str, ip: &str) -> Result<()> {
        if self.registered.iter().any(|d| d.ip == ip) {
            return Err(Error::AlreadyAdded(ip.to_string()));
        }

        debug!(ip = %ip, "verifying manually entered device");
        let mut client = FancoilClient::builder(ip)
            .protocol(&self.protocol)
            .mock(self.mock)
            .build();
        let snapshot = client.status().await?;

        if self.staged.iter().any(|c| c.id == snapshot.uid) {
            debug!(uid = %snapshot.uid, "appliance already staged");
            return Ok(());
        }
        self.stage(Candidate {
            id: snapshot.uid,
            name: name.to_string(),
            ip: ip.to_string(),
        });
        Ok(())
    }

    fn stage(&mut self, candidate: Candidate) {
        info!(id = %candidate.id, ip = %candidate.ip, "staged pairing candidate");
        for cb in &self.found_callbacks {
            cb(&candidate);
        }
        self.staged.push(candidate);
    }

    /// The staged list, returned verbatim when the hub requests it.
    pub fn candidates(&self) -> &[Candidate] {
        &self.staged
    }

    /// Discard the transient list (pairing cancelled).
    pub fn clear(&mut self) {
        self.staged.clear();
    }
}
