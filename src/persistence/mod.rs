//! Mid-shift save/load
//!
//! Features:
//! - Versioned JSON envelope
//! - Only plain data is stored: snapshot, wallet and ticket rail
//! - Particles are never saved; they respawn from the restored contents

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{OrderQueue, SimulationSession, SimulationSnapshot, Wallet};

/// Current envelope format
pub const SAVE_VERSION: u32 = 1;

/// Errors raised while reading or writing a save
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Everything needed to resume a shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Cooking ticks run when the save was taken
    pub saved_at_ticks: u64,
    pub snapshot: SimulationSnapshot,
    pub wallet: Wallet,
    pub orders: OrderQueue,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl SaveEnvelope {
    pub fn capture(session: &SimulationSession) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at_ticks: session.ticks(),
            snapshot: session.snapshot().clone(),
            wallet: session.wallet().clone(),
            orders: session.orders().clone(),
        }
    }

    /// Load the envelope into a running session
    pub fn restore(self, session: &mut SimulationSession) {
        log::info!("Restoring shift at tick {}", self.saved_at_ticks);
        session.restore(self.snapshot, self.wallet, self.orders, self.saved_at_ticks);
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: probe.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Shift saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SaveError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
