//! Aggregate session progress
//!
//! The only state that outlives a frame: capture counts per temper, elapsed
//! time, and score, wrapped in a versioned JSON envelope for the host's
//! persistence collaborator. Per-frame entity/cursor/lasso state is never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::sim::Temper;

/// Envelope format version
const SAVE_VERSION: u32 = 1;

/// Capture counts, elapsed time, and score for one play session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionProgress {
    /// Captures per temper, indexed by [`Temper::index`]
    pub captures: [u32; 4],
    pub elapsed_secs: f64,
    pub score: u64,
}

/// Versioned envelope around the persisted progress
#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    version: u32,
    progress: SessionProgress,
}

impl SessionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful capture of `count` entities of one temper
    pub fn record_capture(&mut self, temper: Temper, count: u32) {
        self.captures[temper.index()] += count;
        // Bigger hauls score superlinearly
        self.score += (count as u64) * 10 + (count.saturating_sub(1) as u64) * 5;
    }

    pub fn total_captures(&self) -> u32 {
        self.captures.iter().sum()
    }

    /// Serialize into the versioned envelope
    pub fn to_json(&self) -> String {
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            progress: self.clone(),
        };
        // Serialization of plain numbers cannot fail
        serde_json::to_string(&envelope).unwrap_or_default()
    }

    /// Restore from a saved envelope. Corrupt or mismatched input falls back
    /// to a fresh session rather than erroring.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<SaveEnvelope>(json) {
            Ok(envelope) if envelope.version == SAVE_VERSION => {
                log::info!(
                    "restored session progress ({} captures)",
                    envelope.progress.total_captures()
                );
                envelope.progress
            }
            Ok(envelope) => {
                log::warn!("unsupported save version {}, starting fresh", envelope.version);
                Self::new()
            }
            Err(err) => {
                log::warn!("corrupt session save ({err}), starting fresh");
                Self::new()
            }
        }
    }
}
