//! Backend instance bridge.
//!
//! The canvas mirrors block lifecycle events to an external backend
//! that keeps a live object per block. The bridge is best-effort: a
//! failure is logged by the caller and never blocks or rolls back the
//! canvas action.

use log::warn;
use thiserror::Error;

/// Errors reported by a bridge implementation.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend rejected '{id}': {reason}")]
    Rejected { id: String, reason: String },
}

/// Mirror of block lifecycle events toward a backend.
pub trait InstanceBridge {
    /// A block was created with the given id and type.
    fn create_instance(&mut self, id: &str, block_type: &str) -> Result<(), BridgeError>;

    /// A block was deleted.
    fn delete_instance(&mut self, id: &str) -> Result<(), BridgeError>;

    /// A block was renamed.
    fn update_block_id(&mut self, old: &str, new: &str) -> Result<(), BridgeError>;
}

/// Bridge that accepts everything and talks to nothing. Used when no
/// backend is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBridge;

impl InstanceBridge for NullBridge {
    fn create_instance(&mut self, _id: &str, _block_type: &str) -> Result<(), BridgeError> {
        Ok(())
    }

    fn delete_instance(&mut self, _id: &str) -> Result<(), BridgeError> {
        Ok(())
    }

    fn update_block_id(&mut self, _old: &str, _new: &str) -> Result<(), BridgeError> {
        Ok(())
    }
}

/// Run a bridge call, demoting a failure to a warning. The canvas
/// action has already committed by the time the bridge hears of it.
pub fn notify(result: Result<(), BridgeError>) {
    if let Err(err) = result {
        warn!("instance bridge failure: {err}");
    }
}
