//! Error types shared by the panel, the vehicle handles and the registry.

use thiserror::Error;

use crate::vehicle::VehicleId;

/// Conditions the control panel reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("mode selector index {0} does not map to a vehicle mode")]
    InvalidModeSelection(usize),

    #[error("no vehicle is bound to the control panel")]
    NoBoundVehicle,
}

/// Failure reported by a vehicle handle when it cannot accept a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("vehicle is powered off")]
    PoweredOff,

    #[error("command rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no vehicle with id {0} is registered")]
    UnknownVehicle(VehicleId),

    #[error("a vehicle with id {0} is already registered")]
    DuplicateVehicle(VehicleId),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
