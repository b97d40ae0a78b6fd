use std::sync::{Mutex, MutexGuard};

use crate::error::CommandError;
use crate::vehicle::{
    Subscribers, Subscription, SubscriptionId, VehicleEvent, VehicleHandle, VehicleId,
    VehicleMode, VehicleStatus,
};

struct SimState {
    mode: VehicleMode,
    status: VehicleStatus,
    airborne: bool,
    subscribers: Subscribers<VehicleEvent>,
}

/// In-process vehicle that acknowledges commands the way a flight stack
/// would, by publishing mode and status notifications.
///
/// Motors can only be enabled outside of Locked mode and launch requires
/// running motors. After `shutdown` every command fails with
/// [`CommandError::PoweredOff`].
pub struct SimulatedVehicle {
    id: VehicleId,
    name: String,
    state: Mutex<SimState>,
}

impl SimulatedVehicle {
    pub fn new(id: VehicleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: Mutex::new(SimState {
                mode: VehicleMode::Locked,
                status: VehicleStatus::Standby,
                airborne: false,
                subscribers: Subscribers::default(),
            }),
        }
    }

    pub fn mode(&self) -> VehicleMode {
        self.lock().mode
    }

    pub fn status(&self) -> VehicleStatus {
        self.lock().status
    }

    pub fn is_airborne(&self) -> bool {
        self.lock().airborne
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    // A poisoned lock only means a subscriber panicked mid-publish; the
    // state itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn powered(&self) -> Result<MutexGuard<'_, SimState>, CommandError> {
        let state = self.lock();
        if state.status == VehicleStatus::PowerOff {
            return Err(CommandError::PoweredOff);
        }
        Ok(state)
    }

    fn set_status(&self, state: &mut SimState, status: VehicleStatus) {
        if state.status != status {
            state.status = status;
            tracing::debug!(vehicle = %self.name, status = status.code(), "sim status");
            state.subscribers.publish(VehicleEvent::StatusChanged(status));
        }
    }
}

impl VehicleHandle for SimulatedVehicle {
    fn id(&self) -> VehicleId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_mode(&self, mode: VehicleMode) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        state.mode = mode;
        if mode == VehicleMode::Locked {
            state.airborne = false;
            self.set_status(&mut state, VehicleStatus::Standby);
        }
        state.subscribers.publish(VehicleEvent::ModeChanged {
            vehicle_id: self.id,
            mode_name: mode.name().to_string(),
            description: mode.description().to_string(),
        });
        Ok(())
    }

    fn enable_motors(&self) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        if state.mode == VehicleMode::Locked {
            return Err(CommandError::Rejected(
                "motors cannot be enabled in locked mode".to_string(),
            ));
        }
        self.set_status(&mut state, VehicleStatus::Active);
        Ok(())
    }

    fn disable_motors(&self) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        state.airborne = false;
        self.set_status(&mut state, VehicleStatus::Standby);
        Ok(())
    }

    fn launch(&self) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        if state.status != VehicleStatus::Active {
            return Err(CommandError::Rejected("motors are not running".to_string()));
        }
        state.airborne = true;
        Ok(())
    }

    fn home(&self) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        state.airborne = false;
        Ok(())
    }

    fn shutdown(&self) -> Result<(), CommandError> {
        let mut state = self.powered()?;
        state.airborne = false;
        self.set_status(&mut state, VehicleStatus::PowerOff);
        Ok(())
    }

    fn subscribe(&self) -> Subscription<VehicleEvent> {
        let mut state = self.lock();
        let current = VehicleEvent::StatusChanged(state.status);
        state.subscribers.subscribe_with(current)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.unsubscribe(id);
    }
}
