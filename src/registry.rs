use bevy::prelude::Resource;
use std::sync::{Arc, Weak};

use crate::error::RegistryError;
use crate::vehicle::{Subscribers, Subscription, SubscriptionId, VehicleHandle, VehicleId};

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    ActiveVehicleChanged(Weak<dyn VehicleHandle>),
}

/// Owns every known vehicle handle and tracks the one the operator selected
#[derive(Resource, Default)]
pub struct VehicleRegistry {
    vehicles: Vec<Arc<dyn VehicleHandle>>,
    active: Option<VehicleId>,
    subscribers: Subscribers<RegistryEvent>,
}

impl VehicleRegistry {
    pub fn register(&mut self, handle: Arc<dyn VehicleHandle>) -> Result<(), RegistryError> {
        let id = handle.id();
        if self.get(id).is_some() {
            return Err(RegistryError::DuplicateVehicle(id));
        }
        tracing::info!(vehicle_id = id, name = %handle.name(), "vehicle registered");
        self.vehicles.push(handle);
        Ok(())
    }

    /// Drops the registry's handle. Panels holding a weak reference to it
    /// see the vehicle disappear.
    pub fn remove(&mut self, id: VehicleId) -> Option<Arc<dyn VehicleHandle>> {
        let index = self.vehicles.iter().position(|v| v.id() == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::info!(vehicle_id = id, "vehicle removed");
        Some(self.vehicles.remove(index))
    }

    pub fn get(&self, id: VehicleId) -> Option<&Arc<dyn VehicleHandle>> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Arc<dyn VehicleHandle>> {
        self.vehicles.iter()
    }

    pub fn active_id(&self) -> Option<VehicleId> {
        self.active
    }

    pub fn active(&self) -> Option<&Arc<dyn VehicleHandle>> {
        self.active.and_then(|id| self.get(id))
    }

    /// Marks a vehicle as active and notifies subscribers, even when it was
    /// already the active one.
    pub fn set_active(&mut self, id: VehicleId) -> Result<(), RegistryError> {
        let handle = self.get(id).ok_or(RegistryError::UnknownVehicle(id))?;
        let weak = Arc::downgrade(handle);
        self.active = Some(id);
        tracing::debug!(vehicle_id = id, "active vehicle changed");
        self.subscribers
            .publish(RegistryEvent::ActiveVehicleChanged(weak));
        Ok(())
    }

    pub fn subscribe(&mut self) -> Subscription<RegistryEvent> {
        self.subscribers.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
