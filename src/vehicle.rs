use std::sync::mpsc;

use crate::config::*;
use crate::error::CommandError;

pub type VehicleId = u32;
pub type SubscriptionId = u64;

/// Flight modes a vehicle can be commanded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleMode {
    Locked,
    Manual,
    Guided,
    Auto,
    Test1,
}

impl VehicleMode {
    /// Numeric mode id understood by the flight stack
    pub fn id(self) -> u8 {
        match self {
            VehicleMode::Locked => 1,
            VehicleMode::Manual => 2,
            VehicleMode::Guided => 3,
            VehicleMode::Auto => 4,
            VehicleMode::Test1 => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VehicleMode::Locked => "LOCKED",
            VehicleMode::Manual => "MANUAL",
            VehicleMode::Guided => "GUIDED",
            VehicleMode::Auto => "AUTO",
            VehicleMode::Test1 => "TEST1",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            VehicleMode::Locked => "Motors locked, vehicle safe to handle",
            VehicleMode::Manual => "Direct operator control",
            VehicleMode::Guided => "Flies to operator-supplied waypoints",
            VehicleMode::Auto => "Executes the onboard mission",
            VehicleMode::Test1 => "Vehicle specific test mode",
        }
    }

    /// Label shown for this mode in the mode selector
    pub fn selector_label(self) -> &'static str {
        match self {
            VehicleMode::Locked => CONTROL_MODE_LOCKED,
            VehicleMode::Manual => CONTROL_MODE_MANUAL,
            VehicleMode::Guided => CONTROL_MODE_GUIDED,
            VehicleMode::Auto => CONTROL_MODE_AUTO,
            VehicleMode::Test1 => CONTROL_MODE_TEST1,
        }
    }
}

/// Selector entries in display order. Index 1 is intentionally absent.
pub const MODE_CHOICES: [(usize, VehicleMode); 5] = [
    (CONTROL_MODE_LOCKED_INDEX, VehicleMode::Locked),
    (CONTROL_MODE_MANUAL_INDEX, VehicleMode::Manual),
    (CONTROL_MODE_GUIDED_INDEX, VehicleMode::Guided),
    (CONTROL_MODE_AUTO_INDEX, VehicleMode::Auto),
    (CONTROL_MODE_TEST1_INDEX, VehicleMode::Test1),
];

/// Maps a mode selector index to the mode it commands
pub fn mode_for_index(index: usize) -> Option<VehicleMode> {
    MODE_CHOICES
        .iter()
        .find(|(choice, _)| *choice == index)
        .map(|(_, mode)| *mode)
}

/// System state reported by a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Uninit,
    Boot,
    Calibrating,
    Standby,
    Active,
    Critical,
    Emergency,
    HilSim,
    PowerOff,
    Unknown(u8),
}

impl VehicleStatus {
    pub fn code(self) -> u8 {
        match self {
            VehicleStatus::Uninit => 0,
            VehicleStatus::Boot => 1,
            VehicleStatus::Calibrating => 2,
            VehicleStatus::Standby => 3,
            VehicleStatus::Active => 4,
            VehicleStatus::Critical => 5,
            VehicleStatus::Emergency => 6,
            VehicleStatus::HilSim => 7,
            VehicleStatus::PowerOff => 8,
            VehicleStatus::Unknown(code) => code,
        }
    }
}

/// Notifications published by a vehicle handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleEvent {
    ModeChanged {
        vehicle_id: VehicleId,
        mode_name: String,
        description: String,
    },
    StatusChanged(VehicleStatus),
}

/// Receiving end of a subscription. Dropping it ends the subscription on the
/// next publish.
pub struct Subscription<E> {
    pub id: SubscriptionId,
    pub events: mpsc::Receiver<E>,
}

/// Subscriber list kept by anything that publishes notifications
pub struct Subscribers<E> {
    next_id: SubscriptionId,
    senders: Vec<(SubscriptionId, mpsc::Sender<E>)>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            senders: Vec::new(),
        }
    }
}

impl<E: Clone> Subscribers<E> {
    pub fn subscribe(&mut self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.senders.push((id, tx));
        Subscription { id, events: rx }
    }

    /// Subscribes and queues `initial` as the first event the new
    /// subscriber sees
    pub fn subscribe_with(&mut self, initial: E) -> Subscription<E> {
        let subscription = self.subscribe();
        if let Some((_, tx)) = self.senders.last() {
            let _ = tx.send(initial);
        }
        subscription
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(sub_id, _)| *sub_id != id);
        self.senders.len() != before
    }

    pub fn publish(&mut self, event: E) {
        self.senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

/// Command and notification interface of one remote vehicle.
///
/// Commands are fire and forget: `Ok` means the handle accepted the command,
/// the vehicle's reaction arrives later as a [`VehicleEvent`].
pub trait VehicleHandle: Send + Sync {
    fn id(&self) -> VehicleId;
    fn name(&self) -> String;

    fn set_mode(&self, mode: VehicleMode) -> Result<(), CommandError>;
    fn enable_motors(&self) -> Result<(), CommandError>;
    fn disable_motors(&self) -> Result<(), CommandError>;
    fn launch(&self) -> Result<(), CommandError>;
    fn home(&self) -> Result<(), CommandError>;
    fn shutdown(&self) -> Result<(), CommandError>;

    /// Opens a notification stream. The first event on it is always a
    /// [`VehicleEvent::StatusChanged`] carrying the current status.
    fn subscribe(&self) -> Subscription<VehicleEvent>;
    fn unsubscribe(&self, id: SubscriptionId);
}
