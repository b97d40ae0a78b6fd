//! Mode control panel: the state behind the vehicle control widgets.
//!
//! The panel stages a flight mode selected by the operator, commits it to the
//! bound vehicle on request, and runs the engine toggle. Vehicle and registry
//! notifications arrive over subscriptions and are applied by
//! [`ModeControlPanel::process_events`] on the UI thread.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

use crate::action_log::ActionLog;
use crate::config::*;
use crate::error::{CommandError, PanelError};
use crate::registry::{RegistryEvent, VehicleRegistry};
use crate::vehicle::{
    Subscription, VehicleEvent, VehicleHandle, VehicleId, VehicleMode, VehicleStatus,
    mode_for_index,
};

/// What `bind` does when a different vehicle is already bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindPolicy {
    /// Stay on the first vehicle ever bound
    KeepFirst,
    /// Detach from the current vehicle and follow the newly active one
    #[default]
    FollowActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    AlreadyBound,
    Rejected,
    Rebound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Off,
    On,
}

impl EngineState {
    /// Text of the toggle control, which names the action it will perform
    pub fn toggle_label(self) -> &'static str {
        match self {
            EngineState::Off => ENGINE_ACTIVATE_LABEL,
            EngineState::On => ENGINE_STOP_LABEL,
        }
    }

    pub fn is_on(self) -> bool {
        self == EngineState::On
    }
}

/// Mode most recently reported by the bound vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedMode {
    pub name: String,
    pub description: String,
}

struct BoundVehicle {
    id: VehicleId,
    name: String,
    handle: Weak<dyn VehicleHandle>,
    subscription: Subscription<VehicleEvent>,
}

pub struct ModeControlPanel {
    bound: Option<BoundVehicle>,
    registry_events: Option<Subscription<RegistryEvent>>,
    policy: BindPolicy,
    staged_mode: Option<VehicleMode>,
    selector_index: usize,
    engine: EngineState,
    status_text: String,
    last_action: Option<String>,
    reported_mode: Option<ReportedMode>,
    log: ActionLog,
}

impl Default for ModeControlPanel {
    fn default() -> Self {
        Self::new(BindPolicy::default())
    }
}

impl ModeControlPanel {
    pub fn new(policy: BindPolicy) -> Self {
        Self {
            bound: None,
            registry_events: None,
            policy,
            staged_mode: None,
            selector_index: SELECT_PROMPT_INDEX,
            engine: EngineState::Off,
            status_text: NO_VEHICLE_STATUS.to_string(),
            last_action: None,
            reported_mode: None,
            log: ActionLog::new(),
        }
    }

    // ─── Binding ────────────────────────────────────────────────────

    /// Starts listening to the registry and binds its active vehicle, if any
    pub fn attach_registry(&mut self, registry: &mut VehicleRegistry) {
        if let Some(previous) = self.registry_events.take() {
            registry.unsubscribe(previous.id);
        }
        self.registry_events = Some(registry.subscribe());

        if let Some(active) = registry.active().cloned() {
            self.bind(&active);
        }
    }

    pub fn detach_registry(&mut self, registry: &mut VehicleRegistry) {
        if let Some(subscription) = self.registry_events.take() {
            registry.unsubscribe(subscription.id);
        }
    }

    pub fn bind(&mut self, handle: &Arc<dyn VehicleHandle>) -> BindOutcome {
        self.drop_stale_vehicle();

        let Some(bound_id) = self.bound.as_ref().map(|b| b.id) else {
            self.attach(handle);
            return BindOutcome::Bound;
        };

        if bound_id == handle.id() {
            return BindOutcome::AlreadyBound;
        }

        match self.policy {
            BindPolicy::KeepFirst => {
                tracing::debug!(
                    bound = bound_id,
                    requested = handle.id(),
                    "keeping first bound vehicle"
                );
                BindOutcome::Rejected
            }
            BindPolicy::FollowActive => {
                self.unbind();
                self.attach(handle);
                BindOutcome::Rebound
            }
        }
    }

    /// Detaches from the bound vehicle. Returns false when nothing was bound.
    pub fn unbind(&mut self) -> bool {
        let Some(bound) = self.bound.take() else {
            return false;
        };

        if let Some(handle) = bound.handle.upgrade() {
            handle.unsubscribe(bound.subscription.id);
        }
        tracing::info!(vehicle = %bound.name, "detached from vehicle");
        self.reset_vehicle_state();
        true
    }

    fn attach(&mut self, handle: &Arc<dyn VehicleHandle>) {
        let name = handle.name();
        let subscription = handle.subscribe();

        self.reset_vehicle_state();
        self.status_text = format!("Connected to {name}");
        tracing::info!(vehicle = %name, vehicle_id = handle.id(), "bound to vehicle");
        self.log.push(self.status_text.clone());

        self.bound = Some(BoundVehicle {
            id: handle.id(),
            name,
            handle: Arc::downgrade(handle),
            subscription,
        });
    }

    fn reset_vehicle_state(&mut self) {
        self.engine = EngineState::Off;
        self.reported_mode = None;
        self.status_text = NO_VEHICLE_STATUS.to_string();
    }

    /// Forgets a vehicle whose owner has dropped it
    fn drop_stale_vehicle(&mut self) {
        let stale = self
            .bound
            .as_ref()
            .is_some_and(|b| b.handle.strong_count() == 0);
        if stale && let Some(bound) = self.bound.take() {
            tracing::info!(vehicle = %bound.name, "bound vehicle went away");
            self.reset_vehicle_state();
        }
    }

    fn vehicle(&mut self) -> Result<Arc<dyn VehicleHandle>, PanelError> {
        self.drop_stale_vehicle();
        self.bound
            .as_ref()
            .and_then(|b| b.handle.upgrade())
            .ok_or(PanelError::NoBoundVehicle)
    }

    // ─── Mode selection ─────────────────────────────────────────────

    /// Stages the mode behind a selector index without commanding anything
    pub fn select_mode(&mut self, index: usize) -> Result<VehicleMode, PanelError> {
        match mode_for_index(index) {
            Some(mode) => {
                self.staged_mode = Some(mode);
                self.selector_index = index;
                tracing::debug!(mode = mode.name(), index, "mode staged");
                Ok(mode)
            }
            None => {
                self.staged_mode = None;
                self.selector_index = SELECT_PROMPT_INDEX;
                tracing::warn!(index, "mode selection not found");
                Err(PanelError::InvalidModeSelection(index))
            }
        }
    }

    /// Sends the staged mode to the bound vehicle. Nothing is sent, and
    /// `Ok(None)` returned, while the selection is unset.
    pub fn commit_mode(&mut self) -> Result<Option<VehicleMode>, PanelError> {
        let Some(mode) = self.staged_mode else {
            return Ok(None);
        };
        let vehicle = self.vehicle()?;
        let name = vehicle.name();

        let result = vehicle.set_mode(mode);
        self.report_command(&name, "set mode", result);
        self.record(format!("Set new mode for system {name}"));
        Ok(Some(mode))
    }

    // ─── Engine toggle ──────────────────────────────────────────────

    /// Arms or disarms the bound vehicle. The mode command always goes out
    /// before the motor command.
    pub fn toggle_engine(&mut self) -> Result<EngineState, PanelError> {
        let vehicle = self.vehicle()?;
        let name = vehicle.name();

        match self.engine {
            EngineState::Off => {
                let result = vehicle.set_mode(VehicleMode::Manual);
                self.report_command(&name, "set mode", result);
                let result = vehicle.enable_motors();
                self.report_command(&name, "enable motors", result);
                self.engine = EngineState::On;
                self.record(format!("Enabled motors on {name}"));
            }
            EngineState::On => {
                let result = vehicle.set_mode(VehicleMode::Locked);
                self.report_command(&name, "set mode", result);
                let result = vehicle.disable_motors();
                self.report_command(&name, "disable motors", result);
                self.engine = EngineState::Off;
                self.record(format!("Disabled motors on {name}"));
            }
        }
        Ok(self.engine)
    }

    // ─── Flight actions ─────────────────────────────────────────────

    pub fn launch(&mut self) -> Result<(), PanelError> {
        let vehicle = self.vehicle()?;
        let name = vehicle.name();
        let result = vehicle.launch();
        self.report_command(&name, "launch", result);
        self.record(format!("Launch requested for {name}"));
        Ok(())
    }

    pub fn land(&mut self) -> Result<(), PanelError> {
        let vehicle = self.vehicle()?;
        let name = vehicle.name();
        let result = vehicle.home();
        self.report_command(&name, "home", result);
        self.record(format!("Return home requested for {name}"));
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), PanelError> {
        let vehicle = self.vehicle()?;
        let name = vehicle.name();
        let result = vehicle.shutdown();
        self.report_command(&name, "shutdown", result);
        self.record(format!("Shutdown requested for {name}"));
        Ok(())
    }

    // ─── Notifications ──────────────────────────────────────────────

    /// Reconciles the engine state with what the vehicle reports. Returns
    /// the new state for Active and Standby, `None` for anything else.
    pub fn on_vehicle_status(&mut self, status: VehicleStatus) -> Option<EngineState> {
        let engine = match status {
            VehicleStatus::Active => EngineState::On,
            VehicleStatus::Standby => EngineState::Off,
            _ => return None,
        };
        self.engine = engine;
        Some(engine)
    }

    /// Mirrors the authoritative mode of the bound vehicle onto the status line
    pub fn on_vehicle_mode_changed(
        &mut self,
        vehicle_id: VehicleId,
        mode_name: &str,
        description: &str,
    ) -> bool {
        if self.bound.as_ref().map(|b| b.id) != Some(vehicle_id) {
            return false;
        }
        self.reported_mode = Some(ReportedMode {
            name: mode_name.to_string(),
            description: description.to_string(),
        });
        true
    }

    /// Applies pending registry and vehicle notifications, in that order.
    /// Returns how many notifications were handled.
    pub fn process_events(&mut self) -> usize {
        self.drop_stale_vehicle();
        let mut handled = 0;

        let registry_events: Vec<RegistryEvent> = self
            .registry_events
            .as_ref()
            .map(|s| s.events.try_iter().collect())
            .unwrap_or_default();
        for RegistryEvent::ActiveVehicleChanged(weak) in registry_events {
            if let Some(handle) = weak.upgrade() {
                self.bind(&handle);
            }
            handled += 1;
        }

        let vehicle_events: Vec<VehicleEvent> = self
            .bound
            .as_ref()
            .map(|b| b.subscription.events.try_iter().collect())
            .unwrap_or_default();
        for event in vehicle_events {
            match event {
                VehicleEvent::ModeChanged {
                    vehicle_id,
                    mode_name,
                    description,
                } => {
                    self.on_vehicle_mode_changed(vehicle_id, &mode_name, &description);
                }
                VehicleEvent::StatusChanged(status) => {
                    self.on_vehicle_status(status);
                }
            }
            handled += 1;
        }

        handled
    }

    // ─── Helpers ────────────────────────────────────────────────────

    fn record(&mut self, message: String) {
        tracing::info!("{message}");
        self.log.push(message.clone());
        self.last_action = Some(message);
    }

    fn report_command(&mut self, vehicle: &str, command: &str, result: Result<(), CommandError>) {
        if let Err(e) = result {
            tracing::warn!(vehicle, command, error = %e, "vehicle command failed");
            self.log
                .push(format!("Command '{command}' failed on {vehicle}: {e}"));
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn policy(&self) -> BindPolicy {
        self.policy
    }

    /// Switches the bind policy. Turning on FollowActive binds the vehicle
    /// the registry currently has active.
    pub fn apply_policy(
        &mut self,
        policy: BindPolicy,
        registry: &VehicleRegistry,
    ) -> Option<BindOutcome> {
        if self.policy == policy {
            return None;
        }
        self.policy = policy;
        tracing::info!(?policy, "bind policy changed");

        match policy {
            BindPolicy::FollowActive => registry.active().cloned().map(|active| self.bind(&active)),
            BindPolicy::KeepFirst => None,
        }
    }

    pub fn bound_vehicle_id(&self) -> Option<VehicleId> {
        self.bound.as_ref().map(|b| b.id)
    }

    pub fn is_bound(&self) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|b| b.handle.strong_count() > 0)
    }

    pub fn staged_mode(&self) -> Option<VehicleMode> {
        self.staged_mode
    }

    pub fn selector_index(&self) -> usize {
        self.selector_index
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine
    }

    pub fn toggle_label(&self) -> &'static str {
        self.engine.toggle_label()
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    pub fn reported_mode(&self) -> Option<&ReportedMode> {
        self.reported_mode.as_ref()
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ActionLog {
        &mut self.log
    }
}

impl Drop for ModeControlPanel {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedVehicle;
    use crate::vehicle::{Subscribers, SubscriptionId};
    use std::sync::Mutex;

    // ── Helpers ──────────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        SetMode(VehicleMode),
        EnableMotors,
        DisableMotors,
        Launch,
        Home,
        Shutdown,
        Subscribe,
        Unsubscribe,
    }

    type Journal = Arc<Mutex<Vec<(VehicleId, Call)>>>;

    struct RecordingVehicle {
        id: VehicleId,
        name: String,
        journal: Journal,
        status: VehicleStatus,
        subscribers: Mutex<Subscribers<VehicleEvent>>,
    }

    impl RecordingVehicle {
        fn new(id: VehicleId, name: &str) -> Arc<Self> {
            Self::with_journal(id, name, Journal::default())
        }

        fn with_journal(id: VehicleId, name: &str, journal: Journal) -> Arc<Self> {
            Arc::new(Self {
                id,
                name: name.to_string(),
                journal,
                status: VehicleStatus::Standby,
                subscribers: Mutex::new(Subscribers::default()),
            })
        }

        fn push(&self, call: Call) {
            self.journal.lock().unwrap().push((self.id, call));
        }

        fn calls(&self) -> Vec<Call> {
            self.journal
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| *id == self.id)
                .map(|(_, call)| call.clone())
                .collect()
        }

        /// Calls excluding subscription bookkeeping
        fn commands(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| !matches!(c, Call::Subscribe | Call::Unsubscribe))
                .collect()
        }

        fn emit(&self, event: VehicleEvent) {
            self.subscribers.lock().unwrap().publish(event);
        }

        fn subscriber_count(&self) -> usize {
            self.subscribers.lock().unwrap().len()
        }
    }

    impl VehicleHandle for RecordingVehicle {
        fn id(&self) -> VehicleId {
            self.id
        }

        fn name(&self) -> String {
            self.name.clone()
        }

        fn set_mode(&self, mode: VehicleMode) -> Result<(), CommandError> {
            self.push(Call::SetMode(mode));
            Ok(())
        }

        fn enable_motors(&self) -> Result<(), CommandError> {
            self.push(Call::EnableMotors);
            Ok(())
        }

        fn disable_motors(&self) -> Result<(), CommandError> {
            self.push(Call::DisableMotors);
            Ok(())
        }

        fn launch(&self) -> Result<(), CommandError> {
            self.push(Call::Launch);
            Ok(())
        }

        fn home(&self) -> Result<(), CommandError> {
            self.push(Call::Home);
            Ok(())
        }

        fn shutdown(&self) -> Result<(), CommandError> {
            self.push(Call::Shutdown);
            Ok(())
        }

        fn subscribe(&self) -> Subscription<VehicleEvent> {
            self.push(Call::Subscribe);
            self.subscribers
                .lock()
                .unwrap()
                .subscribe_with(VehicleEvent::StatusChanged(self.status))
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            self.push(Call::Unsubscribe);
            self.subscribers.lock().unwrap().unsubscribe(id);
        }
    }

    fn as_handle(vehicle: &Arc<RecordingVehicle>) -> Arc<dyn VehicleHandle> {
        vehicle.clone()
    }

    fn bound_panel(policy: BindPolicy) -> (ModeControlPanel, Arc<RecordingVehicle>) {
        let vehicle = RecordingVehicle::new(1, "MAV-1");
        let mut panel = ModeControlPanel::new(policy);
        assert_eq!(panel.bind(&as_handle(&vehicle)), BindOutcome::Bound);
        (panel, vehicle)
    }

    // ── Mode selection ───────────────────────────────────────────────

    #[test]
    fn committing_each_valid_index_sends_one_set_mode() {
        let expected = [
            (2, VehicleMode::Locked),
            (3, VehicleMode::Manual),
            (4, VehicleMode::Guided),
            (5, VehicleMode::Auto),
            (6, VehicleMode::Test1),
        ];
        for (index, mode) in expected {
            let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);

            assert_eq!(panel.select_mode(index), Ok(mode));
            assert_eq!(panel.selector_index(), index);
            assert!(vehicle.commands().is_empty(), "selection must not command");

            assert_eq!(panel.commit_mode(), Ok(Some(mode)));
            assert_eq!(vehicle.commands(), vec![Call::SetMode(mode)]);
            assert_eq!(panel.last_action(), Some("Set new mode for system MAV-1"));
        }
    }

    #[test]
    fn commit_without_vehicle_sends_nothing() {
        let mut panel = ModeControlPanel::default();
        panel.select_mode(3).unwrap();

        assert_eq!(panel.commit_mode(), Err(PanelError::NoBoundVehicle));
        assert_eq!(panel.staged_mode(), Some(VehicleMode::Manual));
        assert!(panel.log().is_empty());
    }

    #[test]
    fn invalid_indices_leave_selection_unset() {
        for index in [0, 1, 7, 42] {
            let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);

            assert_eq!(
                panel.select_mode(index),
                Err(PanelError::InvalidModeSelection(index))
            );
            assert_eq!(panel.staged_mode(), None);
            assert_eq!(panel.selector_index(), SELECT_PROMPT_INDEX);

            assert_eq!(panel.commit_mode(), Ok(None));
            assert!(vehicle.commands().is_empty());
        }
    }

    #[test]
    fn invalid_index_clears_a_previous_selection() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        panel.select_mode(5).unwrap();
        let _ = panel.select_mode(9);

        assert_eq!(panel.commit_mode(), Ok(None));
        assert!(vehicle.commands().is_empty());
    }

    // ── Engine toggle ────────────────────────────────────────────────

    #[test]
    fn toggle_from_off_sets_manual_before_enabling_motors() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        assert_eq!(panel.toggle_label(), "Activate Engine");

        assert_eq!(panel.toggle_engine(), Ok(EngineState::On));

        assert_eq!(
            vehicle.commands(),
            vec![Call::SetMode(VehicleMode::Manual), Call::EnableMotors]
        );
        assert_eq!(panel.toggle_label(), "Stop Engine");
        assert_eq!(panel.last_action(), Some("Enabled motors on MAV-1"));
    }

    #[test]
    fn toggle_from_on_sets_locked_before_disabling_motors() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        panel.toggle_engine().unwrap();

        assert_eq!(panel.toggle_engine(), Ok(EngineState::Off));

        assert_eq!(
            vehicle.commands()[2..],
            [Call::SetMode(VehicleMode::Locked), Call::DisableMotors]
        );
        assert_eq!(panel.toggle_label(), "Activate Engine");
        assert_eq!(panel.last_action(), Some("Disabled motors on MAV-1"));
    }

    #[test]
    fn toggle_without_vehicle_is_a_no_op() {
        let mut panel = ModeControlPanel::default();
        assert_eq!(panel.toggle_engine(), Err(PanelError::NoBoundVehicle));
        assert_eq!(panel.engine_state(), EngineState::Off);
        assert_eq!(panel.last_action(), None);
    }

    #[test]
    fn active_status_forces_engine_on() {
        let (mut panel, _vehicle) = bound_panel(BindPolicy::FollowActive);
        assert_eq!(
            panel.on_vehicle_status(VehicleStatus::Active),
            Some(EngineState::On)
        );
        assert_eq!(panel.toggle_label(), "Stop Engine");
    }

    #[test]
    fn standby_status_forces_engine_off() {
        let (mut panel, _vehicle) = bound_panel(BindPolicy::FollowActive);
        panel.toggle_engine().unwrap();

        assert_eq!(
            panel.on_vehicle_status(VehicleStatus::Standby),
            Some(EngineState::Off)
        );
        assert_eq!(panel.toggle_label(), "Activate Engine");
    }

    #[test]
    fn other_statuses_are_ignored() {
        let (mut panel, _vehicle) = bound_panel(BindPolicy::FollowActive);
        panel.toggle_engine().unwrap();

        for status in [
            VehicleStatus::Boot,
            VehicleStatus::Critical,
            VehicleStatus::PowerOff,
            VehicleStatus::Unknown(99),
        ] {
            assert_eq!(panel.on_vehicle_status(status), None);
        }
        assert_eq!(panel.engine_state(), EngineState::On);
    }

    #[test]
    fn status_notifications_reach_the_panel() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        assert_eq!(panel.process_events(), 1, "initial status on subscribe");

        vehicle.emit(VehicleEvent::StatusChanged(VehicleStatus::Active));
        assert_eq!(panel.process_events(), 1);

        assert_eq!(panel.engine_state(), EngineState::On);
    }

    // ── Mode mirror ──────────────────────────────────────────────────

    #[test]
    fn mode_notifications_update_the_reported_mode() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);

        vehicle.emit(VehicleEvent::ModeChanged {
            vehicle_id: 1,
            mode_name: "GUIDED".to_string(),
            description: "waypoints".to_string(),
        });
        panel.process_events();

        assert_eq!(
            panel.reported_mode(),
            Some(&ReportedMode {
                name: "GUIDED".to_string(),
                description: "waypoints".to_string(),
            })
        );
    }

    #[test]
    fn mode_notifications_for_other_vehicles_are_ignored() {
        let (mut panel, _vehicle) = bound_panel(BindPolicy::FollowActive);
        assert!(!panel.on_vehicle_mode_changed(2, "AUTO", "mission"));
        assert_eq!(panel.reported_mode(), None);
    }

    // ── Binding ──────────────────────────────────────────────────────

    #[test]
    fn bind_shows_connected_status() {
        let (panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        assert_eq!(panel.status_text(), "Connected to MAV-1");
        assert_eq!(panel.bound_vehicle_id(), Some(1));
        assert_eq!(vehicle.subscriber_count(), 1);
    }

    #[test]
    fn binding_the_same_vehicle_twice_is_idempotent() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);

        assert_eq!(panel.bind(&as_handle(&vehicle)), BindOutcome::AlreadyBound);
        assert_eq!(vehicle.subscriber_count(), 1);
    }

    #[test]
    fn keep_first_rejects_a_second_vehicle() {
        let (mut panel, first) = bound_panel(BindPolicy::KeepFirst);
        let second = RecordingVehicle::new(2, "MAV-2");

        assert_eq!(panel.bind(&as_handle(&second)), BindOutcome::Rejected);

        assert_eq!(panel.bound_vehicle_id(), Some(1));
        assert_eq!(first.subscriber_count(), 1);
        assert!(second.calls().is_empty());

        panel.toggle_engine().unwrap();
        assert!(second.commands().is_empty());
    }

    #[test]
    fn follow_active_detaches_before_attaching() {
        let journal = Journal::default();
        let first = RecordingVehicle::with_journal(1, "MAV-1", journal.clone());
        let second = RecordingVehicle::with_journal(2, "MAV-2", journal.clone());
        let mut panel = ModeControlPanel::new(BindPolicy::FollowActive);
        panel.bind(&as_handle(&first));
        panel.toggle_engine().unwrap();

        assert_eq!(panel.bind(&as_handle(&second)), BindOutcome::Rebound);

        let bookkeeping: Vec<_> = journal
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| matches!(c, Call::Subscribe | Call::Unsubscribe))
            .cloned()
            .collect();
        assert_eq!(
            bookkeeping,
            vec![(1, Call::Subscribe), (1, Call::Unsubscribe), (2, Call::Subscribe)]
        );
        assert_eq!(panel.engine_state(), EngineState::Off);
        assert_eq!(panel.status_text(), "Connected to MAV-2");
    }

    #[test]
    fn old_vehicle_events_stop_after_rebinding() {
        let (mut panel, first) = bound_panel(BindPolicy::FollowActive);
        let second = RecordingVehicle::new(2, "MAV-2");
        panel.bind(&as_handle(&second));

        first.emit(VehicleEvent::StatusChanged(VehicleStatus::Active));

        // Only MAV-2's initial Standby arrives
        assert_eq!(panel.process_events(), 1);
        assert_eq!(panel.engine_state(), EngineState::Off);
        assert_eq!(first.subscriber_count(), 0);
    }

    #[test]
    fn dropped_vehicle_counts_as_unbound() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        drop(vehicle);

        assert_eq!(panel.toggle_engine(), Err(PanelError::NoBoundVehicle));
        assert!(!panel.is_bound());
        assert_eq!(panel.status_text(), NO_VEHICLE_STATUS);
    }

    #[test]
    fn dropped_vehicle_disables_controls_before_any_command() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        drop(vehicle);

        assert!(!panel.is_bound());
        assert_eq!(panel.bound_vehicle_id(), Some(1));

        panel.process_events();
        assert_eq!(panel.bound_vehicle_id(), None);
        assert_eq!(panel.status_text(), NO_VEHICLE_STATUS);
    }

    #[test]
    fn dropping_the_panel_unsubscribes() {
        let (panel, vehicle) = bound_panel(BindPolicy::FollowActive);
        drop(panel);

        assert_eq!(vehicle.subscriber_count(), 0);
        assert_eq!(vehicle.calls().last(), Some(&Call::Unsubscribe));
    }

    // ── Flight actions ───────────────────────────────────────────────

    #[test]
    fn flight_actions_forward_to_the_vehicle() {
        let (mut panel, vehicle) = bound_panel(BindPolicy::FollowActive);

        panel.launch().unwrap();
        panel.land().unwrap();
        panel.shutdown().unwrap();

        assert_eq!(
            vehicle.commands(),
            vec![Call::Launch, Call::Home, Call::Shutdown]
        );
        assert_eq!(panel.last_action(), Some("Shutdown requested for MAV-1"));
    }

    #[test]
    fn flight_actions_need_a_vehicle() {
        let mut panel = ModeControlPanel::default();
        assert_eq!(panel.launch(), Err(PanelError::NoBoundVehicle));
        assert_eq!(panel.land(), Err(PanelError::NoBoundVehicle));
        assert_eq!(panel.shutdown(), Err(PanelError::NoBoundVehicle));
    }

    // ── With the registry and simulator ──────────────────────────────

    #[test]
    fn registry_selection_binds_the_active_vehicle() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(1, "SIM-1")))
            .unwrap();
        registry
            .register(Arc::new(SimulatedVehicle::new(2, "SIM-2")))
            .unwrap();
        let mut panel = ModeControlPanel::new(BindPolicy::FollowActive);
        panel.attach_registry(&mut registry);
        assert!(!panel.is_bound());

        registry.set_active(1).unwrap();
        panel.process_events();
        assert_eq!(panel.bound_vehicle_id(), Some(1));

        registry.set_active(2).unwrap();
        panel.process_events();
        assert_eq!(panel.bound_vehicle_id(), Some(2));
    }

    #[test]
    fn attach_registry_binds_an_already_active_vehicle() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(3, "SIM-3")))
            .unwrap();
        registry.set_active(3).unwrap();

        let mut panel = ModeControlPanel::new(BindPolicy::KeepFirst);
        panel.attach_registry(&mut registry);

        assert_eq!(panel.bound_vehicle_id(), Some(3));
    }

    #[test]
    fn detached_panel_stops_following_the_registry() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(1, "SIM-1")))
            .unwrap();
        let mut panel = ModeControlPanel::default();
        panel.attach_registry(&mut registry);

        panel.detach_registry(&mut registry);
        registry.set_active(1).unwrap();

        assert_eq!(panel.process_events(), 0);
        assert!(!panel.is_bound());
    }

    #[test]
    fn keep_first_ignores_later_registry_selections() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(1, "SIM-1")))
            .unwrap();
        registry
            .register(Arc::new(SimulatedVehicle::new(2, "SIM-2")))
            .unwrap();
        let mut panel = ModeControlPanel::new(BindPolicy::KeepFirst);
        panel.attach_registry(&mut registry);

        registry.set_active(1).unwrap();
        registry.set_active(2).unwrap();
        panel.process_events();

        assert_eq!(panel.bound_vehicle_id(), Some(1));
    }

    #[test]
    fn switching_back_restores_the_engine_state_of_a_running_vehicle() {
        let mut registry = VehicleRegistry::default();
        let first = Arc::new(SimulatedVehicle::new(1, "SIM-1"));
        registry.register(first.clone()).unwrap();
        registry
            .register(Arc::new(SimulatedVehicle::new(2, "SIM-2")))
            .unwrap();
        let mut panel = ModeControlPanel::new(BindPolicy::FollowActive);
        panel.attach_registry(&mut registry);

        registry.set_active(1).unwrap();
        panel.process_events();
        panel.toggle_engine().unwrap();
        panel.process_events();
        assert_eq!(first.status(), VehicleStatus::Active);

        registry.set_active(2).unwrap();
        panel.process_events();
        assert_eq!(panel.engine_state(), EngineState::Off);

        registry.set_active(1).unwrap();
        panel.process_events();
        assert_eq!(panel.bound_vehicle_id(), Some(1));
        assert_eq!(panel.engine_state(), EngineState::On);
        assert_eq!(panel.toggle_label(), "Stop Engine");
    }

    #[test]
    fn turning_on_follow_active_binds_the_current_selection() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(1, "SIM-1")))
            .unwrap();
        registry
            .register(Arc::new(SimulatedVehicle::new(2, "SIM-2")))
            .unwrap();
        registry.set_active(1).unwrap();
        let mut panel = ModeControlPanel::new(BindPolicy::KeepFirst);
        panel.attach_registry(&mut registry);

        registry.set_active(2).unwrap();
        panel.process_events();
        assert_eq!(panel.bound_vehicle_id(), Some(1));

        assert_eq!(
            panel.apply_policy(BindPolicy::FollowActive, &registry),
            Some(BindOutcome::Rebound)
        );
        assert_eq!(panel.bound_vehicle_id(), Some(2));
        assert_eq!(panel.policy(), BindPolicy::FollowActive);
    }

    #[test]
    fn reapplying_the_same_policy_changes_nothing() {
        let mut registry = VehicleRegistry::default();
        registry
            .register(Arc::new(SimulatedVehicle::new(1, "SIM-1")))
            .unwrap();
        let mut panel = ModeControlPanel::new(BindPolicy::FollowActive);

        assert_eq!(panel.apply_policy(BindPolicy::FollowActive, &registry), None);
        assert_eq!(panel.apply_policy(BindPolicy::KeepFirst, &registry), None);
        assert_eq!(panel.policy(), BindPolicy::KeepFirst);
        assert!(!panel.is_bound());
    }

    #[test]
    fn engine_toggle_round_trip_against_simulator() {
        let sim = Arc::new(SimulatedVehicle::new(1, "SIM-1"));
        let handle: Arc<dyn VehicleHandle> = sim.clone();
        let mut panel = ModeControlPanel::default();
        panel.bind(&handle);

        panel.toggle_engine().unwrap();
        panel.process_events();
        assert_eq!(sim.mode(), VehicleMode::Manual);
        assert_eq!(sim.status(), VehicleStatus::Active);
        assert_eq!(panel.engine_state(), EngineState::On);
        assert_eq!(panel.reported_mode().map(|m| m.name.as_str()), Some("MANUAL"));

        panel.toggle_engine().unwrap();
        panel.process_events();
        assert_eq!(sim.mode(), VehicleMode::Locked);
        assert_eq!(sim.status(), VehicleStatus::Standby);
        assert_eq!(panel.engine_state(), EngineState::Off);
    }

    #[test]
    fn command_failures_are_logged_not_rolled_back() {
        let sim = Arc::new(SimulatedVehicle::new(1, "SIM-1"));
        let handle: Arc<dyn VehicleHandle> = sim.clone();
        let mut panel = ModeControlPanel::default();
        panel.bind(&handle);
        sim.shutdown().unwrap();

        assert_eq!(panel.toggle_engine(), Ok(EngineState::On));

        let failures = panel
            .log()
            .iter()
            .filter(|entry| entry.message.contains("failed on SIM-1"))
            .count();
        assert_eq!(failures, 2);
    }
}
