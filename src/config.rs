// Window
pub const WINDOW_TITLE: &str = "Vehicle Mode Control";

// Mode selector layout, indices are shared with the mode indicator widgets
pub const SELECT_PROMPT_INDEX: usize = 0;
pub const SELECT_PROMPT_LABEL: &str = "Select..";

pub const CONTROL_MODE_LOCKED_INDEX: usize = 2;
pub const CONTROL_MODE_MANUAL_INDEX: usize = 3;
pub const CONTROL_MODE_GUIDED_INDEX: usize = 4;
pub const CONTROL_MODE_AUTO_INDEX: usize = 5;
pub const CONTROL_MODE_TEST1_INDEX: usize = 6;

pub const CONTROL_MODE_LOCKED: &str = "MODE LOCKED";
pub const CONTROL_MODE_MANUAL: &str = "MODE MANUAL";
pub const CONTROL_MODE_GUIDED: &str = "MODE GUIDED";
pub const CONTROL_MODE_AUTO: &str = "MODE AUTO";
pub const CONTROL_MODE_TEST1: &str = "MODE TEST1";

// Engine toggle labels
pub const ENGINE_ACTIVATE_LABEL: &str = "Activate Engine";
pub const ENGINE_STOP_LABEL: &str = "Stop Engine";

// Status line
pub const NO_VEHICLE_STATUS: &str = "No vehicle connected";

// Action log limits
pub const MAX_LOG_MESSAGES: usize = 100;

// Vehicles spawned when no settings file exists
pub const DEFAULT_SIMULATED_VEHICLES: [&str; 2] = ["SIM-1", "SIM-2"];
