pub mod connection;
pub mod mode_control;
pub mod logs;

pub use connection::render_connection_panel;
pub use mode_control::render_mode_control_section;
pub use logs::render_logs_section;
