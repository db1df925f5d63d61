//! Plugin lifecycle entities: descriptor rows, hook registrations,
//! settings, and diagnostic logs.

pub mod log;
pub mod model;
pub mod registration;
pub mod setting;
pub mod state;

pub use log::PluginLogEntry;
pub use model::PluginRecord;
pub use registration::{HookRegistrationRow, NewHookRegistration};
pub use setting::PluginSetting;
pub use state::PluginState;
