pub mod blueprint;
pub mod configuration;
