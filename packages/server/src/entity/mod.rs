pub mod blueprint;
pub mod blueprint_configuration;
