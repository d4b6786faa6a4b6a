pub mod roster;
pub mod settings;
