pub mod command;
pub mod multipass;
