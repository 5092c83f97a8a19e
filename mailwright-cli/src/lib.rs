//! Terminal front-end for mailwright
//!
//! The binary is a thin `clap` shell; the commands and the stage menu live
//! here so they can be exercised without a terminal.

pub mod commands;
pub mod menu;
