//! zsnap: interactive terminal browser for ZFS snapshots.
//!
//! The pure core (`model`, `parser`, `state`) holds no I/O. `zfs`,
//! `registry` and `inventory` talk to the outside world, `executor` and
//! `session` drive them from key events, and `view` owns the terminal.

pub mod config;
pub mod executor;
pub mod inventory;
pub mod logging;
pub mod model;
pub mod parser;
pub mod registry;
pub mod session;
pub mod state;
pub mod view;
pub mod zfs;

#[cfg(test)]
mod test_support;
