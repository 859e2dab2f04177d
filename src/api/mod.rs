//! Wire-format helpers shared by services and handlers

pub mod format;
