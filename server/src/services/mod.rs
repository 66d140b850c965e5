//! Domain services shared by the HTTP handlers.

pub mod clock;
pub mod gallery;
pub mod rotation;
