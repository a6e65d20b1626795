//! Virtual device error types

use thiserror::Error;

/// Errors from virtual device operations
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The input subsystem refused to allocate or register the device
    #[error("Failed to register virtual device: {0}")]
    Registration(#[source] std::io::Error),

    /// Device is not registered (never was, or already torn down)
    #[error("Device not ready")]
    NotReady,

    #[error("Device already registered")]
    AlreadyRegistered,

    /// Writing an event frame to the input subsystem failed
    #[error("Failed to emit event: {0}")]
    Emit(#[source] std::io::Error),
}
