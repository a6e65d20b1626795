// vmouse - virtual mouse with a write-only button control socket
// Control endpoint, command dispatch and configuration

pub mod client;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod server;

pub use client::{send_commands, send_raw, ClientError};
pub use config::{AccessPolicy, ConfigError, DeviceConfig, VmouseConfig};
pub use control::{ControlSurface, WriteFault};
pub use dispatch::{button_for, dispatch, DispatchReport};
pub use server::{start, ControlEndpoint, Server, StartupError, WriteBuf};

pub use vmouse_device as device;
pub use vmouse_protocol as protocol;
