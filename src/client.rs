//! Client side: send commands to a running endpoint

use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use thiserror::Error;
use vmouse_protocol::{encode, Command, ProtocolError, MAX_WRITE_LEN};

/// Errors from sending commands
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Cannot encode command: {0}")]
    Encode(#[from] ProtocolError),

    #[error("Payload of {len} bytes exceeds the {max}-byte limit")]
    TooLarge { len: usize, max: usize },

    #[error("Failed to send to {}: {source}", .path.display())]
    Send {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Send a raw payload as one write
pub fn send_raw(socket_path: &Path, payload: &[u8]) -> Result<usize, ClientError> {
    if payload.len() > MAX_WRITE_LEN {
        return Err(ClientError::TooLarge {
            len: payload.len(),
            max: MAX_WRITE_LEN,
        });
    }

    let send_err = |source: std::io::Error| ClientError::Send {
        path: socket_path.to_path_buf(),
        source,
    };
    let socket = UnixDatagram::unbound().map_err(send_err)?;
    socket.send_to(payload, socket_path).map_err(send_err)
}

/// Encode `commands` and send them as one write
pub fn send_commands(socket_path: &Path, commands: &[Command]) -> Result<usize, ClientError> {
    let payload = encode(commands)?;
    send_raw(socket_path, &payload)
}
