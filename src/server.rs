//! Control endpoint: socket node, device registration and receive loop
//!
//! The control surface is exposed as a Unix datagram socket. Datagrams keep
//! write boundaries, so every `send` from a client is handled as exactly one
//! write. The node's mode carries the access policy.

use std::future::Future;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UnixDatagram;
use tracing::{debug, info, warn};
use vmouse_device::{DeviceError, InputBackend, VirtualMouse};
use vmouse_protocol::MAX_WRITE_LEN;

use crate::config::{AccessPolicy, VmouseConfig};
use crate::control::{ControlSurface, WriteFault};
use crate::dispatch::DispatchReport;

/// Startup failures, one variant per stage
#[derive(Debug, Error)]
pub enum StartupError {
    /// The socket node could not be allocated
    #[error("Failed to bind control socket {}: {source}", .path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The socket node could not be given its access mode
    #[error("Failed to set permissions on {}: {source}", .path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register virtual mouse: {0}")]
    Register(#[source] DeviceError),

    /// The socket could not be attached to the async runtime
    #[error("Failed to set up receive loop: {0}")]
    Runtime(#[source] std::io::Error),
}

impl StartupError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Bind { .. } => 2,
            StartupError::Permissions { .. } => 3,
            StartupError::Register(_) => 4,
            StartupError::Runtime(_) => 5,
        }
    }
}

/// Receive buffer for one write, one byte larger than the limit
pub type WriteBuf = [u8; MAX_WRITE_LEN + 1];

/// Whether some process is still receiving on the socket at `path`
fn socket_is_live(path: &Path) -> std::io::Result<bool> {
    let client = std::os::unix::net::UnixDatagram::unbound()?;
    match client.connect(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read and discard every queued datagram on a non-blocking socket
fn drain_pending(socket: &std::os::unix::net::UnixDatagram) -> std::io::Result<usize> {
    let mut buf: WriteBuf = [0; MAX_WRITE_LEN + 1];
    let mut count = 0;
    loop {
        match socket.recv(&mut buf) {
            Ok(_) => count += 1,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(count),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Removes the socket node when dropped
#[derive(Debug)]
struct SocketNode {
    path: PathBuf,
}

impl Drop for SocketNode {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed {}", self.path.display()),
            Err(e) => warn!("Failed to remove {}: {e}", self.path.display()),
        }
    }
}

/// Bound control socket
pub struct ControlEndpoint {
    socket: UnixDatagram,
    node: SocketNode,
}

impl ControlEndpoint {
    /// Create the socket node at `path` with the mode of `policy`
    ///
    /// A stale socket at `path` is replaced; any other file is left alone and
    /// reported as a bind failure. Must be called inside a tokio runtime.
    pub fn bind(path: &Path, policy: AccessPolicy) -> Result<Self, StartupError> {
        let bind_err = |source: std::io::Error| StartupError::Bind {
            path: path.to_path_buf(),
            source,
        };

        if let Ok(meta) = std::fs::symlink_metadata(path) {
            if !meta.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "path exists and is not a socket",
                )));
            }
            if socket_is_live(path).map_err(bind_err)? {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AddrInUse,
                    "another server is listening on this socket",
                )));
            }
            std::fs::remove_file(path).map_err(bind_err)?;
            debug!("Removed stale socket {}", path.display());
        }

        let std_socket = std::os::unix::net::UnixDatagram::bind(path).map_err(bind_err)?;
        let node = SocketNode {
            path: path.to_path_buf(),
        };

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(policy.mode())).map_err(
            |source| StartupError::Permissions {
                path: path.to_path_buf(),
                source,
            },
        )?;

        std_socket
            .set_nonblocking(true)
            .map_err(StartupError::Runtime)?;
        // Anything queued before the chmod bypassed the access policy
        let discarded = drain_pending(&std_socket).map_err(StartupError::Runtime)?;
        if discarded > 0 {
            warn!(
                "vmouse: discarded {discarded} write(s) received before {} was restricted",
                path.display()
            );
        }
        let socket = UnixDatagram::from_std(std_socket).map_err(StartupError::Runtime)?;

        Ok(Self { socket, node })
    }

    pub fn path(&self) -> &Path {
        &self.node.path
    }

    /// Receive one write into `buf`
    ///
    /// The extra byte past the limit lets an oversized datagram show up as
    /// such instead of being truncated to an acceptable length.
    pub async fn recv_write<'a>(&self, buf: &'a mut WriteBuf) -> Result<&'a [u8], WriteFault> {
        let len = self.socket.recv(buf).await.map_err(WriteFault::Copy)?;
        Ok(&buf[..len])
    }
}

/// Running endpoint: socket plus registered device
pub struct Server<B: InputBackend> {
    endpoint: ControlEndpoint,
    control: Arc<ControlSurface<B>>,
}

/// Bring the endpoint up
///
/// The socket node is created first, then the device is registered. If
/// registration fails the node is removed again before returning.
pub fn start<B: InputBackend>(config: &VmouseConfig, backend: B) -> Result<Server<B>, StartupError> {
    let policy = config.access_policy();
    let endpoint = ControlEndpoint::bind(&config.socket_path, policy)?;
    info!(
        "vmouse: control socket created: {} (mode {:o})",
        endpoint.path().display(),
        policy.mode()
    );

    let mut mouse = VirtualMouse::new(backend, config.identity());
    mouse.register().map_err(StartupError::Register)?;
    if let Some(node) = mouse.dev_node() {
        info!("vmouse: device node {}", node.display());
    }

    Ok(Server {
        endpoint,
        control: Arc::new(ControlSurface::new(mouse)),
    })
}

impl<B: InputBackend> Server<B> {
    pub fn control(&self) -> Arc<ControlSurface<B>> {
        Arc::clone(&self.control)
    }

    pub fn socket_path(&self) -> &Path {
        self.endpoint.path()
    }

    /// Receive and handle one write
    pub async fn serve_one(&self, buf: &mut WriteBuf) -> Result<DispatchReport, WriteFault> {
        let payload = self.endpoint.recv_write(buf).await?;
        self.control.write(payload)
    }

    /// Serve writes until `shutdown` completes, then tear everything down
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) {
        tokio::pin!(shutdown);
        let mut buf: WriteBuf = [0; MAX_WRITE_LEN + 1];

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = self.serve_one(&mut buf) => match result {
                    Ok(_) | Err(WriteFault::TooLarge { .. }) => {}
                    Err(e) => {
                        warn!("vmouse: {e}");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }

        self.control.shutdown();
        info!("vmouse: shutting down, removing {}", self.socket_path().display());
    }
}
