// SPDX-License-Identifier: MIT

//! The shared listening socket (spec.md §5, §9).
//!
//! The master binds exactly one listening socket up front and hands a
//! duplicate of its descriptor to every worker it forks, at the fixed
//! descriptor number [`crate::env::LISTEN_FD`]. Because every generation
//! of workers accepts off the same kernel accept queue, overlapping
//! generations during a rolling reload share fan-out with no connection
//! ever routed to a socket that isn't listening — this is the mechanism
//! behind the "no-drop" testable property (spec.md §8).
//!
//! Workers that cannot use descriptor inheritance on their platform are
//! expected to bind the same address themselves with `SO_REUSEADDR` /
//! `SO_REUSEPORT`, per spec.md §9; that fallback lives entirely in the
//! (external) worker binary and has no code here.

use std::net::TcpListener;

use socket2::{Domain, Socket, Type};

use crate::error::LifecycleError;

/// A bound, listening TCP socket shared across worker generations.
pub struct SharedListener {
    listener: TcpListener,
    addr: String,
}

impl SharedListener {
    /// Bind `addr` with `SO_REUSEADDR` set, matching the address-reuse
    /// fallback spec.md §9 describes for platforms without inherited-fd
    /// cluster semantics, so a reload's brief overlap never fails to bind.
    pub fn bind(addr: &str) -> Result<Self, LifecycleError> {
        let parsed: std::net::SocketAddr = addr
            .parse()
            .map_err(|_| LifecycleError::ListenBindFailed(addr.to_string(), std::io::Error::other("invalid address")))?;

        let domain = if parsed.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::STREAM, None)
            .map_err(|e| LifecycleError::ListenBindFailed(addr.to_string(), e))?;
        socket.set_reuse_address(true).map_err(|e| LifecycleError::ListenBindFailed(addr.to_string(), e))?;
        socket.bind(&parsed.into()).map_err(|e| LifecycleError::ListenBindFailed(addr.to_string(), e))?;
        socket.listen(1024).map_err(|e| LifecycleError::ListenBindFailed(addr.to_string(), e))?;
        socket.set_nonblocking(true).map_err(|e| LifecycleError::ListenBindFailed(addr.to_string(), e))?;

        Ok(Self { listener: socket.into(), addr: addr.to_string() })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// A duplicate descriptor suitable for handing to a freshly forked
    /// worker. Each generation gets its own dup; closing one does not
    /// affect the others or the parent's original.
    pub fn try_clone(&self) -> std::io::Result<TcpListener> {
        self.listener.try_clone()
    }
}
