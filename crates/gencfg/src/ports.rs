/*
 * ports.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Hand out local TCP ports that no other caller has received.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Attempts before giving up, one per value of the 16-bit port space.
pub const MAX_ATTEMPTS: u32 = 1 << 16;

static GLOBAL: Lazy<Arc<PortAllocator>> = Lazy::new(|| Arc::new(PortAllocator::new()));

/// Registry of ports already handed out.
///
/// The operating system picks a free ephemeral port; the registry makes sure
/// that port is not given to a second caller before the first one binds it.
/// Ports are never released.
#[derive(Debug, Default)]
pub struct PortAllocator {
    reserved: Mutex<HashSet<u16>>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide allocator used when options do not inject one.
    pub fn global() -> Arc<PortAllocator> {
        Arc::clone(&GLOBAL)
    }

    /// Reserve a currently free port on `127.0.0.1`.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if binding fails, [`Error::PortExhausted`] if every
    /// attempt returned a port that was already reserved.
    pub fn free_local_port(&self) -> Result<u16> {
        self.allocate(MAX_ATTEMPTS, probe_local_port)
    }

    /// Whether `port` has been handed out by this allocator.
    pub fn is_reserved(&self, port: u16) -> bool {
        self.lock().contains(&port)
    }

    fn allocate(&self, attempts: u32, mut probe: impl FnMut() -> io::Result<u16>) -> Result<u16> {
        for _ in 0..attempts {
            let port = probe()?;
            if self.reserve(port) {
                trace!(port, "reserved local port");
                return Ok(port);
            }
            trace!(port, "port already reserved, retrying");
        }
        Err(Error::PortExhausted { attempts })
    }

    fn reserve(&self, port: u16) -> bool {
        self.lock().insert(port)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<u16>> {
        self.reserved.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bind an ephemeral port and release it immediately.
fn probe_local_port() -> io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}
