/*
 * host.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Host facts exposed to templates.
 *
 * Templates may reference the machine they are expanded on. The facts are
 * read through the HostProbe trait so that tests and embedders can supply
 * fixed values:
 * - NativeHost: asks the operating system
 * - StaticHost: returns the values it was built with
 */

use std::fmt::Debug;
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use std::path::Path;

/// Marker files left behind by container runtimes.
const CONTAINER_MARKERS: [&str; 2] = ["/.dockerenv", "/.containerenv"];

/// Source of the host facts that templates can reference.
pub trait HostProbe: Debug + Send + Sync {
    /// Name of this machine.
    fn hostname(&self) -> io::Result<String>;

    /// First IPv4 address `host` resolves to, if any.
    fn lookup_ipv4(&self, host: &str) -> io::Result<Option<Ipv4Addr>>;

    /// Whether we are running inside a container.
    fn is_containerized(&self) -> bool;

    /// Number of logical CPUs.
    fn cpus(&self) -> usize;

    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }
}

/// Probe backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHost;

impl HostProbe for NativeHost {
    fn hostname(&self) -> io::Result<String> {
        gethostname::gethostname().into_string().map_err(|raw| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("hostname {:?} is not valid UTF-8", raw),
            )
        })
    }

    fn lookup_ipv4(&self, host: &str) -> io::Result<Option<Ipv4Addr>> {
        let found = (host, 0).to_socket_addrs()?.find_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        });
        Ok(found)
    }

    fn is_containerized(&self) -> bool {
        CONTAINER_MARKERS
            .iter()
            .any(|marker| Path::new(marker).exists())
    }

    fn cpus(&self) -> usize {
        num_cpus::get()
    }
}

/// Probe that reports fixed facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost {
    pub hostname: String,
    pub ipv4: Option<Ipv4Addr>,
    pub containerized: bool,
    pub cpus: usize,
    pub arch: String,
    pub os: String,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            ipv4: Some(Ipv4Addr::LOCALHOST),
            containerized: false,
            cpus: 1,
            arch: std::env::consts::ARCH.to_string(),
            os: std::env::consts::OS.to_string(),
        }
    }
}

impl HostProbe for StaticHost {
    fn hostname(&self) -> io::Result<String> {
        Ok(self.hostname.clone())
    }

    fn lookup_ipv4(&self, _host: &str) -> io::Result<Option<Ipv4Addr>> {
        Ok(self.ipv4)
    }

    fn is_containerized(&self) -> bool {
        self.containerized
    }

    fn cpus(&self) -> usize {
        self.cpus
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn os(&self) -> String {
        self.os.clone()
    }
}
