use std::collections::BTreeMap;

use crate::static_server::StaticServerHandle;

/// How window creations map onto local servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPolicy {
    /// Every window starts its own server, stopped when that window goes away.
    PerWindow,
    /// The first live server is reused by later windows.
    Shared,
}

impl ServerPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "per-window" | "per_window" | "window" => Some(Self::PerWindow),
            "shared" | "single" => Some(Self::Shared),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerWindow => "per-window",
            Self::Shared => "shared",
        }
    }
}

/// Owns every live server handle, keyed by the window label that started it.
#[derive(Debug)]
pub struct ServerPool {
    policy: ServerPolicy,
    servers: BTreeMap<String, StaticServerHandle>,
    window_ports: BTreeMap<String, u16>,
}

impl ServerPool {
    pub fn new(policy: ServerPolicy) -> Self {
        Self {
            policy,
            servers: BTreeMap::new(),
            window_ports: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> ServerPolicy {
        self.policy
    }

    /// Port a new window should reuse instead of starting a server, if any.
    pub fn reusable_port(&self) -> Option<u16> {
        match self.policy {
            ServerPolicy::PerWindow => None,
            ServerPolicy::Shared => self
                .servers
                .values()
                .find(|server| server.is_running())
                .map(StaticServerHandle::port),
        }
    }

    /// Records which port a window was attached to and takes ownership of the
    /// server it started, if it started one.
    pub fn adopt(&mut self, window_label: &str, port: u16, server: Option<StaticServerHandle>) {
        self.window_ports.insert(window_label.to_string(), port);
        if let Some(server) = server {
            if let Some(mut previous) = self.servers.insert(window_label.to_string(), server) {
                previous.stop();
            }
        }
    }

    /// Forgets a closed window. Under the per-window policy its server stops;
    /// a shared server stays up until [`ServerPool::stop_all`].
    ///
    /// Returns the number of servers stopped.
    pub fn release(&mut self, window_label: &str) -> usize {
        self.window_ports.remove(window_label);
        match self.policy {
            ServerPolicy::PerWindow => self
                .servers
                .remove(window_label)
                .map(|mut server| usize::from(server.stop()))
                .unwrap_or(0),
            ServerPolicy::Shared => 0,
        }
    }

    /// Stops and drops every server. Safe to call on an empty pool and repeatedly.
    pub fn stop_all(&mut self) -> usize {
        self.window_ports.clear();
        let servers = std::mem::take(&mut self.servers);
        servers
            .into_values()
            .map(|mut server| usize::from(server.stop()))
            .sum()
    }

    pub fn live_count(&self) -> usize {
        self.servers
            .values()
            .filter(|server| server.is_running())
            .count()
    }

    pub fn window_port(&self, window_label: &str) -> Option<u16> {
        self.window_ports.get(window_label).copied()
    }
}
