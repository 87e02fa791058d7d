use crate::domain::models::ConnectionStatus;

/// Connection lifecycle bookkeeping.
///
/// Every successful connection gets a new generation number. Disconnect
/// events are tagged with the generation of the link they came from, so an
/// event from a link that was already released can never tear down its
/// successor.
#[derive(Debug)]
pub struct ConnectionTracker {
    status: ConnectionStatus,
    generation: u64,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            generation: 0,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    pub fn begin_scan(&mut self) {
        self.status = ConnectionStatus::Scanning;
    }

    pub fn begin_connect(&mut self) {
        self.status = ConnectionStatus::Connecting;
    }

    /// Scan or connect attempt ended without a connection.
    pub fn abort(&mut self) {
        if !self.is_connected() {
            self.status = ConnectionStatus::Disconnected;
        }
    }

    /// Returns the generation assigned to the new link.
    pub fn connected(&mut self) -> u64 {
        self.generation += 1;
        self.status = ConnectionStatus::Connected;
        self.generation
    }

    /// Apply a disconnect of the link with the given generation.
    ///
    /// Returns `true` only for the transition out of `Connected`; the caller
    /// notifies the user exactly when this returns `true`.
    pub fn disconnected(&mut self, generation: u64) -> bool {
        if !self.is_connected() || generation != self.generation {
            return false;
        }
        self.status = ConnectionStatus::Disconnected;
        true
    }
}
