//! HTTP server configuration object.

use std::net::SocketAddr;

use crate::domain::ProxySignatures;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) signatures: ProxySignatures,
}

impl ServerConfig {
    /// Configuration with the default proxy signature set and no database.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            signatures: ProxySignatures::default(),
        }
    }

    /// Attach a database connection pool for durable recording.
    ///
    /// Without a pool the server runs against the in-memory store and keeps
    /// the same HTTP contract.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the proxy signature set used by the classifier.
    #[must_use]
    pub fn with_signatures(mut self, signatures: ProxySignatures) -> Self {
        self.signatures = signatures;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
