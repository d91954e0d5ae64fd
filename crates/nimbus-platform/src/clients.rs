//! Window Clients
//!
//! The open pages a worker can enumerate, focus, open and claim.

use std::sync::{Arc, Mutex};

use crate::error::PlatformError;

/// Identifier for an open page client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// An open page
#[derive(Debug, Clone)]
pub struct PageClient {
    pub id: ClientId,
    pub url: String,
    pub focused: bool,
}

/// Seam over the worker's view of open pages
pub trait WindowClients {
    /// All open window clients
    fn list(&self) -> Vec<PageClient>;

    /// Bring a client to the foreground. Returns false if it is gone.
    fn focus(&self, id: ClientId) -> bool;

    /// Open a new window at `url`
    fn open_window(&self, url: &str) -> Result<PageClient, PlatformError>;

    /// Take control of all open clients without a reload
    fn claim(&self);
}

/// In-memory client registry
#[derive(Clone, Default)]
pub struct InMemoryClients {
    inner: Arc<Mutex<ClientsInner>>,
}

#[derive(Default)]
struct ClientsInner {
    clients: Vec<PageClient>,
    next_id: u64,
    claimed: bool,
    windows_opened: u32,
}

impl InMemoryClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-open page
    pub fn add_page(&self, url: &str) -> ClientId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = ClientId(inner.next_id);
        inner.clients.push(PageClient {
            id,
            url: url.to_string(),
            focused: false,
        });
        id
    }

    /// Whether the worker has claimed open clients
    pub fn claimed(&self) -> bool {
        self.inner.lock().unwrap().claimed
    }

    /// How many new windows were opened
    pub fn windows_opened(&self) -> u32 {
        self.inner.lock().unwrap().windows_opened
    }
}

impl WindowClients for InMemoryClients {
    fn list(&self) -> Vec<PageClient> {
        self.inner.lock().unwrap().clients.clone()
    }

    fn focus(&self, id: ClientId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let mut found = false;
        for client in &mut inner.clients {
            client.focused = client.id == id;
            found |= client.id == id;
        }
        found
    }

    fn open_window(&self, url: &str) -> Result<PageClient, PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.windows_opened += 1;
        let client = PageClient {
            id: ClientId(inner.next_id),
            url: url.to_string(),
            focused: true,
        };
        inner.clients.push(client.clone());
        Ok(client)
    }

    fn claim(&self) {
        self.inner.lock().unwrap().claimed = true;
    }
}
