//! Notification Inbox
//!
//! The in-page list of stored notifications and its derived unread badge.
//! The list never calls the backend itself; the controller mutates it only
//! after the corresponding backend call succeeded, so the badge always
//! reflects what the server believes.

/// One stored notification shown in the inbox
#[derive(Debug, Clone)]
pub struct InboxItem {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub read: bool,
}

/// In-page notification list
#[derive(Debug, Default)]
pub struct NotificationInbox {
    items: Vec<InboxItem>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly arrived notification at the top, unread
    pub fn push(&mut self, id: u64, title: &str, body: &str) {
        self.items.insert(
            0,
            InboxItem {
                id,
                title: title.to_string(),
                body: body.to_string(),
                read: false,
            },
        );
    }

    pub fn items(&self) -> &[InboxItem] {
        &self.items
    }

    /// Unread badge count, recomputed from the list every time
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }

    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}
