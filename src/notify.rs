//! In-process change notifications: mutations publish, stream endpoints subscribe.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    /// Past-tense verb used in user messages.
    pub fn verb(self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeNotice {
    pub entity: String,
    pub id: String,
    pub kind: ChangeKind,
}

#[derive(Clone, Debug)]
pub struct Notifier {
    tx: broadcast::Sender<ChangeNotice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Notifier { tx }
    }

    /// Fire and forget; having no subscribers is fine.
    pub fn publish(&self, notice: ChangeNotice) {
        let receivers = self.tx.send(notice.clone()).unwrap_or(0);
        tracing::debug!(entity = %notice.entity, id = %notice.id, kind = ?notice.kind, receivers, "change published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }
}
