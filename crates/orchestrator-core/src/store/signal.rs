use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use uuid::Uuid;

/// Process-local registry of one-shot approval signals. A signal fired before
/// anyone waits on it is still observed by a later waiter, matching `Notify`'s
/// semantics exactly. Lost on restart by design: approvals survive in the
/// store, the in-memory wake-up signal does not.
#[derive(Default)]
pub struct SignalRegistry {
    signals: Mutex<HashMap<Uuid, Arc<Notify>>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the signal for `approval_id`, creating one if this is the first time
    /// it's been seen in this process.
    pub fn get_or_create(&self, approval_id: Uuid) -> Arc<Notify> {
        let mut signals = self.signals.lock().expect("signal registry mutex poisoned");
        signals.entry(approval_id).or_insert_with(|| Arc::new(Notify::new())).clone()
    }

    /// Returns the signal for `approval_id` if one has been registered in this process.
    pub fn get(&self, approval_id: Uuid) -> Option<Arc<Notify>> {
        self.signals.lock().expect("signal registry mutex poisoned").get(&approval_id).cloned()
    }

    pub fn fire(&self, approval_id: Uuid) {
        if let Some(notify) = self.get(approval_id) {
            notify.notify_one();
        }
    }
}
