//! Content dialog relay.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace};

use wavelet_core::host::{ContentDialog, DialogCompletion, DialogKind, NavigationHost};
use wavelet_core::types::{DialogChoice, DialogId};

/// Relays script dialogs to the host one at a time.
///
/// `alert()` and `confirm()` calls queue in arrival order and the next
/// dialog presents only once the active one resolves. The page stays
/// blocked on its completion until then. Script dialogs always present;
/// they are not subject to the missing-handler notice throttling.
pub struct DialogBroker {
    queue: VecDeque<ContentDialog>,
    active: Option<DialogId>,
    completions: HashMap<DialogId, DialogCompletion>,
    host: Arc<dyn NavigationHost>,
}

impl DialogBroker {
    pub fn new(host: Arc<dyn NavigationHost>) -> Self {
        Self {
            queue: VecDeque::new(),
            active: None,
            completions: HashMap::new(),
            host,
        }
    }

    /// Queue an `alert()` for presentation.
    pub fn request_alert(
        &mut self,
        message: impl Into<String>,
        completion: DialogCompletion,
    ) -> DialogId {
        self.enqueue(
            DialogKind::Alert {
                message: message.into(),
            },
            completion,
        )
    }

    /// Queue a `confirm()` for presentation.
    pub fn request_confirm(
        &mut self,
        message: impl Into<String>,
        completion: DialogCompletion,
    ) -> DialogId {
        self.enqueue(
            DialogKind::Confirm {
                message: message.into(),
            },
            completion,
        )
    }

    fn enqueue(&mut self, kind: DialogKind, completion: DialogCompletion) -> DialogId {
        let id = DialogId::new();
        self.completions.insert(id, completion);
        self.queue.push_back(ContentDialog { id, kind });
        trace!(dialog = id.0, pending = self.queue.len(), "Dialog queued");
        self.present_next();
        id
    }

    fn present_next(&mut self) {
        if self.active.is_some() {
            return;
        }
        let Some(dialog) = self.queue.pop_front() else {
            return;
        };
        self.active = Some(dialog.id);
        debug!(dialog = dialog.id.0, "Presenting content dialog");
        self.host.present_dialog(&dialog);
    }

    /// Resolve the active dialog with the user's choice, unblocking the
    /// page and presenting the next queued dialog, if any.
    ///
    /// An id that is not the active dialog is ignored; a stale resolve
    /// cannot complete a dialog it does not own.
    pub fn resolve(&mut self, dialog: DialogId, choice: DialogChoice) {
        if self.active != Some(dialog) {
            trace!(dialog = dialog.0, "Resolve for non-active dialog ignored");
            return;
        }
        self.active = None;
        if let Some(completion) = self.completions.remove(&dialog) {
            completion(choice);
        }
        self.present_next();
    }

    /// Dialogs waiting behind the active one
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn active(&self) -> Option<DialogId> {
        self.active
    }
}
