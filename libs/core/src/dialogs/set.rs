use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dialogs::{Dialog, DialogContext, DialogState};
use crate::error::{DialogError, DialogResult};
use crate::turn::TurnContext;

/// Registry of the dialogs a bot can push onto its stack, keyed by id.
#[derive(Default)]
pub struct DialogSet {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dialog`; ids must be unique within the set.
    pub fn add<D: Dialog + 'static>(&mut self, dialog: D) -> DialogResult<&mut Self> {
        self.add_shared(Arc::new(dialog))
    }

    pub fn add_shared(&mut self, dialog: Arc<dyn Dialog>) -> DialogResult<&mut Self> {
        let id = dialog.id().to_string();
        if self.dialogs.contains_key(&id) {
            return Err(DialogError::DuplicateDialog(id));
        }
        self.dialogs.insert(id, dialog);
        Ok(self)
    }

    pub fn find(&self, dialog_id: &str) -> Option<Arc<dyn Dialog>> {
        self.dialogs.get(dialog_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn create_context<'a>(
        &'a self,
        turn: &'a TurnContext,
        state: &'a mut DialogState,
    ) -> DialogContext<'a> {
        DialogContext::new(self, turn, state)
    }
}

impl fmt::Debug for DialogSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.dialogs.keys().collect();
        ids.sort();
        f.debug_struct("DialogSet").field("dialogs", &ids).finish()
    }
}
