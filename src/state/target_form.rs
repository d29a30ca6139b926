//! Add-target form (pure state transitions).

use crate::model::{InvalidTarget, RemoteTarget, LOCAL_HOST};
use crate::state::TextInput;

/// Form field with input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Target name.
    Name,
    /// SSH on/off toggle.
    UseSsh,
    /// `user@hostname`; only reachable when SSH is on.
    Host,
    /// Destination dataset.
    Dataset,
}

/// Fields being entered for a new replication target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetForm {
    name: TextInput,
    use_ssh: bool,
    host: TextInput,
    dataset: TextInput,
    focus: FormField,
    send_after: Option<String>,
}

impl Default for TargetForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetForm {
    /// Blank form, SSH on, focus on the name.
    pub fn new() -> Self {
        Self {
            name: TextInput::default(),
            use_ssh: true,
            host: TextInput::default(),
            dataset: TextInput::default(),
            focus: FormField::Name,
            send_after: None,
        }
    }

    /// Blank form that continues to a send confirmation for `snapshot`.
    pub fn for_send(snapshot: impl Into<String>) -> Self {
        Self {
            send_after: Some(snapshot.into()),
            ..Self::new()
        }
    }

    /// Field with focus.
    pub fn focus(&self) -> FormField {
        self.focus
    }

    /// Entered name.
    pub fn name(&self) -> &TextInput {
        &self.name
    }

    /// Whether SSH is selected.
    pub fn use_ssh(&self) -> bool {
        self.use_ssh
    }

    /// Entered host.
    pub fn host(&self) -> &TextInput {
        &self.host
    }

    /// Entered dataset.
    pub fn dataset(&self) -> &TextInput {
        &self.dataset
    }

    /// Snapshot waiting to be sent once the target is saved.
    pub fn send_after(&self) -> Option<&str> {
        self.send_after.as_deref()
    }

    /// Fields currently shown, in focus order.
    pub fn fields(&self) -> Vec<FormField> {
        if self.use_ssh {
            vec![
                FormField::Name,
                FormField::UseSsh,
                FormField::Host,
                FormField::Dataset,
            ]
        } else {
            vec![FormField::Name, FormField::UseSsh, FormField::Dataset]
        }
    }

    /// Move focus to the next field, wrapping.
    pub fn next_field(mut self) -> Self {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + 1) % fields.len()];
        self
    }

    /// Move focus to the previous field, wrapping.
    pub fn prev_field(mut self) -> Self {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + fields.len() - 1) % fields.len()];
        self
    }

    /// Flip the SSH toggle. No-op unless the toggle has focus.
    pub fn toggle_ssh(mut self) -> Self {
        if self.focus == FormField::UseSsh {
            self.use_ssh = !self.use_ssh;
        }
        self
    }

    /// Apply a text edit to the focused field. No-op on the toggle.
    pub fn edit(mut self, f: impl FnOnce(TextInput) -> TextInput) -> Self {
        match self.focus {
            FormField::Name => self.name = f(self.name),
            FormField::Host => self.host = f(self.host),
            FormField::Dataset => self.dataset = f(self.dataset),
            FormField::UseSsh => {}
        }
        self
    }

    /// Build the target described by the form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for empty or malformed fields.
    pub fn to_target(&self) -> Result<RemoteTarget, InvalidTarget> {
        let host = if self.use_ssh {
            self.host.text()
        } else {
            LOCAL_HOST
        };
        RemoteTarget::new(self.name.text(), host, self.dataset.text(), self.use_ssh)
    }
}
