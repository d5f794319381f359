use crate::shared::entity::{Entity, ID};

/// A medicine registered by a user. Dose times live on the
/// `DoseSchedule`s that reference it.
#[derive(Debug, Clone)]
pub struct Medicine {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub notes: Option<String>,
    pub deleted_at: Option<i64>,
}

impl Medicine {
    pub fn new(user_id: ID, name: String, notes: Option<String>) -> Self {
        Self {
            id: Default::default(),
            user_id,
            name,
            notes,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Calendar indicator label: the first glyph of the name, upper-cased
    /// when the glyph has an uppercase form
    pub fn label(&self) -> String {
        match self.name.chars().next() {
            Some(glyph) => glyph.to_uppercase().collect(),
            None => "?".into(),
        }
    }
}

impl Entity for Medicine {
    fn id(&self) -> &ID {
        &self.id
    }
}
