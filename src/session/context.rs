/// Identity of the person using the editor, passed explicitly to whatever needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Option<i64>,
}

impl SessionContext {
    pub fn signed_in(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}
