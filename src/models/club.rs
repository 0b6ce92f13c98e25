use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Club a sub-event is organized under
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
}

impl Club {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
