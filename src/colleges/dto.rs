use serde::Serialize;
use uuid::Uuid;

use crate::colleges::repo::College;

/// Public college listing entry.
#[derive(Debug, Serialize)]
pub struct CollegeListItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<College> for CollegeListItem {
    fn from(c: College) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}
