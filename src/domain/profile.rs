use serde::{Deserialize, Serialize};

use crate::Resource;

/// A member profile. Fetched by user id and edited only by its owner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Resource)]
#[resource(collection = "profiles")]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub location: String,
    pub about: String,
    pub website: Option<String>,
    pub num_connections: u32,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
