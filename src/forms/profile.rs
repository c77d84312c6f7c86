use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Form, ValidationErrors, Validator};
use crate::domain::Profile;
use crate::remote::RemoteRequest;
use crate::resource::{Resource, ResourceKey};

/// The viewer's own profile. The server identifies the profile from the
/// session, so `user_id` only selects what to invalidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub location: String,
    pub about: String,
    pub website: String,
    pub phone: String,
}

impl ProfileForm {
    /// Prefill from the current profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.id.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            headline: profile.headline.clone(),
            location: profile.location.clone(),
            about: profile.about.clone(),
            website: profile.website.clone().unwrap_or_default(),
            phone: String::new(),
        }
    }
}

impl Form for ProfileForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("firstName", &self.first_name)
            .max_len("firstName", &self.first_name, 50)
            .required("lastName", &self.last_name)
            .max_len("lastName", &self.last_name, 50)
            .max_len("headline", &self.headline, 220)
            .max_len("about", &self.about, 2600)
            .url("website", &self.website)
            .phone("phone", &self.phone)
            .finish()
    }

    fn request(&self) -> RemoteRequest {
        RemoteRequest::put("/profile").with_payload(json!({
            "firstName": self.first_name.trim(),
            "lastName": self.last_name.trim(),
            "headline": self.headline.trim(),
            "location": self.location.trim(),
            "about": self.about,
            "website": self.website.trim(),
            "phone": self.phone.trim(),
        }))
    }

    fn invalidates(&self) -> Vec<ResourceKey> {
        vec![Profile::key_for(&self.user_id)]
    }
}
