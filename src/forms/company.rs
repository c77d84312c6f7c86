use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Form, ValidationErrors, Validator};
use crate::domain::Company;
use crate::remote::RemoteRequest;
use crate::resource::{Resource, ResourceKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompanySize {
    #[default]
    #[serde(rename = "1-10")]
    Micro,
    #[serde(rename = "11-50")]
    Small,
    #[serde(rename = "51-200")]
    Medium,
    #[serde(rename = "201-1000")]
    Large,
    #[serde(rename = "1000+")]
    Enterprise,
}

/// Create a company page, or edit one when `id` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
    pub id: Option<String>,
    pub name: String,
    pub tagline: String,
    pub industry: String,
    pub website: String,
    pub size: CompanySize,
    pub description: String,
}

impl Form for CompanyForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name)
            .max_len("name", &self.name, 100)
            .max_len("tagline", &self.tagline, 120)
            .required("industry", &self.industry)
            .url("website", &self.website)
            .max_len("description", &self.description, 2000)
            .finish()
    }

    fn request(&self) -> RemoteRequest {
        let payload = json!({
            "name": self.name.trim(),
            "tagline": self.tagline.trim(),
            "industry": self.industry.trim(),
            "website": self.website.trim(),
            "size": self.size,
            "description": self.description,
        });
        match &self.id {
            Some(id) => RemoteRequest::put(Company::endpoint(id)).with_payload(payload),
            None => RemoteRequest::post("/company").with_payload(payload),
        }
    }

    fn invalidates(&self) -> Vec<ResourceKey> {
        self.id.iter().map(|id| Company::key_for(id)).collect()
    }
}
