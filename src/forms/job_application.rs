use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Form, ValidationErrors, Validator};
use crate::domain::Job;
use crate::remote::RemoteRequest;
use crate::resource::{Resource, ResourceKey};

/// Full application with contact details, sent to `/jobs/apply`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationForm {
    pub job_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: String,
    pub cover_letter: String,
}

impl Form for JobApplicationForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("jobId", &self.job_id)
            .required("fullName", &self.full_name)
            .max_len("fullName", &self.full_name, 100)
            .required("email", &self.email)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .url("resumeUrl", &self.resume_url)
            .max_len("coverLetter", &self.cover_letter, 5000)
            .finish()
    }

    fn request(&self) -> RemoteRequest {
        RemoteRequest::post("/jobs/apply").with_payload(json!({
            "jobId": self.job_id,
            "fullName": self.full_name.trim(),
            "email": self.email.trim(),
            "phone": self.phone.trim(),
            "resumeUrl": self.resume_url.trim(),
            "coverLetter": self.cover_letter,
        }))
    }

    fn invalidates(&self) -> Vec<ResourceKey> {
        vec![Job::key_for(&self.job_id)]
    }
}
