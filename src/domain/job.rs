use serde::{Deserialize, Serialize};
use serde_json::json;

use super::toggle_request;
use crate::optimistic::{adjust_count, Flag};
use crate::remote::RemoteRequest;
use crate::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[resource(collection = "jobs")]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub company_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    /// User who posted the listing.
    #[serde(default)]
    pub poster_id: Option<String>,
    #[serde(default)]
    pub num_applicants: u32,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default)]
    pub is_applied: bool,
}

impl Job {
    pub fn new(id: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            company_name: String::new(),
            title: String::new(),
            location: String::new(),
            poster_id: None,
            num_applicants: 0,
            is_saved: false,
            is_reported: false,
            is_applied: false,
        }
    }
}

pub struct JobSaved;

impl Flag for JobSaved {
    type Resource = Job;
    type Value = bool;
    const NAME: &'static str = "saved";

    fn read(job: &Job) -> bool {
        job.is_saved
    }

    fn write(job: &mut Job, saved: &bool) {
        job.is_saved = *saved;
    }

    fn request(job: &Job, saved: &bool) -> RemoteRequest {
        toggle_request(format!("/jobs/{}/save", job.id), *saved)
    }
}

pub struct JobReported;

impl Flag for JobReported {
    type Resource = Job;
    type Value = bool;
    const NAME: &'static str = "reported";

    fn read(job: &Job) -> bool {
        job.is_reported
    }

    fn write(job: &mut Job, reported: &bool) {
        job.is_reported = *reported;
    }

    fn request(job: &Job, reported: &bool) -> RemoteRequest {
        toggle_request(format!("/jobs/{}/report", job.id), *reported)
    }
}

/// One-click apply. Withdrawing deletes the application.
pub struct JobApplied;

impl Flag for JobApplied {
    type Resource = Job;
    type Value = bool;
    const NAME: &'static str = "applied";

    fn read(job: &Job) -> bool {
        job.is_applied
    }

    fn write(job: &mut Job, applied: &bool) {
        adjust_count(&mut job.num_applicants, job.is_applied, *applied);
        job.is_applied = *applied;
    }

    fn request(job: &Job, applied: &bool) -> RemoteRequest {
        if *applied {
            RemoteRequest::post("/jobs/apply").with_payload(json!({ "jobId": job.id }))
        } else {
            RemoteRequest::delete(format!("/jobs/{}/apply", job.id))
        }
    }
}
