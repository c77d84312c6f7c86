use serde::{Deserialize, Serialize};

use super::toggle_request;
use crate::optimistic::{adjust_count, Flag};
use crate::remote::RemoteRequest;
use crate::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[resource(collection = "company")]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Admin of the company page.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub num_followers: u32,
    #[serde(default)]
    pub is_followed: bool,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tagline: String::new(),
            industry: String::new(),
            website: None,
            owner_id: None,
            num_followers: 0,
            is_followed: false,
        }
    }
}

pub struct CompanyFollowed;

impl Flag for CompanyFollowed {
    type Resource = Company;
    type Value = bool;
    const NAME: &'static str = "followed";

    fn read(company: &Company) -> bool {
        company.is_followed
    }

    fn write(company: &mut Company, followed: &bool) {
        adjust_count(&mut company.num_followers, company.is_followed, *followed);
        company.is_followed = *followed;
    }

    fn request(company: &Company, followed: &bool) -> RemoteRequest {
        toggle_request(format!("/company/{}/follow", company.id), *followed)
    }
}
