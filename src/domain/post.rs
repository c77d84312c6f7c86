use serde::{Deserialize, Serialize};
use serde_json::json;

use super::toggle_request;
use crate::optimistic::{adjust_count, Flag, Invalidation};
use crate::remote::RemoteRequest;
use crate::Resource;

/// Reaction kinds a viewer can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reaction {
    Like,
    Celebrate,
    Support,
    Love,
    Insightful,
    Funny,
}

impl Reaction {
    pub const ALL: [Reaction; 6] = [
        Reaction::Like,
        Reaction::Celebrate,
        Reaction::Support,
        Reaction::Love,
        Reaction::Insightful,
        Reaction::Funny,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[resource(collection = "posts")]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub num_reacts: u32,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub num_reposts: u32,
    /// The viewer's reaction, if any.
    #[serde(default)]
    pub reaction: Option<Reaction>,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_reposted: bool,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default)]
    pub is_author_followed: bool,
}

impl Post {
    pub fn new(id: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            author_name: String::new(),
            body: String::new(),
            num_reacts: 0,
            num_comments: 0,
            num_reposts: 0,
            reaction: None,
            is_saved: false,
            is_reposted: false,
            is_reported: false,
            is_author_followed: false,
        }
    }
}

/// The viewer's reaction. Changing from one kind to another keeps the count.
pub struct PostReaction;

impl Flag for PostReaction {
    type Resource = Post;
    type Value = Option<Reaction>;
    const NAME: &'static str = "reaction";

    fn read(post: &Post) -> Option<Reaction> {
        post.reaction
    }

    fn write(post: &mut Post, reaction: &Option<Reaction>) {
        adjust_count(&mut post.num_reacts, post.reaction.is_some(), reaction.is_some());
        post.reaction = *reaction;
    }

    fn request(post: &Post, reaction: &Option<Reaction>) -> RemoteRequest {
        let endpoint = format!("/posts/{}/reactions", post.id);
        match reaction {
            Some(kind) => RemoteRequest::post(endpoint).with_payload(json!({ "reaction": kind })),
            None => RemoteRequest::delete(endpoint),
        }
    }
}

pub struct PostSaved;

impl Flag for PostSaved {
    type Resource = Post;
    type Value = bool;
    const NAME: &'static str = "saved";

    fn read(post: &Post) -> bool {
        post.is_saved
    }

    fn write(post: &mut Post, saved: &bool) {
        post.is_saved = *saved;
    }

    fn request(post: &Post, saved: &bool) -> RemoteRequest {
        toggle_request(format!("/posts/{}/save", post.id), *saved)
    }
}

pub struct PostReposted;

impl Flag for PostReposted {
    type Resource = Post;
    type Value = bool;
    const NAME: &'static str = "reposted";

    fn read(post: &Post) -> bool {
        post.is_reposted
    }

    fn write(post: &mut Post, reposted: &bool) {
        adjust_count(&mut post.num_reposts, post.is_reposted, *reposted);
        post.is_reposted = *reposted;
    }

    fn request(post: &Post, reposted: &bool) -> RemoteRequest {
        toggle_request(format!("/posts/{}/repost", post.id), *reposted)
    }
}

pub struct PostReported;

impl Flag for PostReported {
    type Resource = Post;
    type Value = bool;
    const NAME: &'static str = "reported";

    fn read(post: &Post) -> bool {
        post.is_reported
    }

    fn write(post: &mut Post, reported: &bool) {
        post.is_reported = *reported;
    }

    fn request(post: &Post, reported: &bool) -> RemoteRequest {
        toggle_request(format!("/posts/{}/report", post.id), *reported)
    }
}

/// Whether the viewer follows the post's author.
pub struct PostAuthorFollowed;

impl Flag for PostAuthorFollowed {
    type Resource = Post;
    type Value = bool;
    const NAME: &'static str = "author_followed";

    fn read(post: &Post) -> bool {
        post.is_author_followed
    }

    fn write(post: &mut Post, followed: &bool) {
        post.is_author_followed = *followed;
    }

    fn request(post: &Post, followed: &bool) -> RemoteRequest {
        toggle_request(format!("/users/{}/follow", post.author_id), *followed)
    }

    // Other cached posts by the same author carry the flag too.
    fn invalidates(_: &Post, _: &bool) -> Vec<Invalidation> {
        vec![Invalidation::Collection(Post::COLLECTION)]
    }
}
