use crate::cache::ResourceCache;
use crate::domain::{
    Post, PostAuthorFollowed, PostReaction, PostReported, PostReposted, PostSaved, Reaction,
};
use crate::error::AppError;
use crate::forms::ValidationErrors;
use crate::mutation::Mutation;
use crate::notify::Toast;
use crate::optimistic::{OptimisticStore, Reconciliation, StoreHandle};
use crate::remote::{Remote, RemoteRequest};
use crate::resource::Resource;
use crate::session::{AppContext, Session};

/// Which post flags have a write in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostPending {
    pub reaction: bool,
    pub saved: bool,
    pub reposted: bool,
    pub reported: bool,
    pub author_followed: bool,
}

/// Everything a post card renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PostProps {
    pub post: Post,
    pub reaction: Option<Reaction>,
    pub num_reacts: u32,
    pub num_reposts: u32,
    pub is_saved: bool,
    pub is_reposted: bool,
    pub is_reported: bool,
    pub is_author_followed: bool,
    pub pending: PostPending,
    pub error: Option<String>,
    pub viewer_is_author: bool,
}

impl PostProps {
    pub fn from_store(store: &OptimisticStore<Post>, session: &Session) -> Self {
        let post = store.view().clone();
        Self {
            reaction: post.reaction,
            num_reacts: post.num_reacts,
            num_reposts: post.num_reposts,
            is_saved: post.is_saved,
            is_reposted: post.is_reposted,
            is_reported: post.is_reported,
            is_author_followed: post.is_author_followed,
            pending: PostPending {
                reaction: store.is_pending::<PostReaction>(),
                saved: store.is_pending::<PostSaved>(),
                reposted: store.is_pending::<PostReposted>(),
                reported: store.is_pending::<PostReported>(),
                author_followed: store.is_pending::<PostAuthorFollowed>(),
            },
            error: store.error().map(str::to_owned),
            viewer_is_author: session.is_viewer(&post.author_id),
            post,
        }
    }
}

/// Container for a post in a feed or on its own page.
pub struct PostCard<'c, C, X> {
    ctx: &'c AppContext<C, X>,
    store: StoreHandle<Post>,
}

impl<'c, C: ResourceCache, X: Remote> PostCard<'c, C, X> {
    pub fn new(ctx: &'c AppContext<C, X>, post: Post) -> Self {
        Self {
            ctx,
            store: super::mount(ctx, post),
        }
    }

    /// Mount from the cache, fetching when needed. `None` while loading.
    pub async fn load(ctx: &'c AppContext<C, X>, id: &str) -> Result<Option<Self>, AppError> {
        Ok(super::load::<Post, C, X>(ctx, id)
            .await?
            .map(|post| Self::new(ctx, post)))
    }

    pub fn store(&self) -> &StoreHandle<Post> {
        &self.store
    }

    pub fn props(&self) -> Result<PostProps, AppError> {
        let session = self.ctx.session();
        Ok(self.store.read(|store| PostProps::from_store(store, session))?)
    }

    /// Clear the inline error after it was shown.
    pub fn dismiss_error(&self) -> Result<Option<String>, AppError> {
        Ok(self.store.take_error()?)
    }

    /// Set or clear the viewer's reaction.
    pub async fn react(&self, reaction: Option<Reaction>) -> Result<Reconciliation, AppError> {
        self.ctx
            .reconciler()
            .mutate::<PostReaction>(&self.store, reaction)
            .await
    }

    pub async fn toggle_save(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().toggle::<PostSaved>(&self.store).await
    }

    pub async fn toggle_repost(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().toggle::<PostReposted>(&self.store).await
    }

    pub async fn toggle_report(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().toggle::<PostReported>(&self.store).await
    }

    pub async fn toggle_follow_author(&self) -> Result<Reconciliation, AppError> {
        self.ctx
            .reconciler()
            .toggle::<PostAuthorFollowed>(&self.store)
            .await
    }

    /// Delete the post. Only its author may; nothing is shown optimistically.
    /// On success the cache entry is dropped and the card unmounts.
    pub async fn delete(&self) -> Result<(), AppError> {
        let post = self.store.view()?;
        if !self.ctx.session().is_viewer(&post.author_id) {
            let mut errors = ValidationErrors::new();
            errors.add("post", "can only be deleted by its author");
            return Err(errors.into());
        }

        let mut mutation = Mutation::new(RemoteRequest::delete(Post::endpoint(&post.id)));
        match mutation.execute(self.ctx.remote()).await {
            Ok(_) => {
                self.ctx.cache().remove(&post.key())?;
                self.store.unmount()?;
                log::info!("deleted {}", post.key());
                Ok(())
            }
            Err(err) => {
                log::warn!("{}", err);
                if self.ctx.config().reconcile.notify_on_error {
                    self.ctx.notifier().notify(Toast::error(err.user_message()));
                }
                Err(err.into())
            }
        }
    }

    /// Reload the post and rebase pending flags on it.
    pub async fn refresh(&self) -> Result<(), AppError> {
        self.ctx.reconciler().refresh(&self.store).await?;
        Ok(())
    }

    pub fn unmount(self) -> Result<(), AppError> {
        Ok(self.store.unmount()?)
    }
}
