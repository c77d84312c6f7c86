use crate::cache::ResourceCache;
use crate::domain::{Company, CompanyFollowed};
use crate::error::AppError;
use crate::optimistic::{OptimisticStore, Reconciliation, StoreHandle};
use crate::remote::Remote;
use crate::session::{AppContext, Session};

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProps {
    pub company: Company,
    pub is_followed: bool,
    pub num_followers: u32,
    pub is_follow_pending: bool,
    pub error: Option<String>,
    /// The viewer administers the page; shows edit instead of follow.
    pub viewer_is_owner: bool,
}

impl CompanyProps {
    pub fn from_store(store: &OptimisticStore<Company>, session: &Session) -> Self {
        let company = store.view().clone();
        Self {
            is_followed: company.is_followed,
            num_followers: company.num_followers,
            is_follow_pending: store.is_pending::<CompanyFollowed>(),
            error: store.error().map(str::to_owned),
            viewer_is_owner: company
                .owner_id
                .as_deref()
                .is_some_and(|owner| session.is_viewer(owner)),
            company,
        }
    }
}

/// Header of a company page with the follow button.
pub struct CompanyHeader<'c, C, X> {
    ctx: &'c AppContext<C, X>,
    store: StoreHandle<Company>,
}

impl<'c, C: ResourceCache, X: Remote> CompanyHeader<'c, C, X> {
    pub fn new(ctx: &'c AppContext<C, X>, company: Company) -> Self {
        Self {
            ctx,
            store: super::mount(ctx, company),
        }
    }

    pub async fn load(ctx: &'c AppContext<C, X>, id: &str) -> Result<Option<Self>, AppError> {
        Ok(super::load::<Company, C, X>(ctx, id)
            .await?
            .map(|company| Self::new(ctx, company)))
    }

    pub fn store(&self) -> &StoreHandle<Company> {
        &self.store
    }

    pub fn props(&self) -> Result<CompanyProps, AppError> {
        let session = self.ctx.session();
        Ok(self
            .store
            .read(|store| CompanyProps::from_store(store, session))?)
    }

    pub fn dismiss_error(&self) -> Result<Option<String>, AppError> {
        Ok(self.store.take_error()?)
    }

    pub async fn follow(&self) -> Result<Reconciliation, AppError> {
        self.ctx
            .reconciler()
            .mutate::<CompanyFollowed>(&self.store, true)
            .await
    }

    pub async fn unfollow(&self) -> Result<Reconciliation, AppError> {
        self.ctx
            .reconciler()
            .mutate::<CompanyFollowed>(&self.store, false)
            .await
    }

    pub async fn toggle_follow(&self) -> Result<Reconciliation, AppError> {
        self.ctx
            .reconciler()
            .toggle::<CompanyFollowed>(&self.store)
            .await
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        self.ctx.reconciler().refresh(&self.store).await?;
        Ok(())
    }

    pub fn unmount(self) -> Result<(), AppError> {
        Ok(self.store.unmount()?)
    }
}
