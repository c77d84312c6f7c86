use crate::cache::ResourceCache;
use crate::domain::{Job, JobApplied, JobReported, JobSaved};
use crate::error::AppError;
use crate::optimistic::{OptimisticStore, Reconciliation, StoreHandle};
use crate::remote::Remote;
use crate::session::{AppContext, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobPending {
    pub saved: bool,
    pub reported: bool,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobProps {
    pub job: Job,
    pub is_saved: bool,
    pub is_reported: bool,
    pub is_applied: bool,
    pub num_applicants: u32,
    pub pending: JobPending,
    pub error: Option<String>,
    /// The viewer posted this listing; apply is hidden for them.
    pub viewer_is_poster: bool,
}

impl JobProps {
    pub fn from_store(store: &OptimisticStore<Job>, session: &Session) -> Self {
        let job = store.view().clone();
        Self {
            is_saved: job.is_saved,
            is_reported: job.is_reported,
            is_applied: job.is_applied,
            num_applicants: job.num_applicants,
            pending: JobPending {
                saved: store.is_pending::<JobSaved>(),
                reported: store.is_pending::<JobReported>(),
                applied: store.is_pending::<JobApplied>(),
            },
            error: store.error().map(str::to_owned),
            viewer_is_poster: job
                .poster_id
                .as_deref()
                .is_some_and(|poster| session.is_viewer(poster)),
            job,
        }
    }
}

pub struct JobCard<'c, C, X> {
    ctx: &'c AppContext<C, X>,
    store: StoreHandle<Job>,
}

impl<'c, C: ResourceCache, X: Remote> JobCard<'c, C, X> {
    pub fn new(ctx: &'c AppContext<C, X>, job: Job) -> Self {
        Self {
            ctx,
            store: super::mount(ctx, job),
        }
    }

    pub async fn load(ctx: &'c AppContext<C, X>, id: &str) -> Result<Option<Self>, AppError> {
        Ok(super::load::<Job, C, X>(ctx, id)
            .await?
            .map(|job| Self::new(ctx, job)))
    }

    pub fn store(&self) -> &StoreHandle<Job> {
        &self.store
    }

    pub fn props(&self) -> Result<JobProps, AppError> {
        let session = self.ctx.session();
        Ok(self.store.read(|store| JobProps::from_store(store, session))?)
    }

    pub fn dismiss_error(&self) -> Result<Option<String>, AppError> {
        Ok(self.store.take_error()?)
    }

    pub async fn toggle_save(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().toggle::<JobSaved>(&self.store).await
    }

    pub async fn toggle_report(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().toggle::<JobReported>(&self.store).await
    }

    /// One-click apply.
    pub async fn apply(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().mutate::<JobApplied>(&self.store, true).await
    }

    pub async fn withdraw(&self) -> Result<Reconciliation, AppError> {
        self.ctx.reconciler().mutate::<JobApplied>(&self.store, false).await
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        self.ctx.reconciler().refresh(&self.store).await?;
        Ok(())
    }

    pub fn unmount(self) -> Result<(), AppError> {
        Ok(self.store.unmount()?)
    }
}
