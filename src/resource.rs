use futures::future::{BoxFuture, Either, FutureExt, Ready, Shared, ready};
use parking_lot::Mutex;
use std::error::Error as StdError;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::{Arc, Weak};
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;
pub type LoadResult<T> = Result<Arc<T>, ResourceError>;
pub type LoadFuture<T> = Shared<BoxFuture<'static, LoadResult<T>>>;

type Loader<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, BoxError>> + Send + Sync>;

#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("resource '{id}' is not loaded yet")]
    NotReady { id: Arc<str> },
    #[error("resource '{id}' failed to load: {cause}")]
    LoadFailed {
        id: Arc<str>,
        cause: Arc<dyn StdError + Send + Sync>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Unrequested,
    Pending,
    Resolved,
}

enum ResourceState<T> {
    Unrequested,
    Pending(LoadFuture<T>),
    Resolved(LoadResult<T>),
}

impl<T> ResourceState<T> {
    fn status(&self) -> ResourceStatus {
        match self {
            Self::Unrequested => ResourceStatus::Unrequested,
            Self::Pending(_) => ResourceStatus::Pending,
            Self::Resolved(_) => ResourceStatus::Resolved,
        }
    }
}

struct ResourceInner<T> {
    id: Arc<str>,
    loader: Loader<T>,
    state: Mutex<ResourceState<T>>,
}

/// Outcome of [`Resource::load`].
///
/// Awaiting any variant yields the shared load result. Only `Started` carries
/// a fetch nobody is driving yet.
pub enum Load<T> {
    Started(LoadFuture<T>),
    InFlight(LoadFuture<T>),
    Ready(LoadResult<T>),
}

impl<T> Load<T> {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

impl<T: Send + Sync + 'static> IntoFuture for Load<T> {
    type Output = LoadResult<T>;
    type IntoFuture = Either<LoadFuture<T>, Ready<LoadResult<T>>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Started(pending) | Self::InFlight(pending) => Either::Left(pending),
            Self::Ready(result) => Either::Right(ready(result)),
        }
    }
}

impl<T> fmt::Debug for Load<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started(_) => f.write_str("Load::Started"),
            Self::InFlight(_) => f.write_str("Load::InFlight"),
            Self::Ready(result) => write!(f, "Load::Ready(ok = {})", result.is_ok()),
        }
    }
}

/// A code-split unit fetched at most once.
///
/// State only moves forward: unrequested, pending, resolved. A failed fetch
/// resolves the unit with its error.
pub struct Resource<T> {
    inner: Arc<ResourceInner<T>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Resource<T> {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn status(&self) -> ResourceStatus {
        self.inner.state.lock().status()
    }
}

impl<T: Send + Sync + 'static> Resource<T> {
    pub fn new<F, Fut, E>(id: impl Into<Arc<str>>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let loader: Loader<T> =
            Box::new(move || loader().map(|res| res.map_err(Into::<BoxError>::into)).boxed());
        Self {
            inner: Arc::new(ResourceInner {
                id: id.into(),
                loader,
                state: Mutex::new(ResourceState::Unrequested),
            }),
        }
    }

    /// Returns the loaded value without blocking.
    pub fn get(&self) -> LoadResult<T> {
        match &*self.inner.state.lock() {
            ResourceState::Resolved(result) => result.clone(),
            _ => Err(ResourceError::NotReady {
                id: Arc::clone(&self.inner.id),
            }),
        }
    }

    /// Starts the fetch on first call; later calls reuse it.
    ///
    /// The loader runs without the state lock held, so it may inspect this
    /// resource. If another caller installs a fetch first, the future built
    /// here is dropped without being polled.
    pub fn load(&self) -> Load<T> {
        if let Some(existing) = self.existing() {
            return existing;
        }

        let pending = self.fetch().shared();
        let mut state = self.inner.state.lock();
        match &*state {
            ResourceState::Resolved(result) => return Load::Ready(result.clone()),
            ResourceState::Pending(current) => return Load::InFlight(current.clone()),
            ResourceState::Unrequested => {}
        }
        *state = ResourceState::Pending(pending.clone());
        tracing::trace!(resource = %self.inner.id, "resource fetch started");
        Load::Started(pending)
    }

    fn existing(&self) -> Option<Load<T>> {
        match &*self.inner.state.lock() {
            ResourceState::Resolved(result) => Some(Load::Ready(result.clone())),
            ResourceState::Pending(pending) => Some(Load::InFlight(pending.clone())),
            ResourceState::Unrequested => None,
        }
    }

    fn fetch(&self) -> BoxFuture<'static, LoadResult<T>> {
        let id = Arc::clone(&self.inner.id);
        let weak: Weak<ResourceInner<T>> = Arc::downgrade(&self.inner);
        let fetching = (self.inner.loader)();

        async move {
            let result = fetching.await.map(Arc::new).map_err(|err| {
                ResourceError::LoadFailed {
                    id: Arc::clone(&id),
                    cause: Arc::from(err),
                }
            });

            if let Some(inner) = weak.upgrade() {
                *inner.state.lock() = ResourceState::Resolved(result.clone());
            }
            tracing::trace!(resource = %id, ok = result.is_ok(), "resource fetch settled");
            result
        }
        .boxed()
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.inner.id)
            .field("status", &self.inner.state.lock().status())
            .finish()
    }
}
