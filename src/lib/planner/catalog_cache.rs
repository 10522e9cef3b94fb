//! Single-flight caching of the two catalog requests.
//!
//! Each resource gets one slot holding a [`Shared`] future. The slot is filled
//! before the request is first polled, so any number of callers asking before the
//! answer arrives all wait on the same request.
use std::{cell::RefCell, rc::Rc, sync::Arc};

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use log::{debug, info, warn};

use super::{
    catalog_getter::CatalogGetter,
    error::CatalogError,
    lecture_filter::Lectures,
    models::Config,
};

pub type CatalogResult = Result<Lectures, CatalogError>;
pub type CatalogFuture = Shared<LocalBoxFuture<'static, CatalogResult>>;

type Request = Box<dyn Fn() -> LocalBoxFuture<'static, CatalogResult>>;

pub struct CachedFetcher {
    name: String,
    slot: RefCell<Option<CatalogFuture>>,
    request: Request,
}

impl CachedFetcher {
    pub fn new<F>(name: impl Into<String>, request: F) -> Self
    where
        F: Fn() -> LocalBoxFuture<'static, CatalogResult> + 'static,
    {
        Self {
            name: name.into(),
            slot: RefCell::new(None),
            request: Box::new(request),
        }
    }

    /// The pending or finished request for this resource, starting it on first use.
    /// A request that ended in an error is replaced by a fresh one.
    pub fn get(&self) -> CatalogFuture {
        let mut slot = self.slot.borrow_mut();
        match slot.as_ref() {
            Some(cached) if !matches!(cached.peek(), Some(Err(_))) => {
                debug!("{}: reusing cached request", self.name);
                return cached.clone();
            }
            Some(_) => warn!("{}: previous request failed, requesting again", self.name),
            None => info!("{}: new request", self.name),
        }

        let request = (self.request)().shared();
        *slot = Some(request.clone());
        request
    }

    pub fn invalidate(&self) {
        self.slot.borrow_mut().take();
    }
}

/// Both halves of the catalog, each behind its own cache slot.
pub struct Catalog {
    majors: CachedFetcher,
    liberal_arts: CachedFetcher,
}

impl Catalog {
    pub fn new<CG: CatalogGetter + 'static>(getter: CG, config: &Config) -> Self {
        let getter = Rc::new(getter);
        Self {
            majors: CachedFetcher::new(
                config.majors_resource.clone(),
                request(Rc::clone(&getter), config.resource_url(&config.majors_resource)),
            ),
            liberal_arts: CachedFetcher::new(
                config.liberal_arts_resource.clone(),
                request(getter, config.resource_url(&config.liberal_arts_resource)),
            ),
        }
    }

    pub fn majors(&self) -> CatalogFuture {
        self.majors.get()
    }

    pub fn liberal_arts(&self) -> CatalogFuture {
        self.liberal_arts.get()
    }

    /// Majors followed by liberal arts, as one list.
    pub async fn fetch_all_lectures(&self) -> CatalogResult {
        let (majors, liberal_arts) = future::join(self.majors(), self.liberal_arts()).await;
        let (majors, liberal_arts) = (majors?, liberal_arts?);
        let lectures = majors
            .iter()
            .chain(liberal_arts.iter())
            .cloned()
            .collect::<Vec<_>>();
        info!("Loaded {} lectures", lectures.len());
        Ok(Arc::new(lectures))
    }

    pub fn invalidate(&self) {
        self.majors.invalidate();
        self.liberal_arts.invalidate();
    }
}

fn request<CG: CatalogGetter + 'static>(
    getter: Rc<CG>,
    url: String,
) -> impl Fn() -> LocalBoxFuture<'static, CatalogResult> {
    move || {
        let getter = Rc::clone(&getter);
        let url = url.clone();
        async move {
            let lectures = getter.get_lectures(&url).await?;
            Ok::<Lectures, CatalogError>(Arc::new(lectures.into_iter().map(Arc::new).collect()))
        }
        .boxed_local()
    }
}
