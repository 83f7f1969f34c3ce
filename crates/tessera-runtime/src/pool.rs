//! Page pooling.
//!
//! Building a page tree is comparatively expensive, so instances are
//! reused across requests:
//!
//! ```text
//!            checkout                         release
//! ┌────────┐ ───────► ┌───────────┐ ──────────────────► ┌────────┐
//! │  idle  │          │ PageLease │  detach, then park  │  idle  │
//! └────────┘          └───────────┘  (dropped over cap) └────────┘
//! ```
//!
//! A [`PageLease`] owns its page, so an instance serves one request at a
//! time. The lease is move-only; it goes back through
//! [`PageSource::release`].

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use tessera_component::Page;
use tracing::debug;

use crate::specification::ApplicationSpecification;
use crate::EngineError;

/// A page checked out for one request.
#[derive(Debug)]
pub struct PageLease {
    page: Page,
}

impl PageLease {
    fn new(page: Page) -> Self {
        Self { page }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.page.name()
    }

    /// Gives up the lease and keeps the page out of the pool.
    #[must_use]
    pub fn into_page(self) -> Page {
        self.page
    }
}

impl Deref for PageLease {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl DerefMut for PageLease {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.page
    }
}

/// Idle page instances keyed by page name.
#[derive(Debug)]
pub struct PagePool {
    idle: Mutex<HashMap<String, Vec<Page>>>,
    max_idle_per_page: usize,
}

impl PagePool {
    #[must_use]
    pub fn new(max_idle_per_page: usize) -> Self {
        Self {
            idle: Mutex::new(HashMap::new()),
            max_idle_per_page,
        }
    }

    /// An idle instance of `name`, if one is parked.
    pub fn checkout(&self, name: &str) -> Option<PageLease> {
        let page = self.idle.lock().get_mut(name)?.pop()?;
        debug!(page = name, "page checked out of pool");
        Some(PageLease::new(page))
    }

    /// Wraps a freshly built page.
    #[must_use]
    pub fn lease(&self, page: Page) -> PageLease {
        PageLease::new(page)
    }

    /// Detaches the page and parks it, unless the cap is reached.
    pub fn release(&self, lease: PageLease) {
        let mut page = lease.page;
        page.detach();
        let name = page.name().to_string();

        let mut idle = self.idle.lock();
        let parked = idle.entry(name.clone()).or_default();
        if parked.len() < self.max_idle_per_page {
            parked.push(page);
            debug!(page = %name, idle = parked.len(), "page returned to pool");
        } else {
            debug!(page = %name, "pool full, page dropped");
        }
    }

    /// Drops every idle instance; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut idle = self.idle.lock();
        let dropped = idle.values().map(Vec::len).sum();
        idle.clear();
        dropped
    }

    #[must_use]
    pub fn idle_count(&self, name: &str) -> usize {
        self.idle.lock().get(name).map_or(0, Vec::len)
    }
}

/// Obtains pages: from the pool when possible, else freshly built.
#[derive(Debug)]
pub struct PageSource {
    specification: ApplicationSpecification,
    pool: PagePool,
}

impl PageSource {
    #[must_use]
    pub fn new(specification: ApplicationSpecification, max_idle_per_page: usize) -> Self {
        Self {
            specification,
            pool: PagePool::new(max_idle_per_page),
        }
    }

    #[must_use]
    pub fn specification(&self) -> &ApplicationSpecification {
        &self.specification
    }

    #[must_use]
    pub fn pool(&self) -> &PagePool {
        &self.pool
    }

    /// A lease on an instance of `name`.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownPage`] or the page's build failure.
    pub fn obtain(&self, name: &str) -> Result<PageLease, EngineError> {
        if let Some(lease) = self.pool.checkout(name) {
            return Ok(lease);
        }
        let page = self.specification.build_page(name)?;
        Ok(self.pool.lease(page))
    }

    pub fn release(&self, lease: PageLease) {
        self.pool.release(lease);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::PageDefinition;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tessera_component::builtin::Insert;
    use tessera_types::ErrorCode;

    fn counting_source(max_idle: usize) -> (PageSource, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let spec = ApplicationSpecification::new("test").page(
            "Home",
            PageDefinition::new(move |builder| {
                counter.fetch_add(1, Ordering::SeqCst);
                builder.add(builder.root(), "name", Insert::property("name"))?;
                builder.property("name", json!("default"));
                Ok(())
            }),
        );
        (PageSource::new(spec, max_idle), builds)
    }

    #[test]
    fn released_pages_are_reused() {
        let (source, builds) = counting_source(4);

        let lease = source.obtain("Home").unwrap();
        assert_eq!(lease.name(), "Home");
        source.release(lease);
        assert_eq!(source.pool().idle_count("Home"), 1);

        let _again = source.obtain("Home").unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(source.pool().idle_count("Home"), 0);
    }

    #[test]
    fn concurrent_leases_get_distinct_instances() {
        let (source, builds) = counting_source(4);
        let first = source.obtain("Home").unwrap();
        let second = source.obtain("Home").unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);

        source.release(first);
        source.release(second);
        assert_eq!(source.pool().idle_count("Home"), 2);
    }

    #[test]
    fn release_detaches() {
        let (source, _) = counting_source(4);
        let mut lease = source.obtain("Home").unwrap();
        lease.set_property("name", json!("Ada"));
        source.release(lease);

        let lease = source.obtain("Home").unwrap();
        assert_eq!(lease.property("name"), Some(&json!("default")));
    }

    #[test]
    fn cap_and_clear() {
        let (source, _) = counting_source(1);
        let first = source.obtain("Home").unwrap();
        let second = source.obtain("Home").unwrap();
        source.release(first);
        source.release(second);
        assert_eq!(source.pool().idle_count("Home"), 1);

        assert_eq!(source.pool().clear(), 1);
        assert_eq!(source.pool().idle_count("Home"), 0);
    }

    #[test]
    fn unknown_page() {
        let (source, _) = counting_source(1);
        let err = source.obtain("Missing").unwrap_err();
        assert_eq!(err.code(), "ENGINE_UNKNOWN_PAGE");
    }
}
