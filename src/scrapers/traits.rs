use crate::error::ScrapeError;
use crate::models::MatchRecord;
use anyhow::Result;
use std::ops::Deref;
use std::time::Duration;

/// Blocking operations the pipeline needs from a live browser tab.
///
/// Selectors are CSS. Lookups that find nothing return an empty list rather
/// than an error; only waits and clicks fail on missing elements.
pub trait PageDriver {
    /// Load `url` and wait for the navigation to settle
    fn goto(&self, url: &str) -> Result<()>;

    /// Block until an element matching `selector` exists, or fail after `timeout`
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Rendered inner text of every element matching `selector`, in document order
    fn texts(&self, selector: &str) -> Result<Vec<String>>;

    /// Click the `index`-th element matching `selector`
    fn click(&self, selector: &str, index: usize) -> Result<()>;

    /// HTML of the currently rendered DOM
    fn snapshot(&self) -> Result<String>;
}

/// Owner of browser sessions.
///
/// Use [`SessionManager::scoped`] rather than pairing `acquire`/`release` by
/// hand: the returned guard releases the session when it goes out of scope,
/// whichever way the scope is left.
pub trait SessionManager {
    type Session: PageDriver;

    fn acquire(&self) -> Result<Self::Session, ScrapeError>;

    fn release(&self, session: Self::Session);

    fn scoped(&self) -> Result<SessionGuard<'_, Self>, ScrapeError>
    where
        Self: Sized,
    {
        let session = self.acquire()?;
        Ok(SessionGuard {
            manager: self,
            session: Some(session),
        })
    }
}

/// A session borrowed from its manager, released on drop
pub struct SessionGuard<'m, M: SessionManager> {
    manager: &'m M,
    session: Option<M::Session>,
}

impl<M: SessionManager> Deref for SessionGuard<'_, M> {
    type Target = M::Session;

    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the session out.
        match &self.session {
            Some(session) => session,
            None => unreachable!("session already released"),
        }
    }
}

impl<M: SessionManager> Drop for SessionGuard<'_, M> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.manager.release(session);
        }
    }
}

/// Destination of finished match records
pub trait RecordSink {
    /// Append one record to the league's output
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn append(&mut self, league: &str, record: &MatchRecord) -> Result<()> {
        (**self).append(league, record)
    }
}
