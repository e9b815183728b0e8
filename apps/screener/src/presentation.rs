//! Seams to the presentation layer.
//!
//! The core never renders anything itself; it reports through a [`Notifier`]
//! and moves the user with a [`Navigator`]. Both are fire-and-forget.

use std::fmt;
use std::sync::Mutex;

use crate::models::CandidateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Shows a transient message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Navigation targets the core can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CandidateDetail(CandidateId),
    CandidateList,
}

impl Route {
    /// Detail route when an id is known, else the list.
    pub fn for_candidate(id: Option<CandidateId>) -> Self {
        match id {
            Some(id) => Route::CandidateDetail(id),
            None => Route::CandidateList,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::CandidateDetail(id) => format!("/candidates/{id}"),
            Route::CandidateList => "/candidates".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that remembers the last requested route for the host to act on.
#[derive(Debug, Default)]
pub struct RouteRecorder {
    last: Mutex<Option<Route>>,
}

impl RouteRecorder {
    pub fn take(&self) -> Option<Route> {
        self.last.lock().ok().and_then(|mut last| last.take())
    }
}

impl Navigator for RouteRecorder {
    fn navigate(&self, route: Route) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(route);
        }
    }
}
