//! Role-based navigation.
//!
//! The console shell shows a fixed table of destinations. What a session may
//! see is a pure function of its role ([`filter`]); the [`Router`] keeps the
//! current pathname and refuses destinations outside the filtered table.

use serde::Serialize;
use tracing::{debug, warn};

use crate::token::Role;

pub const DEFAULT_PATH: &str = "/orders";
pub const LOGOUT_SEGMENT: &str = "logout";
const FALLBACK_TITLE: &str = "Dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavigationEntry {
    Header {
        title: &'static str,
    },
    Divider,
    Page {
        segment: &'static str,
        title: &'static str,
        icon: &'static str,
    },
}

impl NavigationEntry {
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            NavigationEntry::Page { segment, .. } => Some(*segment),
            _ => None,
        }
    }
}

/// Every destination, in display order.
pub const NAVIGATION: &[NavigationEntry] = &[
    NavigationEntry::Header { title: "Menu" },
    NavigationEntry::Page {
        segment: "orders",
        title: "Orders",
        icon: "task",
    },
    NavigationEntry::Page {
        segment: "products",
        title: "Products",
        icon: "inventory",
    },
    NavigationEntry::Page {
        segment: "stores",
        title: "Stores",
        icon: "store",
    },
    NavigationEntry::Divider,
    NavigationEntry::Page {
        segment: LOGOUT_SEGMENT,
        title: "Log Out",
        icon: "logout",
    },
];

/// Segments a USER session may open.
const USER_SEGMENTS: &[&str] = &["orders", LOGOUT_SEGMENT];

/// Entries visible to `role`. Unknown or missing roles see nothing.
pub fn filter(role: Option<&Role>, table: &[NavigationEntry]) -> Vec<NavigationEntry> {
    match role {
        Some(Role::Admin) => table.to_vec(),
        Some(Role::User) => table
            .iter()
            .filter(|entry| match entry.segment() {
                Some(segment) => USER_SEGMENTS.contains(&segment),
                None => true,
            })
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

fn segment_of(path: &str) -> &str {
    path.trim().trim_start_matches('/').trim_end_matches('/')
}

/// Page title for `path`, or "Dashboard" when nothing matches.
pub fn title_for(path: &str) -> &'static str {
    let segment = segment_of(path);
    NAVIGATION
        .iter()
        .find_map(|entry| match entry {
            NavigationEntry::Page {
                segment: s, title, ..
            } if *s == segment => Some(*title),
            _ => None,
        })
        .unwrap_or(FALLBACK_TITLE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum NavigationOutcome {
    Navigated { pathname: String },
    Ignored,
    /// The caller must end the session; the router has already reset.
    Logout,
}

/// Current pathname plus the menu for the current role.
#[derive(Debug, Clone)]
pub struct Router {
    pathname: String,
    role: Option<Role>,
    menu: Vec<NavigationEntry>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Router {
    pub fn new(role: Option<Role>) -> Self {
        let menu = filter(role.as_ref(), NAVIGATION);
        Self {
            pathname: DEFAULT_PATH.to_string(),
            role,
            menu,
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn title(&self) -> &'static str {
        title_for(&self.pathname)
    }

    pub fn menu(&self) -> &[NavigationEntry] {
        &self.menu
    }

    /// Recompute the menu only when the role actually changed.
    pub fn set_role(&mut self, role: Option<Role>, authenticated: bool) {
        if self.role == role {
            return;
        }
        self.menu = filter(role.as_ref(), NAVIGATION);
        if authenticated && self.menu.is_empty() {
            warn!(
                role = role.as_ref().map(Role::as_str).unwrap_or("<none>"),
                "role has no navigation entries; only logout is reachable"
            );
        }
        self.role = role;
    }

    fn allows(&self, segment: &str) -> bool {
        self.menu.iter().any(|e| e.segment() == Some(segment))
    }

    /// Request a destination. Anything outside the filtered menu is ignored.
    /// `/logout` is always accepted.
    pub fn navigate(&mut self, path: &str) -> NavigationOutcome {
        let segment = segment_of(path);
        if segment == LOGOUT_SEGMENT {
            self.reset();
            return NavigationOutcome::Logout;
        }
        if !self.allows(segment) {
            debug!(path, "navigation ignored");
            return NavigationOutcome::Ignored;
        }
        self.pathname = format!("/{segment}");
        NavigationOutcome::Navigated {
            pathname: self.pathname.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.pathname = DEFAULT_PATH.to_string();
    }
}
