//! Administrative actions.
//!
//! A `POST` whose first path segment is `_shutdown` or `_restart` is a
//! process-control request. It bypasses route resolution entirely and is
//! forwarded to the notification sink.

use std::fmt;

use serde::Serialize;

use crate::routing::segment::segment_path;

/// Process-control action requested over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Shutdown,
    Restart,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Shutdown => "shutdown",
            AdminAction::Restart => "restart",
        }
    }

    /// Name of the event emitted when this action is requested.
    pub fn event_name(&self) -> &'static str {
        match self {
            AdminAction::Shutdown => "server.shutdown",
            AdminAction::Restart => "server.restart",
        }
    }

    fn from_directive(name: &str) -> Option<Self> {
        match name {
            "shutdown" => Some(AdminAction::Shutdown),
            "restart" => Some(AdminAction::Restart),
            _ => None,
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect an administrative action for `method` and `path`.
pub fn admin_action(method: &str, path: &str) -> Option<AdminAction> {
    if !method.eq_ignore_ascii_case("POST") {
        return None;
    }
    segment_path(path)
        .first()
        .and_then(|segment| segment.directive_name())
        .and_then(AdminAction::from_directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_actions() {
        assert_eq!(admin_action("POST", "/_shutdown"), Some(AdminAction::Shutdown));
        assert_eq!(admin_action("POST", "/_restart/now"), Some(AdminAction::Restart));
        assert_eq!(admin_action("post", "_shutdown"), Some(AdminAction::Shutdown));
    }

    #[test]
    fn test_non_admin_requests() {
        assert_eq!(admin_action("GET", "/_shutdown"), None);
        assert_eq!(admin_action("POST", "/mydb/_shutdown"), None);
        assert_eq!(admin_action("POST", "/shutdown"), None);
        assert_eq!(admin_action("POST", "/_shutdownnow"), None);
        assert_eq!(admin_action("POST", ""), None);
    }
}
