//! Naming conventions for actions and handler types.
//!
//! Every string rule used to turn path segments into action method names or
//! type names lives here, so that changes to the conventions never touch the
//! resolver's control flow.
//!
//! # Rules
//! - Action: `camelCase(lowercase(method) + "_" + name) + "Action"`, which
//!   must be ASCII alphanumeric
//! - Controller: directive `foo_bar-baz` → `FooBar\Controller\BazController`
//! - Handler: directive `stats` → `Server\Handler\StatsHandler`
//! - Application: directive `my_app` → `My\App\Application`
//!
//! Capitalization is ASCII-only and never lowercases the remaining
//! characters of a word.

use crate::routing::RoutingError;

/// Namespace prefix shared by the built-in handlers.
pub const HANDLER_NAMESPACE: &str = "Server\\Handler\\";

/// Type name of the generic handler contract every data route falls back to.
pub const DEFAULT_HANDLER: &str = "Server\\Handler\\HandlerInterface";

const ACTION_SUFFIX: &str = "Action";

/// Uppercase the first ASCII character of `word`.
pub fn ucfirst(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Lowercase the first ASCII character of `word`.
fn lcfirst(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_lowercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Capitalize each word delimited by `_` or a space and join them with
/// `separator`.
fn join_words(input: &str, separator: &str) -> String {
    input
        .split(['_', ' '])
        .map(ucfirst)
        .collect::<Vec<_>>()
        .join(separator)
}

/// `post_create_all` → `postCreateAll`.
pub fn underscore_to_camel_case(input: &str) -> String {
    lcfirst(&join_words(input, ""))
}

/// Build the action method name for `method` and a directive or segment name.
///
/// Fails with [`RoutingError::InvalidActionName`] when the result contains
/// anything outside `[A-Za-z0-9]`. Whether the action exists is not checked.
pub fn action_name(method: &str, name: &str) -> Result<String, RoutingError> {
    let mut action = underscore_to_camel_case(&format!("{}_{}", method.to_ascii_lowercase(), name));
    action.push_str(ACTION_SUFFIX);

    if !action.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RoutingError::InvalidActionName { action });
    }
    Ok(action)
}

/// Controller type name encoded by a directive of the form
/// `<namespace>-<controller>`, or `None` if the directive has no dash.
///
/// Underscores (and spaces) collapse into camel-cased words, each dash
/// becomes a namespace separator, and the last dash-separated token names
/// the controller inside that namespace's `Controller` sub-namespace.
pub fn controller_class_name(directive: &str) -> Option<String> {
    let collapsed = join_words(directive, "");
    let (namespace, controller) = collapsed.rsplit_once('-')?;

    let namespace = namespace
        .split('-')
        .map(ucfirst)
        .collect::<Vec<_>>()
        .join("\\");

    Some(format!(
        "{}\\Controller\\{}Controller",
        namespace,
        ucfirst(controller)
    ))
}

/// Application aggregate type name for a directive.
pub fn application_class_name(directive: &str) -> String {
    format!("{}\\Application", join_words(directive, "\\"))
}

/// Built-in handler type name for a directive.
pub fn handler_class_name(directive: &str) -> String {
    format!("{}{}Handler", HANDLER_NAMESPACE, ucfirst(directive))
}
