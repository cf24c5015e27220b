use serde::Serialize;
use std::{collections::BTreeMap, fmt};

///
/// err
/// push a formatted message onto an `ErrorTree`
///

#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

///
/// ErrorTree
///
/// Aggregated, route-keyed error collection. Build stages push every
/// problem they find instead of stopping at the first one, so a single
/// compile run reports all misconfigured types at once.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, ErrorTree>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Build a tree holding a single root-level message.
    #[must_use]
    pub fn from_message(message: impl fmt::Display) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }

    pub fn add(&mut self, message: impl fmt::Display) {
        self.messages.push(message.to_string());
    }

    /// Record a message under a route (typically a type path).
    pub fn add_for(&mut self, route: impl Into<String>, message: impl fmt::Display) {
        self.children
            .entry(route.into())
            .or_default()
            .add(message);
    }

    /// Graft another tree beneath `route`.
    pub fn merge_for(&mut self, route: impl Into<String>, other: Self) {
        if other.is_empty() {
            return;
        }

        self.children.entry(route.into()).or_default().merge(other);
    }

    /// Merge another tree into this one at the same level.
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        for (route, child) in other.children {
            self.merge_for(route, child);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of messages in the tree, children included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Messages recorded directly under `route`.
    #[must_use]
    pub fn messages_for(&self, route: &str) -> &[String] {
        self.children
            .get(route)
            .map_or(&[], |child| child.messages.as_slice())
    }

    /// Flatten into `route: message` lines, depth-first.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<String>) {
        for message in &self.messages {
            if prefix.is_empty() {
                out.push(message.clone());
            } else {
                out.push(format!("{prefix}: {message}"));
            }
        }

        for (route, child) in &self.children {
            let next = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix}.{route}")
            };
            child.flatten_into(&next, out);
        }
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.flatten();
        write!(f, "{}", lines.join("; "))
    }
}

impl std::error::Error for ErrorTree {}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_ok() {
        assert!(ErrorTree::new().result().is_ok());
    }

    #[test]
    fn routed_messages_flatten_with_prefix() {
        let mut errs = ErrorTree::new();
        err!(errs, "top {}", 1);
        errs.add_for("app::Person", "bad constructor");

        let mut nested = ErrorTree::new();
        nested.add_for("child", "missing");
        errs.merge_for("app::Order", nested);

        assert_eq!(errs.len(), 3);
        assert_eq!(
            errs.flatten(),
            vec![
                "top 1".to_string(),
                "app::Order.child: missing".to_string(),
                "app::Person: bad constructor".to_string(),
            ]
        );
        assert_eq!(errs.messages_for("app::Person"), ["bad constructor"]);
    }

    #[test]
    fn merging_empty_tree_adds_no_route() {
        let mut errs = ErrorTree::new();
        errs.merge_for("app::Empty", ErrorTree::new());

        assert!(errs.children.is_empty());
        assert!(errs.result().is_ok());
    }
}
