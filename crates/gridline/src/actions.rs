//! Row action callbacks.

use gridline_core::Record;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A row action callback: receives the action name and the full record.
pub type ActionHandler = Rc<dyn Fn(&str, &Record)>;

/// Callbacks for row actions, by action name.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    handlers: HashMap<String, ActionHandler>,
    fallback: Option<ActionHandler>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ActionRegistry")
            .field("handlers", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ActionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one action.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Fn(&Record) + 'static) {
        self.handlers
            .insert(name.into(), Rc::new(move |_: &str, record: &Record| handler(record)));
    }

    /// Register a callback for every action without a dedicated one.
    pub fn register_fallback(&mut self, handler: impl Fn(&str, &Record) + 'static) {
        self.fallback = Some(Rc::new(handler));
    }

    /// Callback for an action.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ActionHandler> {
        self.handlers
            .get(name)
            .or(self.fallback.as_ref())
            .map(Rc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_register_and_resolve() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut registry = ActionRegistry::new();
        registry.register("delete", move |r: &Record| {
            log.borrow_mut().push(r.display("id").unwrap_or_default());
        });

        let handler = registry.resolve("delete").unwrap();
        handler("delete", &Record::new().cell("id", 7));
        assert_eq!(*seen.borrow(), vec!["7"]);
        assert!(registry.resolve("archive").is_none());
    }

    #[test]
    fn test_fallback_receives_name() {
        let seen = Rc::new(RefCell::new(String::new()));
        let log = Rc::clone(&seen);
        let mut registry = ActionRegistry::new();
        registry.register_fallback(move |name: &str, _: &Record| {
            log.borrow_mut().push_str(name);
        });

        registry.resolve("archive").unwrap()("archive", &Record::new());
        assert_eq!(*seen.borrow(), "archive");
    }
}
