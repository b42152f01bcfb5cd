//! In-memory command store

use crate::command::{Command, Request};
use crate::error::ValidationError;
use std::collections::BTreeMap;

/// Whether [`CommandStore::add`] created a new entry or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No command with that name existed
    Inserted,
    /// An existing command was overwritten
    Replaced,
}

/// Commands keyed by name
///
/// Iteration is in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStore {
    commands: BTreeMap<String, Command>,
}

impl CommandStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a request and store it under `name`, replacing any existing entry
    pub fn add(&mut self, name: &str, request: &Request) -> Result<AddOutcome, ValidationError> {
        let command = Command::from_request(name, request)?;
        Ok(self.insert(command))
    }

    /// Store an already validated command, replacing any existing entry
    pub fn insert(&mut self, command: Command) -> AddOutcome {
        match self.commands.insert(command.name.clone(), command) {
            Some(_) => AddOutcome::Replaced,
            None => AddOutcome::Inserted,
        }
    }

    /// Delete a command, returning whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.commands.remove(name).is_some()
    }

    /// Delete all commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Look up a command by name
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Check whether a command exists
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the store holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over commands in name order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn led_on() -> Request {
        Request::new("0001010", "", "11111111", 0, 1)
    }

    #[test]
    fn test_add_and_replace() {
        let mut store = CommandStore::new();
        assert_eq!(store.add("LED_ON", &led_on()), Ok(AddOutcome::Inserted));
        assert_eq!(
            store.add("LED_ON", &Request::new("1", "", "0", 0, 2)),
            Ok(AddOutcome::Replaced)
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("LED_ON").unwrap().address, "0000001");
    }

    #[test]
    fn test_rejected_add_leaves_store_unchanged() {
        let mut store = CommandStore::new();
        store.add("LED_ON", &led_on()).unwrap();

        let err = store
            .add("LED_ON", &Request::new("1", "", "2", 0, 1))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidData("2".into()));
        assert_eq!(store.get("LED_ON").unwrap().data, "11111111");
    }

    #[test]
    fn test_name_with_line_break_rejected() {
        let mut store = CommandStore::new();
        for name in ["a\nLED_ON", "a\rb", "trailing\r\n"] {
            assert_eq!(
                store.add(name, &led_on()),
                Err(ValidationError::InvalidName(name.to_string()))
            );
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = CommandStore::new();
        store.add("a", &led_on()).unwrap();
        store.add("b", &led_on()).unwrap();

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.contains("b"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut store = CommandStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store.add(name, &led_on()).unwrap();
        }
        let names: Vec<_> = store.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
