//! Debug facilities: watched variables, the on-screen print channel and
//! line drawing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec3;
use tracing::warn;

use crate::variable::Variable;

/// Variables shown in the debug overlay
///
/// Entries are weak; a variable dropped elsewhere disappears from the registry.
#[derive(Debug, Default)]
pub struct DebugRegistry {
    entries: Vec<Weak<RefCell<Variable>>>,
}

impl DebugRegistry {
    pub fn add(&mut self, variable: &Rc<RefCell<Variable>>) {
        self.prune();
        if !self.contains(variable) {
            self.entries.push(Rc::downgrade(variable));
        }
    }

    pub fn remove(&mut self, variable: &Rc<RefCell<Variable>>) {
        let target = Rc::downgrade(variable);
        self.entries.retain(|entry| !entry.ptr_eq(&target) && entry.strong_count() > 0);
    }

    pub fn contains(&self, variable: &Rc<RefCell<Variable>>) -> bool {
        let target = Rc::downgrade(variable);
        self.entries.iter().any(|entry| entry.ptr_eq(&target))
    }

    /// Drop entries whose variable no longer exists
    pub fn prune(&mut self) {
        self.entries.retain(|entry| entry.strong_count() > 0);
    }

    /// Live watched variables
    pub fn variables(&self) -> Vec<Rc<RefCell<Variable>>> {
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

const SCREEN_LINES: usize = 64;

/// Best-effort print channel shown on screen
#[derive(Debug, Default)]
pub struct DebugScreen {
    lines: Vec<String>,
}

impl DebugScreen {
    pub fn print(&mut self, message: &str) {
        warn!(target: "debug_screen", "{}", message);
        if self.lines.len() == SCREEN_LINES {
            self.lines.remove(0);
        }
        self.lines.push(message.to_string());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// A line queued for debug rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_forgets_dropped_variables() {
        let mut registry = DebugRegistry::default();
        let kept = Rc::new(RefCell::new(Variable::new("kept", 1)));
        let dropped = Rc::new(RefCell::new(Variable::new("dropped", 2)));

        registry.add(&kept);
        registry.add(&dropped);
        registry.add(&kept);
        assert_eq!(registry.variables().len(), 2);

        drop(dropped);
        registry.prune();
        assert_eq!(registry.variables().len(), 1);

        registry.remove(&kept);
        assert!(!registry.contains(&kept));
    }

    #[test]
    fn test_screen_keeps_recent_lines() {
        let mut screen = DebugScreen::default();
        for i in 0..(SCREEN_LINES + 3) {
            screen.print(&format!("line {}", i));
        }
        assert_eq!(screen.lines().len(), SCREEN_LINES);
        assert_eq!(screen.lines()[0], "line 3");
    }
}
