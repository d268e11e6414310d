// src/state.rs
//! Ordered, keyed widget collection with dirty tracking.
//!
//! Insertion order is paint order. A key is dirty once its value changed (or
//! its widget was added, replaced or removed) and stays dirty until
//! [`State::reset`], which the view calls exactly once per completed frame.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::StateError;
use crate::ui::Widget;

/// Value-change callback: `(previous, new)`.
///
/// Called synchronously on the setter's thread while the state is borrowed;
/// it must not call back into the view.
pub type Listener = Box<dyn Fn(Option<&str>, Option<&str>) + Send + Sync>;

struct Entry {
    key: String,
    widget: Widget,
}

#[derive(Default)]
pub struct State {
    entries: Vec<Entry>,
    dirty: HashSet<String>,
    listeners: HashMap<String, Vec<Listener>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn notify(&self, key: &str, prev: Option<&str>, new: Option<&str>) {
        if let Some(listeners) = self.listeners.get(key) {
            for listener in listeners {
                listener(prev, new);
            }
        }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Append a widget; it paints after every existing one.
    pub fn add_element(&mut self, key: impl Into<String>, widget: impl Into<Widget>) -> Result<(), StateError> {
        let key = key.into();
        if self.has_element(&key) {
            return Err(StateError::DuplicateKey(key));
        }
        debug!("State: added '{}'", key);
        self.dirty.insert(key.clone());
        self.entries.push(Entry {
            key,
            widget: widget.into(),
        });
        Ok(())
    }

    /// Remove a widget, returning it. Paint order of the rest is unchanged.
    pub fn remove_element(&mut self, key: &str) -> Option<Widget> {
        let idx = self.position(key)?;
        let entry = self.entries.remove(idx);
        debug!("State: removed '{}'", key);
        self.dirty.insert(entry.key);
        Some(entry.widget)
    }

    pub fn has_element(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn widget(&self, key: &str) -> Option<&Widget> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.widget)
    }

    /// Mutable access to a widget. Does not mark the key dirty; see [`State::touch`].
    pub fn widget_mut(&mut self, key: &str) -> Option<&mut Widget> {
        self.entries
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.widget)
    }

    /// Replace the widget under an existing key.
    pub fn set_widget(&mut self, key: &str, widget: impl Into<Widget>) -> Result<(), StateError> {
        let idx = self
            .position(key)
            .ok_or_else(|| StateError::UnknownKey(key.to_owned()))?;
        let widget = widget.into();

        let prev = self.entries[idx].widget.value().map(str::to_owned);
        let new = widget.value().map(str::to_owned);
        self.entries[idx].widget = widget;
        self.dirty.insert(key.to_owned());

        if prev != new {
            self.notify(key, prev.as_deref(), new.as_deref());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Current value of a widget, `None` for unknown keys and shapes.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.widget(key).and_then(Widget::value)
    }

    /// Assign a value, returning whether it changed.
    ///
    /// An equal value is not a change: the key stays clean and no listener is
    /// called.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool, StateError> {
        let idx = self
            .position(key)
            .ok_or_else(|| StateError::UnknownKey(key.to_owned()))?;

        let widget = &mut self.entries[idx].widget;
        if !widget.carries_value() {
            return Err(StateError::NoValue(key.to_owned()));
        }
        let prev = widget.value().map(str::to_owned);
        if widget.set_value(value) != Some(true) {
            return Ok(false);
        }

        self.dirty.insert(key.to_owned());
        self.notify(key, prev.as_deref(), Some(value));
        Ok(true)
    }

    /// Remove the value of `key`; text widgets then draw nothing.
    pub fn unset(&mut self, key: &str) -> Result<bool, StateError> {
        let idx = self
            .position(key)
            .ok_or_else(|| StateError::UnknownKey(key.to_owned()))?;

        let widget = &mut self.entries[idx].widget;
        let prev = widget.value().map(str::to_owned);
        match widget.clear_value() {
            None => return Err(StateError::NoValue(key.to_owned())),
            Some(false) => return Ok(false),
            Some(true) => {}
        }
        let new = widget.value().map(str::to_owned);

        self.dirty.insert(key.to_owned());
        self.notify(key, prev.as_deref(), new.as_deref());
        Ok(true)
    }

    /// Register a callback for value changes of `key`.
    ///
    /// The key does not need to exist yet. Callbacks run in registration order.
    pub fn add_listener(
        &mut self,
        key: impl Into<String>,
        listener: impl Fn(Option<&str>, Option<&str>) + Send + Sync + 'static,
    ) {
        self.listeners
            .entry(key.into())
            .or_default()
            .push(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Mark a key dirty without changing it.
    pub fn touch(&mut self, key: &str) {
        self.dirty.insert(key.to_owned());
    }

    /// Dirty keys minus `ignore`, in paint order (removed keys last).
    pub fn changes(&self, ignore: &[&str]) -> Vec<String> {
        let keep = |k: &str| self.dirty.contains(k) && !ignore.contains(&k);

        let mut out: Vec<String> = self
            .entries
            .iter()
            .filter(|e| keep(e.key.as_str()))
            .map(|e| e.key.clone())
            .collect();

        let mut removed: Vec<String> = self
            .dirty
            .iter()
            .filter(|k| !self.has_element(k) && !ignore.contains(&k.as_str()))
            .cloned()
            .collect();
        removed.sort();
        out.extend(removed);
        out
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    /// Clear every dirty marker.
    pub fn reset(&mut self) {
        self.dirty.clear();
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// `(key, widget)` pairs in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Widget)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.widget))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Widget)> {
        self.entries
            .iter_mut()
            .map(|e| (e.key.as_str(), &mut e.widget))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("State")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("dirty", &self.dirty)
            .finish()
    }
}
