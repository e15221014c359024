//! Named callbacks for plot changes
//!
//! A controller emits a `PlotEvent` after each successful rebuild. Handlers
//! are registered against an event name and run in registration order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::PlotSettings;

/// Which axis a variable was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotAxis {
    X,
    Y,
}

impl fmt::Display for PlotAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotAxis::X => write!(f, "x"),
            PlotAxis::Y => write!(f, "y"),
        }
    }
}

/// Something that changed a plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlotEvent {
    /// A new variable was put on an axis
    VariableSelected { axis: PlotAxis, variable: String },
    /// A condition was added or removed
    ConditioningChanged {
        /// Condition labels after the change
        conditions: Vec<String>,
        /// Points left after filtering
        points: usize,
    },
    /// Settings were replaced
    SettingsChanged { settings: PlotSettings },
    /// The regression line could not be drawn
    OverlaySkipped { reason: String },
}

impl PlotEvent {
    pub const VARIABLE_SELECTED: &'static str = "variable_selected";
    pub const CONDITIONING_CHANGED: &'static str = "conditioning_changed";
    pub const SETTINGS_CHANGED: &'static str = "settings_changed";
    pub const OVERLAY_SKIPPED: &'static str = "overlay_skipped";

    /// Name handlers are registered under
    pub fn name(&self) -> &'static str {
        match self {
            PlotEvent::VariableSelected { .. } => Self::VARIABLE_SELECTED,
            PlotEvent::ConditioningChanged { .. } => Self::CONDITIONING_CHANGED,
            PlotEvent::SettingsChanged { .. } => Self::SETTINGS_CHANGED,
            PlotEvent::OverlaySkipped { .. } => Self::OVERLAY_SKIPPED,
        }
    }
}

type Handler = Box<dyn FnMut(&PlotEvent)>;

/// Event name to handlers
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<String, Vec<Handler>>,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        write!(f, "EventRegistry({:?})", names)
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event name
    pub fn on<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnMut(&PlotEvent) + 'static,
    {
        self.handlers
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Run every handler registered for the event's name
    ///
    /// Returns how many handlers ran.
    pub fn emit(&mut self, event: &PlotEvent) -> usize {
        let Some(handlers) = self.handlers.get_mut(event.name()) else {
            trace!(event = event.name(), "no handlers");
            return 0;
        };
        for handler in handlers.iter_mut() {
            handler(event);
        }
        trace!(event = event.name(), handlers = handlers.len(), "dispatched event");
        handlers.len()
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Drop the handlers for one name
    pub fn clear(&mut self, name: &str) {
        self.handlers.remove(name);
    }

    pub fn clear_all(&mut self) {
        self.handlers.clear();
    }
}
