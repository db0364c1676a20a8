//! Edit renderer description.
//!
//! An [`Inspector`] is what an editor shows for a selected block: a toolbar
//! and collapsible panels of controls. It is plain data so any frontend can
//! draw it. Every control is bound to one attribute and writes through
//! [`EditableInstance::update`], so edits get the same validation as any
//! other update.

use serde_json::{Map, Value};

use super::media::MediaType;
use crate::editing::{Change, EditError, EditableInstance};

/// Input widget for one control.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text { multiline: bool },
    Number { min: f64, max: f64, step: f64 },
    Range { min: f64, max: f64, step: f64 },
    Toggle,
    /// `(label, value)` pairs.
    Select { options: Vec<(String, String)> },
    Color,
    Alignment,
    Media { allowed: Vec<MediaType> },
}

impl Widget {
    pub fn select(options: &[(&str, &str)]) -> Self {
        Widget::Select {
            options: options
                .iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub field: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub help: Option<&'static str>,
}

impl Control {
    pub fn new(field: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            field,
            label,
            widget,
            help: None,
        }
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Write a new value for this control's attribute.
    pub fn apply(&self, instance: &mut EditableInstance, value: Value) -> Result<Change, EditError> {
        let mut attributes = Map::new();
        attributes.insert(self.field.to_string(), value);
        instance.update(&attributes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: &'static str,
    pub initial_open: bool,
    pub controls: Vec<Control>,
}

impl Panel {
    pub fn new(title: &'static str, controls: Vec<Control>) -> Self {
        Self {
            title,
            initial_open: true,
            controls,
        }
    }

    pub fn collapsed(mut self) -> Self {
        self.initial_open = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inspector {
    pub toolbar: Vec<Control>,
    pub panels: Vec<Panel>,
}

impl Inspector {
    /// Toolbar controls first, then panel controls in order.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.toolbar
            .iter()
            .chain(self.panels.iter().flat_map(|p| p.controls.iter()))
    }

    pub fn control(&self, field: &str) -> Option<&Control> {
        self.controls().find(|c| c.field == field)
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}
