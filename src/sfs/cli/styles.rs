//! Named terminal styles used by the `style` template filter.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Prepended to text whose style name is not registered, so typos in
/// templates show up in the output instead of silently rendering plain.
pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

pub mod names {
    pub const BORDER: &str = "border";
    pub const HEADER: &str = "header";
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
    pub const EXPERIMENTAL: &str = "experimental";
}

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named style; an existing style with the same name is replaced.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.styles.get(name) {
            Some(style) => style.apply_to(text).to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }

    /// Like [`Theme::apply`] but without ANSI codes.
    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.has(name) {
            text.to_string()
        } else {
            format!("{} {}", MISSING_STYLE_INDICATOR, text)
        }
    }
}

pub static SFS_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add(names::BORDER, Style::new().color256(244))
        .add(names::HEADER, Style::new().bold())
        .add(names::INFO, Style::new())
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red())
        .add(names::EXPERIMENTAL, Style::new().yellow().italic())
});
