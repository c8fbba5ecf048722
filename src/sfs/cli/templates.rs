//! Output templates.
//!
//! Templates live in their own files so they can be edited and diffed apart
//! from the Rust code that feeds them. They are minijinja templates and use
//! the `style` filter (see `render.rs`) for colour. Layout math such as column
//! widths is done in Rust before rendering; templates only place the pieces.

pub const TABLE_TEMPLATE: &str = include_str!("templates/table.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
pub const TEXT_LIST_TEMPLATE: &str = include_str!("templates/text_list.tmp");
