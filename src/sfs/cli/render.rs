//! # Rendering Module
//!
//! Terminal output for the `sfs` binary: bordered tables for lists,
//! property/value tables for single resources, JSON when `--format json` is
//! selected, and styled command messages.
//!
//! Column widths and padding are computed here with `unicode-width`, so
//! templates only decide where borders and styles go. Colour is applied
//! through the `style` filter and switched off when stdout is not a colour
//! terminal.

use super::styles::{names, Theme, SFS_THEME};
use super::templates::{MESSAGES_TEMPLATE, TABLE_TEMPLATE, TEXT_LIST_TEMPLATE};
use console::Term;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use serde_json::Map;
use sfsclient::batch::{CmdMessage, MessageLevel};
use sfsclient::config::OutputFormat;
use sfsclient::error::Result;
use sfsclient::resource::Resource;
use unicode_width::UnicodeWidthStr;

#[derive(Serialize)]
struct TableData {
    border: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

#[derive(Serialize)]
struct TextListData {
    lines: Vec<String>,
    empty_message: String,
}

fn colors_supported() -> bool {
    Term::stdout().features().colors_supported()
}

/// Renders `template` with `data`, registering the `style` filter for `theme`.
pub fn render_with_color<T: Serialize>(
    template: &str,
    data: &T,
    theme: &Theme,
    use_color: bool,
) -> std::result::Result<String, Error> {
    let mut env = Environment::new();
    let theme = theme.clone();
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        if use_color {
            theme.apply(&name, &text)
        } else {
            theme.apply_plain(&name, &text)
        }
    });
    env.add_template("output", template)?;
    env.get_template("output")?.render(data)
}

fn pad_to_width(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    let mut padded = text.to_string();
    padded.push_str(&" ".repeat(width.saturating_sub(current)));
    padded
}

/// Cells may not contain line breaks; they would tear the borders.
fn flatten_cell(cell: &str) -> String {
    cell.replace(|c: char| c == '\r' || c == '\n', " ")
}

/// Renders a bordered table. Every row must have as many cells as `headers`.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    render_table_internal(headers, rows, None)
}

fn render_table_internal(
    headers: &[&str],
    rows: &[Vec<String>],
    use_color: Option<bool>,
) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| flatten_cell(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let border = widths.iter().fold(String::from("+"), |mut acc, width| {
        acc.push_str(&"-".repeat(width + 2));
        acc.push('+');
        acc
    });
    let data = TableData {
        border,
        header: headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| pad_to_width(header, *width))
            .collect(),
        rows: rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| pad_to_width(cell, *width))
                    .collect()
            })
            .collect(),
    };

    let use_color = use_color.unwrap_or_else(colors_supported);
    render_with_color(TABLE_TEMPLATE, &data, &SFS_THEME, use_color)
        .unwrap_or_else(|e| format!("Render error: {}", e))
}

/// Attribute key shown under a column header: `Share Proto` reads `share_proto`.
pub fn column_key(header: &str) -> String {
    header.to_lowercase().replace(' ', "_")
}

/// One row per resource, one column per header.
pub fn render_list(resources: &[Resource], columns: &[&str]) -> String {
    let keys: Vec<String> = columns.iter().map(|c| column_key(c)).collect();
    let rows: Vec<Vec<String>> = resources
        .iter()
        .map(|resource| keys.iter().map(|key| resource.display_value(key)).collect())
        .collect();
    render_table(columns, &rows)
}

/// `Property | Value` table of every attribute, sorted by key.
pub fn render_show(attributes: &Map<String, serde_json::Value>) -> String {
    let mut keys: Vec<&String> = attributes.keys().collect();
    keys.sort();
    let rows: Vec<Vec<String>> = keys
        .into_iter()
        .map(|key| {
            let value = match &attributes[key] {
                serde_json::Value::Null => "None".to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            vec![key.clone(), value]
        })
        .collect();
    render_table(&["Property", "Value"], &rows)
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Prints resources as a table or as a JSON array.
pub fn print_list(format: OutputFormat, resources: &[Resource], columns: &[&str]) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_list(resources, columns)),
        OutputFormat::Json => {
            let items: Vec<&Map<String, serde_json::Value>> =
                resources.iter().map(Resource::attributes).collect();
            println!("{}", render_json(&items)?);
        }
    }
    Ok(())
}

pub fn print_show(format: OutputFormat, attributes: &Map<String, serde_json::Value>) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_show(attributes)),
        OutputFormat::Json => println!("{}", render_json(attributes)?),
    }
    Ok(())
}

pub fn print_resource(format: OutputFormat, resource: &Resource) -> Result<()> {
    print_show(format, resource.attributes())
}

pub fn render_text_list(lines: &[String], empty_message: &str) -> String {
    render_text_list_internal(lines, empty_message, None)
}

fn render_text_list_internal(
    lines: &[String],
    empty_message: &str,
    use_color: Option<bool>,
) -> String {
    let data = TextListData {
        lines: lines.to_vec(),
        empty_message: empty_message.to_string(),
    };
    let use_color = use_color.unwrap_or_else(colors_supported);
    render_with_color(TEXT_LIST_TEMPLATE, &data, &SFS_THEME, use_color)
        .unwrap_or_else(|_| format!("{}\n", empty_message))
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| {
                let style = match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                };
                MessageData {
                    content: msg.content.clone(),
                    style: style.to_string(),
                }
            })
            .collect(),
    };

    let use_color = use_color.unwrap_or_else(colors_supported);
    render_with_color(MESSAGES_TEMPLATE, &data, &SFS_THEME, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}
