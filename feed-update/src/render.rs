use crate::normalize::{format_wire, parse_canonical};
use crate::types::{Entry, Result, Site};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const INDENT: &str = "  ";

/// Entries as they appear in the feed: newest first by `created_at` string,
/// without those whose timestamp does not parse.
///
/// Ties keep their input order. Excluded entries are only logged; the caller
/// still owns and persists them.
pub fn renderable(entries: &[Entry]) -> Vec<(&Entry, DateTime<Utc>)> {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    sorted
        .into_iter()
        .filter_map(|entry| match parse_canonical(&entry.created_at) {
            Some(parsed) => Some((entry, parsed.with_timezone(&Utc))),
            None => {
                warn!("Leaving entry {} out of the feed: bad created_at {:?}", entry.id, entry.created_at);
                None
            }
        })
        .collect()
}

/// Renders the RSS document.
pub fn render_to_string(site: &Site, entries: &[Entry]) -> String {
    let items = renderable(entries);

    let mut out = String::from(XML_HEADER);
    out.push_str("<rss version=\"2.0\">\n");
    open(&mut out, 1, "channel");
    text_element(&mut out, 2, "title", &site.title);
    text_element(&mut out, 2, "link", &site.link);
    text_element(&mut out, 2, "description", &site.description);
    if let Some((_, newest)) = items.first() {
        text_element(&mut out, 2, "lastBuildDate", &format_wire(*newest));
    }

    for (entry, created_at) in &items {
        open(&mut out, 2, "item");
        text_element(&mut out, 3, "id", &entry.id);
        text_element(&mut out, 3, "title", &entry.title);
        text_element(&mut out, 3, "link", &entry.link);
        text_element(&mut out, 3, "pubDate", &format_wire(*created_at));
        markup_element(&mut out, 3, "description", &entry.content);
        for category in &entry.categories {
            text_element(&mut out, 3, "category", category);
        }
        close(&mut out, 2, "item");
    }

    close(&mut out, 1, "channel");
    out.push_str("</rss>\n");
    out
}

/// Writes the feed to `destination`, overwriting it in place.
///
/// The file is not replaced atomically: a crash mid-write leaves it
/// truncated until the next successful run.
pub fn render(site: &Site, entries: &[Entry], destination: &Path) -> Result<()> {
    let document = render_to_string(site, entries);
    std::fs::write(destination, document)?;
    info!("Wrote feed to {}", destination.display());
    Ok(())
}

fn open(out: &mut String, depth: usize, name: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push('<');
    out.push_str(name);
    out.push_str(">\n");
}

fn close(out: &mut String, depth: usize, name: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn text_element(out: &mut String, depth: usize, name: &str, value: &str) {
    out.push_str(&format!("{}<{}>{}</{}>\n", INDENT.repeat(depth), name, escape_text(value), name));
}

/// Content carries literal HTML. It goes into CDATA untouched so readers get
/// the markup, not entities.
fn markup_element(out: &mut String, depth: usize, name: &str, value: &str) {
    if value.is_empty() {
        text_element(out, depth, name, value);
        return;
    }
    let cdata = replace_invalid_chars(value).replace("]]>", "]]]]><![CDATA[>");
    out.push_str(&format!("{}<{}><![CDATA[{}]]></{}>\n", INDENT.repeat(depth), name, cdata, name));
}

/// Only the characters XML itself cannot carry in text.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ if !is_xml_char(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn replace_invalid_chars(value: &str) -> String {
    value
        .chars()
        .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
        .collect()
}

/// XML 1.0 `Char`. Surrogates cannot occur in a Rust `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
