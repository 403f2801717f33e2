//! Custom htmd element handlers
//!
//! - `<pre>`: fenced code block annotated with the language from `class` or `data-language`
//! - `<code>`: inline backticks, or raw content when nested in `<pre>`
//! - `<a>`: autolink when the text is the URL, fallback text from aria-label/title otherwise

use std::rc::Rc;

use htmd::{
    Element,
    element_handler::{HandlerResult, Handlers},
};
use markup5ever_rcdom::{Node, NodeData};

/// Handle `<pre>` elements - code blocks with fences
pub(super) fn pre_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let result = handlers.walk_children(element.node);
    let content = result.content.trim_matches('\n');

    // Nested <code> already produced a fenced block; pretty-printed markup
    // leaves indentation around it
    let nested = content.trim();
    if nested.starts_with("```") {
        return Some(HandlerResult::from(format!("\n\n{nested}\n\n")));
    }

    let fence = fence_for(language_from_attrs(element.attrs).as_deref());
    Some(HandlerResult::from(format!("\n\n{fence}\n{content}\n```\n\n")))
}

/// Handle `<code>` elements - inline code or code block content
pub(super) fn code_handler(_handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    // Raw extraction keeps angle brackets that htmd would otherwise drop
    let content = extract_raw_text(element.node);

    if is_inside_pre(element.node) {
        let language = language_from_attrs(element.attrs)
            .or_else(|| parent_pre_language(element.node));
        let fence = fence_for(language.as_deref());
        return Some(HandlerResult::from(format!(
            "{fence}\n{}\n```",
            content.trim_matches('\n')
        )));
    }

    let trimmed = content.trim();
    let rendered = if trimmed.contains('`') {
        if trimmed.starts_with('`') || trimmed.ends_with('`') {
            format!("`` {trimmed} ``")
        } else {
            format!("``{trimmed}``")
        }
    } else {
        format!("`{trimmed}`")
    };
    Some(HandlerResult::from(rendered))
}

/// Handle `<a>` elements with autolinking and fallback text
pub(super) fn link_handler(handlers: &dyn Handlers, element: Element) -> Option<HandlerResult> {
    let text = handlers.walk_children(element.node).content;
    let text = text.trim();

    let Some(href) = get_attr(element.attrs, "href") else {
        // Anchor without a target is just its text
        return Some(HandlerResult::from(text.to_string()));
    };

    if is_autolinkable(&href) && (text.is_empty() || text == href) {
        return Some(HandlerResult::from(format!("<{href}>")));
    }

    let link_text = if text.is_empty() {
        get_attr(element.attrs, "aria-label")
            .or_else(|| get_attr(element.attrs, "title"))
            .unwrap_or_else(|| clean_url_for_display(&href))
    } else {
        text.to_string()
    };

    Some(HandlerResult::from(format!(
        "[{link_text}]({})",
        escape_link_destination(&href)
    )))
}

/// Percent-encode characters that would end or split a link destination
pub(super) fn escape_link_destination(href: &str) -> String {
    let mut escaped = String::with_capacity(href.len());
    for c in href.trim().chars() {
        match c {
            ' ' => escaped.push_str("%20"),
            '\t' => escaped.push_str("%09"),
            '\n' => escaped.push_str("%0A"),
            '\r' => escaped.push_str("%0D"),
            '(' => escaped.push_str("%28"),
            ')' => escaped.push_str("%29"),
            '<' => escaped.push_str("%3C"),
            '>' => escaped.push_str("%3E"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Language name from `data-language` or a `language-*`-style class
pub(super) fn language_from_attrs(attrs: &[html5ever::Attribute]) -> Option<String> {
    if let Some(lang) = get_attr(attrs, "data-language") {
        return Some(lang);
    }
    get_attr(attrs, "class").and_then(|class| language_from_class(&class))
}

pub(super) fn language_from_class(class: &str) -> Option<String> {
    class.split_whitespace().find_map(|part| {
        ["language-", "lang-", "hljs-", "brush:"]
            .iter()
            .find_map(|prefix| part.strip_prefix(prefix))
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    })
}

fn fence_for(language: Option<&str>) -> String {
    match language {
        Some(lang) => format!("```{lang}"),
        None => "```".to_string(),
    }
}

fn is_autolinkable(href: &str) -> bool {
    (href.starts_with("http://") || href.starts_with("https://") || href.starts_with("mailto:"))
        && !href.contains(char::is_whitespace)
}

/// Concatenated text of a node tree, whitespace preserved
fn extract_raw_text(node: &Rc<Node>) -> String {
    let mut text = String::new();
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document | NodeData::Doctype { .. } => {
            for child in node.children.borrow().iter() {
                text.push_str(&extract_raw_text(child));
            }
        }
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
    text
}

/// Nearest `<pre>` ancestor, if any
fn enclosing_pre(node: &Rc<Node>) -> Option<Rc<Node>> {
    // rcdom stores the parent in a Cell, so take and restore it
    let mut current = node.parent.take();
    node.parent.set(current.clone());

    while let Some(parent) = current.and_then(|weak| weak.upgrade()) {
        if let NodeData::Element { ref name, .. } = parent.data
            && &*name.local == "pre"
        {
            return Some(parent);
        }
        current = parent.parent.take();
        parent.parent.set(current.clone());
    }
    None
}

fn is_inside_pre(node: &Rc<Node>) -> bool {
    enclosing_pre(node).is_some()
}

fn parent_pre_language(node: &Rc<Node>) -> Option<String> {
    let pre = enclosing_pre(node)?;
    match &pre.data {
        NodeData::Element { attrs, .. } => language_from_attrs(&attrs.borrow()),
        _ => None,
    }
}

fn get_attr(attrs: &[html5ever::Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
        .filter(|v| !v.trim().is_empty())
}

/// Readable link text derived from a bare href
fn clean_url_for_display(url: &str) -> String {
    let cleaned = url.trim_start_matches('/');
    let cleaned = cleaned.split(['?', '#']).next().unwrap_or(cleaned);
    let cleaned = cleaned
        .trim_end_matches(".html")
        .trim_end_matches(".htm")
        .trim_end_matches("/index");
    let cleaned = cleaned.replace(['-', '_'], " ");

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => url.to_string(),
    }
}
