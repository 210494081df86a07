//! Regex-based HTML scanning primitives.
//!
//! Just enough structure for the calendar listing: locate elements by class
//! token, find where they end by balancing tags of the same name, and turn a
//! fragment into plain text. Attribute values containing `>` are not
//! supported. An element without an end tag stops at its parent's end tag,
//! or at the next sibling of the same name for tags whose end tag HTML makes
//! optional (`<li>`, `<p>`, table cells). A stray end tag that matches no open
//! element ends the element early, where a browser would ignore it.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(/?)([a-z][a-z0-9-]*)\b[^>]*>").expect("valid tag regex")
});
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid img regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("valid script/style regex")
});
static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\b[^>]*>").expect("valid br regex"));
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tags regex"));
static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("class"));
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("src"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]*);")
        .expect("valid entity regex")
});

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const OPTIONAL_END_ELEMENTS: [&str; 11] = [
    "li", "p", "dt", "dd", "option", "tr", "td", "th", "thead", "tbody", "tfoot",
];

/// An element located in a larger document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    /// Everything between the opening tag and its matching close. Empty for
    /// void and self-closing elements.
    pub inner: &'a str,
}

impl Element<'_> {
    pub(crate) fn text(&self) -> String {
        text_content(self.inner)
    }
}

/// All elements whose `class` attribute contains `class` as a whole token,
/// in document order. Nested matches are returned as well.
pub(crate) fn find_by_class<'a>(html: &'a str, class: &str) -> Vec<Element<'a>> {
    let mut found = Vec::new();
    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !caps[1].is_empty() {
            continue;
        }
        let open_tag = whole.as_str();
        if !has_class(open_tag, class) {
            continue;
        }
        let name = caps[2].to_ascii_lowercase();
        let inner = if is_void(&name) || open_tag.ends_with("/>") {
            ""
        } else {
            let start = whole.end();
            let end = matching_close(html, start, &name);
            &html[start..end]
        };
        found.push(Element { inner });
    }
    found
}

/// Concatenated text of every `class` element inside `html`, like a jQuery
/// `.find(sel).text()`.
pub(crate) fn text_of_class(html: &str, class: &str) -> String {
    find_by_class(html, class)
        .iter()
        .map(Element::text)
        .collect::<String>()
}

/// `src` of the first `<img>` in `html`.
pub(crate) fn first_img_src(html: &str) -> Option<String> {
    IMG_TAG_RE
        .find_iter(html)
        .find_map(|m| attr_value(m.as_str(), &SRC_ATTR_RE))
}

/// Byte offset where the element opened just before `from` ends, or the end
/// of the document if nothing closes it.
fn matching_close(html: &str, from: usize, name: &str) -> usize {
    let closed_by_sibling = OPTIONAL_END_ELEMENTS.contains(&name);
    let mut depth = 1usize;
    // Open elements of other names between here and the scan position.
    let mut others = 0usize;
    for caps in TAG_RE.captures_iter(&html[from..]) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let tag = &caps[2];
        if whole.as_str().ends_with("/>") || is_void(tag) {
            continue;
        }
        let closing = !caps[1].is_empty();

        if tag.eq_ignore_ascii_case(name) {
            if closing {
                depth -= 1;
                if depth == 0 {
                    return from + whole.start();
                }
            } else if closed_by_sibling && depth == 1 && others == 0 {
                return from + whole.start();
            } else {
                depth += 1;
            }
        } else if closing {
            if others == 0 {
                // Parent closed while this element was still open.
                return from + whole.start();
            }
            others -= 1;
        } else {
            others += 1;
        }
    }
    html.len()
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

fn has_class(open_tag: &str, class: &str) -> bool {
    if !open_tag.contains(class) {
        return false;
    }
    attr_value(open_tag, &CLASS_ATTR_RE)
        .is_some_and(|value| value.split_whitespace().any(|token| token == class))
}

/// Matches `attr=value` inside a single tag, with double, single, or no
/// quotes around the value.
fn attr_regex(attr: &str) -> Regex {
    let pattern = format!(
        r#"(?is)[\s"']{}\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        regex::escape(attr)
    );
    Regex::new(&pattern).expect("valid attr regex")
}

/// Value captured by an [`attr_regex`] pattern, entities decoded.
fn attr_value(tag: &str, attr_re: &Regex) -> Option<String> {
    let caps = attr_re.captures(tag)?;
    let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    Some(decode_entities(raw.as_str().trim()))
}

/// Plain text of an HTML fragment: comments, scripts and tags removed, `<br>`
/// turned into a line break, entities decoded. Whitespace is left as is.
pub(crate) fn text_content(fragment: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(fragment, "");
    let without_scripts = SCRIPT_STYLE_RE.replace_all(&without_comments, "");
    let with_breaks = BR_RE.replace_all(&without_scripts, "\n");
    let without_tags = ANY_TAG_RE.replace_all(&with_breaks, "");
    decode_entities(&without_tags)
}

/// Decodes character references: decimal, hex, and every HTML named entity.
/// Unknown names are left as written.
pub(crate) fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            html_escape::decode_html_entities(&caps[0]).into_owned()
        })
        .into_owned()
}
