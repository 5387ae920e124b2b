//! DOM normalization passes over a parsed page
//!
//! Each pass takes the parsed document by `&mut Html` and is independent of the
//! others. Node ids are collected first and the tree is mutated afterwards, since
//! `scraper` hands out shared borrows while selecting.

use crate::render::template::restore_url;
use crate::url::{is_root_relative, normalize_image_url, LinkRewriter};
use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Element;
use scraper::{Html, Node, Selector};

/// Identifier of the template heading that carries the page title
pub const PAGE_TITLE_ID: &str = "page-title";

/// Class MediaWiki puts on elements it knows to be empty
const EMPTY_ELEMENT_CLASS: &str = "mw-empty-elt";

/// Removes every comment node
pub fn remove_comments(document: &mut Html) {
    let comments: Vec<NodeId> = document
        .tree
        .root()
        .descendants()
        .filter(|node| node.value().is_comment())
        .map(|node| node.id())
        .collect();

    detach_all(document, &comments);
}

/// Removes paragraphs with no visible text and no embedded image or vector graphic
pub fn remove_empty_paragraphs(document: &mut Html) {
    let mut empty = Vec::new();

    if let (Ok(paragraphs), Ok(media)) = (Selector::parse("p"), Selector::parse("img, svg")) {
        for paragraph in document.select(&paragraphs) {
            let blank = paragraph.text().all(|text| text.trim().is_empty());
            if blank && paragraph.select(&media).next().is_none() {
                empty.push(paragraph.id());
            }
        }
    }

    detach_all(document, &empty);
}

/// Removes elements the wiki flagged as structurally empty
pub fn remove_flagged_empty(document: &mut Html) {
    let mut flagged = Vec::new();

    if let Ok(selector) = Selector::parse(&format!(".{}", EMPTY_ELEMENT_CLASS)) {
        flagged.extend(document.select(&selector).map(|element| element.id()));
    }

    detach_all(document, &flagged);
}

/// Keeps exactly one top-level heading in the document
///
/// # Heading Rules
///
/// * Exactly one `h1` - the document is left alone
/// * Exactly two - the second `h1` is removed
/// * Zero or more than two - every heading except the page title moves down one
///   level, `h6` staying `h6`
pub fn normalize_headings(document: &mut Html) {
    let Ok(top_level) = Selector::parse("h1") else {
        return;
    };

    let h1s: Vec<NodeId> = document.select(&top_level).map(|h1| h1.id()).collect();

    match h1s.len() {
        1 => {}
        2 => detach_all(document, &h1s[1..]),
        _ => demote_headings(document),
    }
}

fn demote_headings(document: &mut Html) {
    let Ok(headings) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return;
    };

    let demoted: Vec<(NodeId, Element)> = document
        .select(&headings)
        .filter(|heading| heading.value().id() != Some(PAGE_TITLE_ID))
        .filter_map(|heading| {
            let level = heading_level(heading.value().name())?;
            let mut name = heading.value().name.clone();
            name.local = LocalName::from(format!("h{}", (level + 1).min(6)));
            Some((heading.id(), rebuild(heading.value(), name, &[])))
        })
        .collect();

    replace_all(document, demoted);
}

fn heading_level(name: &str) -> Option<u8> {
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Rewrites every `href` in the document
///
/// Placeholder-scheme URLs are restored; links into the wiki are made relative
/// to `page_path`; everything else is left untouched.
pub fn rewrite_links(document: &mut Html, rewriter: &LinkRewriter, page_path: &str) {
    let Ok(selector) = Selector::parse("[href]") else {
        return;
    };

    let rewritten: Vec<(NodeId, Element)> = document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let new_href = match restore_url(href) {
                Some(restored) => restored.to_string(),
                None if rewriter.is_wiki_link(href) => rewriter.make_url_relative(href, page_path),
                None => return None,
            };
            (new_href != href).then(|| {
                let updated = rebuild(
                    element.value(),
                    element.value().name.clone(),
                    &[("href", Some(new_href.as_str()))],
                );
                (element.id(), updated)
            })
        })
        .collect();

    replace_all(document, rewritten);
}

/// Points every locally hosted image at its mirrored copy
///
/// Only images with a site-root-relative `src` are touched: the `srcset` is
/// dropped and `src` is rewritten to the recompressed file.
///
/// # Returns
///
/// The original `src` of each rewritten image, in document order, for download
pub fn rewrite_images(document: &mut Html, rewriter: &LinkRewriter, page_path: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let mut sources = Vec::new();
    let rewritten: Vec<(NodeId, Element)> = document
        .select(&selector)
        .filter_map(|image| {
            let src = image.value().attr("src")?;
            if !is_root_relative(src) {
                return None;
            }
            let local = rewriter.make_url_relative(&normalize_image_url(src), page_path);
            sources.push(src.to_string());
            let updated = rebuild(
                image.value(),
                image.value().name.clone(),
                &[("src", Some(local.as_str())), ("srcset", None)],
            );
            Some((image.id(), updated))
        })
        .collect();

    replace_all(document, rewritten);
    sources
}

/// Copies `element` under `name`, overriding attributes
///
/// An override of `Some(value)` replaces (or adds) the attribute; `None` drops it.
fn rebuild(element: &Element, name: QualName, overrides: &[(&str, Option<&str>)]) -> Element {
    let mut attributes: Vec<Attribute> = element
        .attrs()
        .filter(|(key, _)| !overrides.iter().any(|(name, _)| name == key))
        .map(|(key, value)| attribute(key, value))
        .collect();

    attributes.extend(
        overrides
            .iter()
            .filter_map(|(key, value)| value.map(|value| attribute(key, value))),
    );

    Element::new(name, attributes)
}

fn attribute(key: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(key)),
        value: StrTendril::from(value),
    }
}

fn detach_all(document: &mut Html, ids: &[NodeId]) {
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
}

fn replace_all(document: &mut Html, replacements: Vec<(NodeId, Element)>) {
    for (id, element) in replacements {
        if let Some(mut node) = document.tree.get_mut(id) {
            *node.value() = Node::Element(element);
        }
    }
}

/// Returns the elements matching `selector`, for assertions in tests
#[cfg(test)]
pub(crate) fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}
