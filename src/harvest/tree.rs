//! Read-only view over a parsed markup document.
//!
//! Lookups never fail: an absent node, attribute or text comes back as `None`.

use roxmltree::{Document, ParsingOptions};

pub struct MarkupTree<'input> {
    doc: Document<'input>,
}

impl<'input> MarkupTree<'input> {
    /// Parses a whole document. Malformed input is the only failure.
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Ok(Self {
            doc: Document::parse_with_options(text, options)?,
        })
    }

    /// Depth-first search for the first element named `tag` (local name,
    /// namespace ignored) accepted by `predicate`.
    pub fn find_first<'a, P>(&'a self, tag: &str, predicate: P) -> Option<TreeNode<'a, 'input>>
    where
        P: Fn(&TreeNode<'a, 'input>) -> bool,
    {
        self.doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == tag)
            .map(|node| TreeNode { node })
            .find(|node| predicate(node))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
}

impl<'a, 'input> TreeNode<'a, 'input> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// Leading text content with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> Option<&'a str> {
        self.node.text().map(str::trim)
    }
}
