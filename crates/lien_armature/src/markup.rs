//! Markup parser for element trees.
//!
//! A small HTML reader used to build in-memory element trees: elements,
//! attributes (quoted, unquoted or bare), text with entities decoded, void
//! tags, self-closing tags and comments. It is deliberately forgiving:
//! unclosed elements are closed at the end of input, and whitespace-only text
//! between elements is dropped.

use lien_carton::{phf_set, CompactString};
use memchr::memchr;
use thiserror::Error;

/// Elements that never have children
static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupElement {
    pub tag: CompactString,
    pub attrs: Vec<(CompactString, String)>,
    pub children: Vec<MarkupNode>,
}

impl MarkupElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unexpected closing tag </{tag}> at offset {offset}")]
    UnexpectedClose { tag: CompactString, offset: usize },

    #[error("unterminated tag starting at offset {0}")]
    UnterminatedTag(usize),

    #[error("unterminated comment starting at offset {0}")]
    UnterminatedComment(usize),
}

/// Whether a tag never has children.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

/// Parse markup into a list of top-level nodes.
pub fn parse_markup(source: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut reader = Reader {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        stack: vec![MarkupElement::default()],
    };
    reader.run()?;
    while reader.stack.len() > 1 {
        reader.close_top();
    }
    Ok(reader.stack.pop().map(|root| root.children).unwrap_or_default())
}

struct Reader<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    /// Open elements; index 0 is a synthetic root
    stack: Vec<MarkupElement>,
}

impl<'s> Reader<'s> {
    fn run(&mut self) -> Result<(), MarkupError> {
        while self.pos < self.bytes.len() {
            let next_lt = memchr(b'<', &self.bytes[self.pos..]).map(|i| self.pos + i);
            let text_end = next_lt.unwrap_or(self.bytes.len());
            if text_end > self.pos {
                self.push_text(self.pos, text_end);
                self.pos = text_end;
            }
            let Some(lt) = next_lt else {
                break;
            };

            let rest = &self.source[lt..];
            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or(MarkupError::UnterminatedComment(lt))?;
                self.pos = lt + end + 3;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let end =
                    memchr(b'>', &self.bytes[lt..]).ok_or(MarkupError::UnterminatedTag(lt))?;
                self.pos = lt + end + 1;
            } else if rest.starts_with("</") {
                self.read_close_tag(lt)?;
            } else if rest
                .as_bytes()
                .get(1)
                .is_some_and(|b| b.is_ascii_alphabetic())
            {
                self.read_open_tag(lt)?;
            } else {
                // A stray `<` is plain text
                self.push_text(lt, lt + 1);
                self.pos = lt + 1;
            }
        }
        Ok(())
    }

    fn push_text(&mut self, start: usize, end: usize) {
        let raw = &self.source[start..end];
        if raw.trim().is_empty() {
            return;
        }
        let text = htmlize::unescape(raw).into_owned();
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if let Some(MarkupNode::Text(previous)) = parent.children.last_mut() {
            previous.push_str(&text);
        } else {
            parent.children.push(MarkupNode::Text(text));
        }
    }

    fn close_top(&mut self) {
        if let Some(element) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(MarkupNode::Element(element));
            }
        }
    }

    fn read_name(&mut self) -> CompactString {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_whitespace() || matches!(b, b'>' | b'/' | b'=') {
                break;
            }
            self.pos += 1;
        }
        CompactString::new(&self.source[start..self.pos])
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn read_close_tag(&mut self, lt: usize) -> Result<(), MarkupError> {
        self.pos = lt + 2;
        let tag = self.read_name().to_ascii_lowercase();
        let end =
            memchr(b'>', &self.bytes[self.pos..]).ok_or(MarkupError::UnterminatedTag(lt))?;
        self.pos += end + 1;

        let found = self
            .stack
            .iter()
            .skip(1)
            .rposition(|el| el.tag.as_str() == tag.as_str());
        let Some(depth) = found else {
            return Err(MarkupError::UnexpectedClose {
                tag: CompactString::from(tag),
                offset: lt,
            });
        };
        // rposition over skip(1) is relative to index 1
        while self.stack.len() > depth + 1 {
            self.close_top();
        }
        Ok(())
    }

    fn read_open_tag(&mut self, lt: usize) -> Result<(), MarkupError> {
        self.pos = lt + 1;
        let tag = CompactString::from(self.read_name().to_ascii_lowercase());
        let mut element = MarkupElement {
            tag,
            ..Default::default()
        };

        let self_closing = loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => return Err(MarkupError::UnterminatedTag(lt)),
                Some(b'>') => {
                    self.pos += 1;
                    break false;
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    break true;
                }
                Some(b'/') => self.pos += 1,
                Some(_) => {
                    let name = self.read_name();
                    if name.is_empty() {
                        // Lone `=`; skip it
                        self.pos += 1;
                        continue;
                    }
                    let value = self.read_attr_value(lt)?;
                    element.attrs.push((name, value));
                }
            }
        };

        if self_closing || is_void_tag(&element.tag) {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(MarkupNode::Element(element));
            }
        } else {
            self.stack.push(element);
        }
        Ok(())
    }

    fn read_attr_value(&mut self, lt: usize) -> Result<String, MarkupError> {
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            return Ok(String::new());
        }
        self.pos += 1;
        self.skip_whitespace();

        let raw = match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = memchr(quote, &self.bytes[start..])
                    .ok_or(MarkupError::UnterminatedTag(lt))?;
                self.pos = start + end + 1;
                &self.source[start..start + end]
            }
            _ => {
                let start = self.pos;
                while self.pos < self.bytes.len()
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'>'
                {
                    self.pos += 1;
                }
                &self.source[start..self.pos]
            }
        };
        Ok(htmlize::unescape_attribute(raw).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &MarkupNode) -> &MarkupElement {
        match node {
            MarkupNode::Element(el) => el,
            MarkupNode::Text(text) => panic!("expected element, found text {text:?}"),
        }
    }

    #[test]
    fn test_parse_nested() {
        let nodes = parse_markup(r#"<ul id="list"><li bind="item">x</li></ul>"#).unwrap();
        assert_eq!(nodes.len(), 1);
        let ul = element(&nodes[0]);
        assert_eq!(ul.tag, "ul");
        assert_eq!(ul.attr("id"), Some("list"));
        let li = element(&ul.children[0]);
        assert_eq!(li.attr("bind"), Some("item"));
        assert_eq!(li.children, vec![MarkupNode::Text("x".to_string())]);
    }

    #[test]
    fn test_void_and_bare_attributes() {
        let nodes = parse_markup("<p><input id=name immediate><span>a</span></p>").unwrap();
        let p = element(&nodes[0]);
        assert_eq!(p.children.len(), 2);
        let input = element(&p.children[0]);
        assert_eq!(input.attr("id"), Some("name"));
        assert_eq!(input.attr("immediate"), Some(""));
    }

    #[test]
    fn test_entities_decoded() {
        let nodes = parse_markup(r#"<b title="a &amp; b">1 &lt; 2</b>"#).unwrap();
        let b = element(&nodes[0]);
        assert_eq!(b.attr("title"), Some("a & b"));
        assert_eq!(b.children, vec![MarkupNode::Text("1 < 2".to_string())]);
    }

    #[test]
    fn test_comments_and_whitespace_dropped() {
        let nodes = parse_markup("<!doctype html>\n<div>\n  <!-- note -->\n  <br/>\n</div>").unwrap();
        assert_eq!(nodes.len(), 1);
        let div = element(&nodes[0]);
        assert_eq!(div.children.len(), 1);
        assert_eq!(element(&div.children[0]).tag, "br");
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        let nodes = parse_markup("<div><p>text").unwrap();
        let div = element(&nodes[0]);
        assert_eq!(element(&div.children[0]).tag, "p");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_markup("<div></span>"),
            Err(MarkupError::UnexpectedClose { .. })
        ));
        assert!(matches!(
            parse_markup("<div class=\"x"),
            Err(MarkupError::UnterminatedTag(0))
        ));
        assert!(matches!(
            parse_markup("<!-- open"),
            Err(MarkupError::UnterminatedComment(0))
        ));
    }
}
