use std::fmt;

use thiserror::Error;

use super::dom::{Document, NodeId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected {found:?} at offset {offset} in {selector:?}")]
    Unexpected {
        selector: String,
        offset: usize,
        found: Option<char>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
    Word(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
    ignore_case: bool,
}

impl AttrMatch {
    fn matches(&self, actual: Option<String>) -> bool {
        let actual = match actual {
            Some(value) => value,
            None => return false,
        };
        let fold = |s: &str| {
            if self.ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let actual = fold(&actual);
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(want) => actual == fold(want),
            AttrOp::Contains(want) => !want.is_empty() && actual.contains(&fold(want)),
            AttrOp::Prefix(want) => !want.is_empty() && actual.starts_with(&fold(want)),
            AttrOp::Suffix(want) => !want.is_empty() && actual.ends_with(&fold(want)),
            AttrOp::Word(want) => {
                let want = fold(want);
                actual.split_whitespace().any(|word| word == want)
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, doc: &dyn Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            match doc.tag_name(node) {
                Some(actual) if actual.eq_ignore_ascii_case(tag) => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class = doc.attribute(node, "class").unwrap_or_default();
            let present: Vec<&str> = class.split_whitespace().collect();
            if !self.classes.iter().all(|want| present.contains(&want.as_str())) {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|attr| attr.matches(doc.attribute(node, &attr.name)))
    }
}

/// A parsed selector from the subset the locator tables use: type, `#id`,
/// `.class`, attribute tests (`=`, `*=`, `^=`, `$=`, `~=`, optional ` i`)
/// and the descendant / child combinators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    // steps[0] is the leftmost compound; its combinator is unused.
    steps: Vec<(Combinator, Compound)>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &dyn Document, node: NodeId) -> bool {
        self.matches_from(doc, node, self.steps.len() - 1)
    }

    fn matches_from(&self, doc: &dyn Document, node: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.steps[index];
        if !compound.matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => match doc.parent(node) {
                Some(parent) => self.matches_from(doc, parent, index - 1),
                None => false,
            },
            Combinator::Descendant => {
                // A well-formed tree is never deeper than it has nodes.
                let mut budget = doc.nodes().len();
                let mut ancestor = doc.parent(node);
                while let Some(current) = ancestor {
                    if budget == 0 {
                        return false;
                    }
                    budget -= 1;
                    if self.matches_from(doc, current, index - 1) {
                        return true;
                    }
                    ancestor = doc.parent(current);
                }
                false
            }
        }
    }
}

/// First element in document order matching `selector`.
pub fn query_first(doc: &dyn Document, selector: &Selector) -> Option<NodeId> {
    doc.nodes().into_iter().find(|node| selector.matches(doc, *node))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src: src.trim(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.src.to_string(),
            offset: self.pos,
            found: self.peek(),
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        if self.src.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut steps = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.compound()?;
            steps.push((combinator, compound));
            let had_ws = self.skip_ws();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    if self.peek().is_none() {
                        return Err(self.unexpected());
                    }
                    combinator = Combinator::Child;
                }
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(Selector {
            source: self.src.to_string(),
            steps,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if c.is_alphabetic() => compound.tag = Some(self.ident()?.to_lowercase()),
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => compound.attrs.push(self.attribute()?),
                _ => break,
            }
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttrMatch, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let operator = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrMatch {
                    name,
                    op: AttrOp::Exists,
                    ignore_case: false,
                });
            }
            Some('=') => {
                self.bump();
                '='
            }
            Some(c @ ('*' | '^' | '$' | '~')) => {
                self.bump();
                self.expect('=')?;
                c
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        let value = self.value()?;
        self.skip_ws();
        let mut ignore_case = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                ignore_case = true;
                self.skip_ws();
            }
            Some('s' | 'S') => {
                self.bump();
                self.skip_ws();
            }
            _ => {}
        }
        self.expect(']')?;
        let op = match operator {
            '*' => AttrOp::Contains(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            '~' => AttrOp::Word(value),
            _ => AttrOp::Equals(value),
        };
        Ok(AttrMatch {
            name,
            op,
            ignore_case,
        })
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let value = self.src[start..self.pos].to_string();
                        self.bump();
                        return Ok(value);
                    }
                    self.bump();
                }
                Err(self.unexpected())
            }
            _ => self.ident(),
        }
    }
}
