//! Compound selector matching for the simulated host.
//!
//! Supports what the addressing contract uses: an optional tag followed by
//! any mix of `.class`, `#id`, `[attr]` and `[attr="value"]`. Combinators and
//! selector lists are not supported.

/// Error type for selector parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected '{found}' at offset {offset} in selector {selector:?}")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },
    #[error("unterminated attribute in selector {0:?}")]
    UnterminatedAttribute(String),
}

/// A parsed compound selector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, Option<String>)>,
}

/// What a selector needs to know about an element
pub trait Element {
    fn tag(&self) -> &str;
    fn id_attr(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let chars: Vec<(usize, char)> = source.char_indices().collect();
        let mut sel = Selector::default();
        let mut i = 0;

        let unexpected = |offset: usize, found: char| SelectorError::Unexpected {
            selector: source.to_string(),
            found,
            offset,
        };

        // Optional leading tag
        let tag = take_ident(&chars, &mut i);
        if !tag.is_empty() {
            sel.tag = Some(tag.to_ascii_lowercase());
        }

        while i < chars.len() {
            let (offset, c) = chars[i];
            match c {
                '.' | '#' => {
                    i += 1;
                    let name = take_ident(&chars, &mut i);
                    if name.is_empty() {
                        return Err(unexpected(offset, c));
                    }
                    if c == '.' {
                        sel.classes.push(name);
                    } else {
                        sel.id = Some(name);
                    }
                }
                '[' => {
                    i += 1;
                    let name = take_ident(&chars, &mut i);
                    if name.is_empty() {
                        return Err(SelectorError::UnterminatedAttribute(source.to_string()));
                    }
                    let value = match chars.get(i).map(|(_, c)| *c) {
                        Some(']') => None,
                        Some('=') => {
                            i += 1;
                            Some(take_attr_value(&chars, &mut i, source)?)
                        }
                        Some(other) => return Err(unexpected(chars[i].0, other)),
                        None => {
                            return Err(SelectorError::UnterminatedAttribute(source.to_string()));
                        }
                    };
                    match chars.get(i) {
                        Some((_, ']')) => i += 1,
                        _ => return Err(SelectorError::UnterminatedAttribute(source.to_string())),
                    }
                    sel.attrs.push((name, value));
                }
                other => return Err(unexpected(offset, other)),
            }
        }

        Ok(sel)
    }

    pub fn matches(&self, el: &impl Element) -> bool {
        if let Some(tag) = &self.tag
            && !el.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.id_attr() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match value {
            Some(v) => el.attr(name) == Some(v.as_str()),
            None => el.attr(name).is_some(),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[(usize, char)], i: &mut usize) -> String {
    let mut out = String::new();
    while let Some((_, c)) = chars.get(*i)
        && is_ident_char(*c)
    {
        out.push(*c);
        *i += 1;
    }
    out
}

fn take_attr_value(
    chars: &[(usize, char)],
    i: &mut usize,
    source: &str,
) -> Result<String, SelectorError> {
    match chars.get(*i).map(|(_, c)| *c) {
        Some(quote @ ('"' | '\'')) => {
            *i += 1;
            let mut out = String::new();
            loop {
                match chars.get(*i) {
                    Some((_, c)) if *c == quote => {
                        *i += 1;
                        return Ok(out);
                    }
                    Some((_, c)) => {
                        out.push(*c);
                        *i += 1;
                    }
                    None => return Err(SelectorError::UnterminatedAttribute(source.to_string())),
                }
            }
        }
        _ => Ok(take_ident(chars, i)),
    }
}
