//! A small CSS selector subset for the in-memory fixture page.
//!
//! Supports type selectors, `*`, `.class`, `[attr]`, `[attr="value"]`, the descendant
//! combinator and comma-separated lists. That covers every selector the locators use.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported selector `{selector}`: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

/// Read access to an element tree, as the matcher needs it.
pub(crate) trait ElementTree {
    fn parent_of(&self, id: usize) -> Option<usize>;
    fn tag_of(&self, id: usize) -> &str;
    fn attr_of(&self, id: usize, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    // each entry is a descendant chain, outermost first
    groups: Vec<Vec<Compound>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let fail = |reason: &str| SelectorError {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };

        let mut groups = Vec::new();
        for group in split_outside_brackets(selector, |c| c == ',') {
            let chain = split_outside_brackets(&group, char::is_whitespace)
                .iter()
                .filter(|part| !part.is_empty())
                .map(|part| parse_compound(part).map_err(|reason| fail(&reason)))
                .collect::<Result<Vec<_>, _>>()?;
            if chain.is_empty() {
                return Err(fail("empty selector"));
            }
            groups.push(chain);
        }
        if groups.is_empty() {
            return Err(fail("empty selector"));
        }
        Ok(Self { groups })
    }

    pub(crate) fn matches<T: ElementTree + ?Sized>(&self, tree: &T, id: usize) -> bool {
        self.groups.iter().any(|chain| chain_matches(tree, chain, id))
    }
}

fn chain_matches<T: ElementTree + ?Sized>(tree: &T, chain: &[Compound], id: usize) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return true;
    };
    if !compound_matches(tree, last, id) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    // nearest matching ancestor is always the best choice for descendant-only chains
    let mut cursor = tree.parent_of(id);
    while let Some(ancestor) = cursor {
        if chain_matches(tree, rest, ancestor) {
            return true;
        }
        cursor = tree.parent_of(ancestor);
    }
    false
}

fn compound_matches<T: ElementTree + ?Sized>(tree: &T, compound: &Compound, id: usize) -> bool {
    if let Some(tag) = &compound.tag {
        if !tree.tag_of(id).eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let class_attr = tree.attr_of(id, "class").unwrap_or("");
        let has_all = compound
            .classes
            .iter()
            .all(|c| class_attr.split_whitespace().any(|have| have == c));
        if !has_all {
            return false;
        }
    }
    compound.attrs.iter().all(|attr| match (tree.attr_of(id, &attr.name), &attr.value) {
        (Some(_), None) => true,
        (Some(have), Some(want)) => have == want,
        (None, _) => false,
    })
}

fn split_outside_brackets(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, _) if depth == 0 && is_sep(c) => {
                parts.push(std::mem::take(&mut current).trim().to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current.trim().to_string());
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(input: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i]) {
        compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if class.is_empty() {
                    return Err("empty class name".to_string());
                }
                compound.classes.push(class);
            }
            '[' => {
                i += 1;
                let name = read_ident(&mut i);
                if name.is_empty() {
                    return Err("empty attribute name".to_string());
                }
                let value = if i < chars.len() && chars[i] == '=' {
                    i += 1;
                    Some(read_attr_value(&chars, &mut i)?)
                } else {
                    None
                };
                if i >= chars.len() || chars[i] != ']' {
                    return Err("unterminated attribute selector".to_string());
                }
                i += 1;
                compound.attrs.push(AttrMatch { name, value });
            }
            other => return Err(format!("unexpected `{}`", other)),
        }
    }
    Ok(compound)
}

fn read_attr_value(chars: &[char], i: &mut usize) -> Result<String, String> {
    match chars.get(*i) {
        Some(&q @ ('"' | '\'')) => {
            *i += 1;
            let start = *i;
            while *i < chars.len() && chars[*i] != q {
                *i += 1;
            }
            if *i >= chars.len() {
                return Err("unterminated string".to_string());
            }
            let value = chars[start..*i].iter().collect();
            *i += 1;
            Ok(value)
        }
        _ => {
            let start = *i;
            while *i < chars.len() && is_ident_char(chars[*i]) {
                *i += 1;
            }
            Ok(chars[start..*i].iter().collect())
        }
    }
}
