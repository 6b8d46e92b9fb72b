//! Structural queries over the document: tag, classes, and attributes.
//!
//! Matching compares attribute values exactly, so keys never need escaping
//! to be looked up. Rendering a selector to text (for logs, or for handing to
//! a host that only understands selector strings) escapes every value with
//! [`css_escape`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Present(String),
    Equals(String, String),
}

/// A compound selector such as `input.hue-slider[data-color-input]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatch>,
}

impl Selector {
    /// Matches elements with this tag name.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Matches any element.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Requires the attribute to be present, whatever its value.
    pub fn has_attr(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttrMatch::Present(name.into()));
        self
    }

    /// Requires the attribute to equal `value` exactly.
    pub fn attr_eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push(AttrMatch::Equals(name.into(), value.into()));
        self
    }

    /// Test an element given its tag, class list and attribute lookup.
    pub(crate) fn matches<'a>(
        &self,
        tag: &str,
        classes: impl Iterator<Item = &'a str> + Clone,
        attr: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        if let Some(want) = &self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|want| classes.clone().any(|c| c == want.as_str()))
        {
            return false;
        }
        self.attributes.iter().all(|m| match m {
            AttrMatch::Present(name) => attr(name).is_some(),
            AttrMatch::Equals(name, value) => attr(name) == Some(value.as_str()),
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{tag}")?,
            None if self.classes.is_empty() && self.attributes.is_empty() => write!(f, "*")?,
            None => {}
        }
        for class in &self.classes {
            write!(f, ".{}", css_escape(class))?;
        }
        for m in &self.attributes {
            match m {
                AttrMatch::Present(name) => write!(f, "[{}]", css_escape(name))?,
                AttrMatch::Equals(name, value) => {
                    write!(f, "[{}=\"{}\"]", css_escape(name), css_escape(value))?
                }
            }
        }
        Ok(())
    }
}

/// Escape a string for use as a CSS identifier (CSSOM "serialize an identifier").
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1f).contains(&code)
            || code == 0x7f
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}
