//! Attribute selectors: paths into a DICOM object that may cross
//! sequence item boundaries, such as `0040,A730[1].0040,A730[3].0040,A168[0].0008,0100`.

use crate::header::Tag;
use smallvec::{smallvec, SmallVec};
use snafu::Snafu;
use std::fmt;

/// A single step of an [`AttributeSelector`] path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSelectorStep {
    /// The final attribute in the path, addressed directly by tag.
    Tag(Tag),
    /// An item of a sequence attribute, to be descended into.
    Nested {
        /// the sequence's tag
        tag: Tag,
        /// the item index, starting at 0
        item: u32,
    },
}

impl AttributeSelectorStep {
    /// The tag named by this step, regardless of its kind.
    pub fn tag(&self) -> Tag {
        match self {
            AttributeSelectorStep::Tag(tag) => *tag,
            AttributeSelectorStep::Nested { tag, .. } => *tag,
        }
    }
}

impl From<Tag> for AttributeSelectorStep {
    fn from(tag: Tag) -> Self {
        AttributeSelectorStep::Tag(tag)
    }
}

impl From<(Tag, u32)> for AttributeSelectorStep {
    fn from((tag, item): (Tag, u32)) -> Self {
        AttributeSelectorStep::Nested { tag, item }
    }
}

/// Error constructing an [`AttributeSelector`] from a sequence of steps.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectorFromStepsError {
    /// No steps were given.
    #[snafu(display("attribute selector must have at least one step"))]
    Empty,
    /// A bare tag step was found before the last position.
    #[snafu(display("a direct tag step can only appear as the last step"))]
    BareTagNotLast,
}

/// Error parsing an [`AttributeSelector`] from its textual representation.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectorParseError {
    /// Could not interpret a step as a tag or a known attribute name.
    #[snafu(display("unrecognized attribute token `{}`", token))]
    UnknownToken {
        /// the offending token
        token: String,
    },
    /// An item index in brackets could not be read.
    #[snafu(display("invalid item index in `{}`", token))]
    InvalidIndex {
        /// the offending token
        token: String,
    },
    /// The resulting steps did not form a valid selector.
    #[snafu(display("{}", source))]
    Steps {
        /// the underlying cause
        source: SelectorFromStepsError,
    },
}

/// A path to a single attribute in a DICOM object,
/// potentially traversing one or more nested sequence items.
///
/// An `AttributeSelector` is usually built via its `From` implementations,
/// or parsed from text via [`DataDictionary::parse_selector`](crate::dictionary::DataDictionary::parse_selector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector(SmallVec<[AttributeSelectorStep; 2]>);

impl AttributeSelector {
    /// Build a selector from a sequence of steps.
    ///
    /// Only the last step may be a bare [`Tag`] step;
    /// every other step must carry an item index.
    pub fn new<I>(steps: I) -> Result<Self, SelectorFromStepsError>
    where
        I: IntoIterator<Item = AttributeSelectorStep>,
    {
        let steps: SmallVec<[AttributeSelectorStep; 2]> = steps.into_iter().collect();
        if steps.is_empty() {
            return Err(SelectorFromStepsError::Empty);
        }
        let last = steps.len() - 1;
        for (i, step) in steps.iter().enumerate() {
            if i != last {
                if let AttributeSelectorStep::Tag(_) = step {
                    return Err(SelectorFromStepsError::BareTagNotLast);
                }
            }
        }
        Ok(AttributeSelector(steps))
    }

    /// The steps of this selector, in traversal order.
    pub fn steps(&self) -> &[AttributeSelectorStep] {
        &self.0
    }
}

impl From<Tag> for AttributeSelector {
    fn from(tag: Tag) -> Self {
        AttributeSelector(smallvec![AttributeSelectorStep::Tag(tag)])
    }
}

impl From<(Tag, u32)> for AttributeSelector {
    fn from((tag, item): (Tag, u32)) -> Self {
        AttributeSelector(smallvec![AttributeSelectorStep::Nested { tag, item }])
    }
}

impl From<(Tag, u32, Tag)> for AttributeSelector {
    fn from((seq, item, leaf): (Tag, u32, Tag)) -> Self {
        AttributeSelector(smallvec![
            AttributeSelectorStep::Nested { tag: seq, item },
            AttributeSelectorStep::Tag(leaf),
        ])
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match step {
                AttributeSelectorStep::Tag(tag) => {
                    write!(f, "({:04X},{:04X})", tag.group(), tag.element())?
                }
                AttributeSelectorStep::Nested { tag, item } => write!(
                    f,
                    "({:04X},{:04X})[{}]",
                    tag.group(),
                    tag.element(),
                    item
                )?,
            }
        }
        Ok(())
    }
}

/// Parse a bare tag expression such as `(0010,0010)`, `0010,0010` or `00100010`.
/// Returns `None` if the text does not match any of these numeric forms.
pub fn parse_tag_expr(text: &str) -> Option<Tag> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);

    if let Some((group, element)) = text.split_once(',') {
        let group = u16::from_str_radix(group.trim(), 16).ok()?;
        let element = u16::from_str_radix(element.trim(), 16).ok()?;
        return Some(Tag(group, element));
    }

    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        let group = u16::from_str_radix(&text[0..4], 16).ok()?;
        let element = u16::from_str_radix(&text[4..8], 16).ok()?;
        return Some(Tag(group, element));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_tags() {
        assert_eq!(parse_tag_expr("(0010,0010)"), Some(Tag(0x0010, 0x0010)));
        assert_eq!(parse_tag_expr("0010,0010"), Some(Tag(0x0010, 0x0010)));
        assert_eq!(parse_tag_expr("00100010"), Some(Tag(0x0010, 0x0010)));
        assert_eq!(parse_tag_expr(""), None);
        assert_eq!(parse_tag_expr("1111,2222,3333"), None);
        assert_eq!(parse_tag_expr("OperatorNickname"), None);
    }

    #[test]
    fn builds_and_prints_selector() {
        let selector = AttributeSelector::from((Tag(0x0040, 0xA730), 1, Tag(0x0040, 0xA730)));
        assert_eq!(selector.to_string(), "(0040,A730)[1].(0040,A730)");
    }

    #[test]
    fn rejects_bare_tag_not_last() {
        let err = AttributeSelector::new([
            AttributeSelectorStep::Tag(Tag(0x0008, 0x0100)),
            AttributeSelectorStep::Tag(Tag(0x0008, 0x0102)),
        ])
        .unwrap_err();
        assert_eq!(err, SelectorFromStepsError::BareTagNotLast);
    }
}
