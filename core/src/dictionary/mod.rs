//! This module contains the concept of a DICOM data dictionary, as well as
//! the related concept of a dictionary of unique identifiers (UIDs).
//!
//! A dictionary maps a DICOM element tag, or a SOP/transfer-syntax UID,
//! to a small amount of descriptive metadata about it. The standard
//! dictionary is provided by a separate crate, so that applications may
//! supply their own (e.g. to cover private tags).

use crate::header::{Tag, VR};
use crate::ops::{parse_tag_expr, AttributeSelector, AttributeSelectorStep, SelectorParseError};
use std::fmt::Debug;

/// A range of tags that a single dictionary entry may describe.
///
/// Most attributes correspond to a single, specific [`Tag`], but some
/// (such as Overlay Data) repeat across a whole group or element range,
/// with part of the tag value acting as a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRange {
    /// A single, specific tag.
    Single(Tag),
    /// A range of tags varying over the upper byte of the group
    /// number (commonly written as `ggxx`).
    Group100(Tag),
    /// A range of tags varying over the upper byte of the element
    /// number (commonly written as `eexx`).
    Element100(Tag),
    /// The generic group length entry, `(gggg,0000)`, for any group.
    GroupLength,
    /// The generic private creator entry, `(gggg,00xx)` for odd groups.
    PrivateCreator,
}

impl TagRange {
    /// Retrieve the tag at the base of this range.
    ///
    /// For [`GroupLength`](TagRange::GroupLength) and
    /// [`PrivateCreator`](TagRange::PrivateCreator), which do not name a
    /// concrete group, this returns `Tag(0, 0)`.
    pub fn inner(&self) -> Tag {
        match self {
            TagRange::Single(tag) | TagRange::Group100(tag) | TagRange::Element100(tag) => *tag,
            TagRange::GroupLength | TagRange::PrivateCreator => Tag(0, 0),
        }
    }

    /// Check whether the given tag is contained in this range.
    pub fn contains(&self, tag: Tag) -> bool {
        match self {
            TagRange::Single(t) => *t == tag,
            TagRange::Group100(t) => Tag(t.0 & 0xFF00, t.1) == Tag(tag.0 & 0xFF00, tag.1),
            TagRange::Element100(t) => Tag(t.0, t.1 & 0xFF00) == Tag(tag.0, tag.1 & 0xFF00),
            TagRange::GroupLength => tag.element() == 0x0000,
            TagRange::PrivateCreator => tag.group() & 1 == 1 && (0x0010..=0x00FF).contains(&tag.1),
        }
    }
}

/// A value representation that may depend on other attributes of the
/// containing data set (bits allocated, pixel representation, and so on)
/// rather than being fixed for the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualVr {
    /// The value representation is always the one given.
    Exact(VR),
    /// The value representation is ambiguous and must be resolved using
    /// contextual information from the data set.
    Ambiguous(AmbiguousVr),
    /// Pixel Data: `OB` or `OW` depending on Bits Allocated.
    Px,
    /// Overlay Data: `OB` or `OW` depending on Bits Allocated.
    Ox,
}

impl From<VR> for VirtualVr {
    fn from(vr: VR) -> Self {
        VirtualVr::Exact(vr)
    }
}

/// The kinds of value representation ambiguity that occur in the standard
/// data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousVr {
    /// `US` or `SS`, resolved via Pixel Representation.
    UsSs,
    /// `US`, `SS`, or `OW`.
    UsSsOw,
    /// `US`, `SS`, `OW`, or `OB`.
    UsSsOwOb,
}

/// A trait for an entry of a data element dictionary.
pub trait DataDictionaryEntry {
    /// The range of tags that this entry applies to.
    fn tag_range(&self) -> TagRange;
    /// The alias of the attribute (e.g. `PatientName`), free of whitespace.
    fn alias(&self) -> &str;
    /// The value representation, which may require further resolution.
    fn vr(&self) -> VirtualVr;
}

/// A plain reference-based dictionary entry, as provided by a
/// statically built data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDictionaryEntryRef<'a> {
    /// The range of tags that this entry applies to.
    pub tag: TagRange,
    /// The alias of the attribute.
    pub alias: &'a str,
    /// The value representation.
    pub vr: VirtualVr,
}

impl DataDictionaryEntry for DataDictionaryEntryRef<'_> {
    fn tag_range(&self) -> TagRange {
        self.tag
    }
    fn alias(&self) -> &str {
        self.alias
    }
    fn vr(&self) -> VirtualVr {
        self.vr
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// Attribute dictionaries provide the means to look up an entry by tag or
/// by alias, as well as by a textual path which may cross sequence items.
pub trait DataDictionary: Debug {
    /// The type of the dictionary entry.
    type Entry: DataDictionaryEntry;

    /// Fetch an entry by its usual alias (e.g. `PatientName`).
    /// Aliases are case sensitive and contain no spaces.
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;

    /// Fetch an entry by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Fetch an entry by either its numeric tag expression
    /// (`(gggg,eeee)`, `gggg,eeee` or `ggggeeee`) or its alias.
    fn by_expr(&self, text: &str) -> Option<&Self::Entry> {
        if let Some(tag) = parse_tag_expr(text) {
            self.by_tag(tag)
        } else {
            self.by_name(text)
        }
    }

    /// Parse a tag expression or attribute alias into a concrete tag.
    fn parse_tag(&self, text: &str) -> Option<Tag> {
        if let Some(tag) = parse_tag_expr(text) {
            Some(tag)
        } else {
            self.by_name(text).map(|e| e.tag_range().inner())
        }
    }

    /// Parse a full attribute selector, such as
    /// `0040A168[0].CodeValue` or `(0040,A730)[1].(0040,A730)`.
    fn parse_selector(&self, text: &str) -> Result<AttributeSelector, SelectorParseError> {
        let segments: Vec<&str> = text.split('.').collect();
        let last = segments.len().saturating_sub(1);
        let mut steps = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().copied().enumerate() {
            let (tag_part, index) = match segment.find('[') {
                Some(start) if segment.ends_with(']') => {
                    let tag_part = &segment[..start];
                    let index_part = &segment[start + 1..segment.len() - 1];
                    let index: u32 =
                        index_part
                            .parse()
                            .map_err(|_| SelectorParseError::InvalidIndex {
                                token: segment.to_string(),
                            })?;
                    (tag_part, Some(index))
                }
                _ => (segment, None),
            };

            let tag = self
                .by_expr(tag_part)
                .map(|e| e.tag_range().inner())
                .or_else(|| parse_tag_expr(tag_part))
                .ok_or_else(|| SelectorParseError::UnknownToken {
                    token: tag_part.to_string(),
                })?;

            if i == last {
                steps.push(match index {
                    Some(item) => AttributeSelectorStep::Nested { tag, item },
                    None => AttributeSelectorStep::Tag(tag),
                });
            } else {
                steps.push(AttributeSelectorStep::Nested {
                    tag,
                    item: index.unwrap_or(0),
                });
            }
        }

        AttributeSelector::new(steps).map_err(|source| SelectorParseError::Steps { source })
    }
}

/// The kind of object identified by a UID dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidType {
    /// A transfer syntax.
    TransferSyntax,
    /// A SOP class.
    SopClass,
    /// A meta SOP class.
    MetaSopClass,
    /// A service class.
    ServiceClass,
    /// A well-known SOP instance.
    WellKnownSopInstance,
    /// An application context name.
    ApplicationContextName,
    /// A coding scheme identifier.
    CodingScheme,
    /// DICOM UIDs used as a coding scheme.
    DicomUidsAsCodingScheme,
    /// A mapping resource.
    MappingResource,
    /// An application hosting model.
    ApplicationHostingModel,
    /// A synchronization frame of reference.
    SynchronizationFrameOfReference,
    /// An LDAP object identifier.
    LdapOid,
}

/// A dictionary entry describing a UID (SOP class, transfer syntax, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidDictionaryEntryRef<'a> {
    /// The UID value, as a dotted numeric string.
    pub uid: &'a str,
    /// A human-readable name for the UID.
    pub name: &'a str,
    /// The short, code-friendly alias (e.g. `Verification`).
    pub alias: &'a str,
    /// What kind of thing this UID identifies.
    pub kind: UidType,
    /// Whether this UID has been retired by the standard.
    pub retired: bool,
}

impl<'a> UidDictionaryEntryRef<'a> {
    /// Construct a new UID dictionary entry.
    pub const fn new(
        uid: &'a str,
        name: &'a str,
        alias: &'a str,
        kind: UidType,
        retired: bool,
    ) -> Self {
        UidDictionaryEntryRef {
            uid,
            name,
            alias,
            kind,
            retired,
        }
    }
}

/// Type trait for a dictionary of DICOM unique identifiers.
pub trait UidDictionary: Debug {
    /// The type of the dictionary entry.
    type Entry: Debug;

    /// Fetch an entry by its alias/keyword (e.g. `Verification`).
    fn by_keyword(&self, keyword: &str) -> Option<&Self::Entry>;

    /// Fetch an entry by its UID value.
    fn by_uid(&self, uid: &str) -> Option<&Self::Entry>;
}
