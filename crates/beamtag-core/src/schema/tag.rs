//! # Segmentation Tags
//!
//! Defines the tag alphabet shared by the IOB and BIEOU tagging schemes and
//! the transition rules each scheme enforces between consecutive tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BeamtagError;

/// Segmentation tag of a label.
///
/// IOB uses `Beginning`, `Inside` and `Outside`; BIEOU adds `End` and `Unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    Beginning,
    Inside,
    End,
    Outside,
    Unit,
}

impl Tag {
    /// Single-letter annotation used in label strings.
    #[must_use]
    pub fn annotation(self) -> char {
        match self {
            Self::Beginning => 'B',
            Self::Inside => 'I',
            Self::End => 'E',
            Self::Outside => 'O',
            Self::Unit => 'U',
        }
    }

    /// Parse a single-letter annotation.
    pub fn from_annotation(c: char) -> Option<Self> {
        match c {
            'B' => Some(Self::Beginning),
            'I' => Some(Self::Inside),
            'E' => Some(Self::End),
            'O' => Some(Self::Outside),
            'U' => Some(Self::Unit),
            _ => None,
        }
    }

    /// Whether this tag marks the absence of an entity.
    #[must_use]
    pub fn is_outside(self) -> bool {
        self == Self::Outside
    }

    /// Whether this tag continues a segment opened by an earlier token.
    #[must_use]
    pub fn is_continuation(self) -> bool {
        matches!(self, Self::Inside | Self::End)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.annotation())
    }
}

/// Tagging scheme. Exactly one is active per decoding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Inside-Outside-Beginning.
    Iob,
    /// Beginning-Inside-End-Outside-Unit.
    Bieou,
}

impl Scheme {
    /// Tags belonging to this scheme.
    #[must_use]
    pub fn tags(self) -> &'static [Tag] {
        match self {
            Self::Iob => &[Tag::Beginning, Tag::Inside, Tag::Outside],
            Self::Bieou => &[Tag::Beginning, Tag::Inside, Tag::End, Tag::Outside, Tag::Unit],
        }
    }

    /// Whether `tag` belongs to this scheme.
    #[must_use]
    pub fn contains(self, tag: Tag) -> bool {
        self.tags().contains(&tag)
    }

    /// Tags that may close a sequence.
    #[must_use]
    pub fn terminal_tags(self) -> &'static [Tag] {
        match self {
            Self::Iob => &[Tag::Outside],
            Self::Bieou => &[Tag::Outside, Tag::Unit, Tag::End],
        }
    }

    /// Whether `tag` may appear at the last position of a sequence.
    #[must_use]
    pub fn is_terminal(self, tag: Tag) -> bool {
        self.terminal_tags().contains(&tag)
    }

    /// Whether `current` may follow `previous` (`None` at sentence start).
    #[must_use]
    pub fn can_follow(self, current: Tag, previous: Option<Tag>) -> bool {
        if !self.contains(current) || previous.is_some_and(|p| !self.contains(p)) {
            return false;
        }

        match self {
            Self::Iob => match current {
                Tag::Beginning | Tag::Outside => true,
                Tag::Inside => matches!(previous, Some(Tag::Beginning | Tag::Inside)),
                Tag::End | Tag::Unit => false,
            },
            Self::Bieou => match current {
                Tag::Inside | Tag::End => matches!(previous, Some(Tag::Beginning | Tag::Inside)),
                Tag::Beginning | Tag::Outside | Tag::Unit => matches!(
                    previous,
                    None | Some(Tag::Outside | Tag::End | Tag::Unit)
                ),
            },
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iob => write!(f, "iob"),
            Self::Bieou => write!(f, "bieou"),
        }
    }
}

impl FromStr for Scheme {
    type Err = BeamtagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iob" | "bio" => Ok(Self::Iob),
            "bieou" | "bilou" | "iobes" => Ok(Self::Bieou),
            other => Err(BeamtagError::InvalidSchema(format!(
                "unknown tagging scheme {other:?}"
            ))),
        }
    }
}
