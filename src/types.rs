//! Fragment identifier types
//!
//! An identifier addresses a location inside a chain of linked documents.
//! Format: identifier(/6/4[chap01ref]!/4/2/22/3:268)
//!
//! Each `!`-separated part addresses one document; each `/`-separated
//! step within a part is one hop down the node tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete parsed fragment identifier
///
/// Immutable after construction; safe to resolve concurrently against
/// independent trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// The parts of this identifier, one per addressed document.
    /// Non-empty parts only; empty segments of the input are dropped.
    pub parts: Vec<Part>,
}

/// One part of an identifier: the path within a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Steps in this part, in traversal order (never empty)
    pub steps: Vec<Step>,
}

/// A single step in a part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based ordinal among *all* children of the current node (text
    /// nodes included). A zero index in the input is equivalent to no
    /// index: resolution then relies on the ID anchor alone.
    pub node_index: Option<u32>,
    /// Optional ID assertion `[id]`, usable as a resolution shortcut
    pub node_id: Option<String>,
    /// Trailing sub-location descriptor; only ever present on the last
    /// step of the last part
    pub sub_location: Option<SubLocation>,
}

/// Parsed sub-location suffix of the final step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubLocation {
    /// Character offset within the resolved node
    pub offset: Option<u32>,
    /// Which side of a rendering boundary the offset refers to
    pub side_bias: Option<SideBias>,
    /// Spatial extent within media content (parsed, not interpreted)
    pub spatial: Option<SpatialRange>,
    /// Playback position in seconds (parsed, not interpreted)
    pub temporal: Option<f64>,
}

impl Eq for SubLocation {}

/// Side of a boundary an offset refers to, e.g. a rendered line break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideBias {
    /// Before the boundary
    Before,
    /// After the boundary
    After,
}

/// Normalized 2D extent within media content
///
/// Bounds are integer-truncated: the grammar permits fractional values
/// but they are cut at the decimal point when stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialRange {
    pub from: u32,
    pub to: u32,
}

/// Result of resolving an identifier against a document tree
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation<N> {
    /// The target node
    pub node: N,
    /// Character offset within the node, if the identifier carried one
    pub offset: Option<u32>,
    /// Side bias for the offset, if the identifier carried one
    pub side_bias: Option<SideBias>,
}

impl Identifier {
    /// Number of parts (documents) this identifier spans
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True if the identifier addresses nothing at all
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The sub-location of the terminal step, if any
    pub fn sub_location(&self) -> Option<&SubLocation> {
        self.parts
            .last()
            .and_then(|part| part.steps.last())
            .and_then(|step| step.sub_location.as_ref())
    }
}

impl Step {
    /// Create a step with an index constraint only
    pub fn indexed(node_index: u32) -> Self {
        Self {
            node_index: Some(node_index),
            node_id: None,
            sub_location: None,
        }
    }

    /// Create a step with an index constraint and an ID anchor
    pub fn indexed_with_id(node_index: u32, id: impl Into<String>) -> Self {
        Self {
            node_index: Some(node_index),
            node_id: Some(id.into()),
            sub_location: None,
        }
    }
}

impl SubLocation {
    /// True if no field was populated
    pub fn is_empty(&self) -> bool {
        self.offset.is_none()
            && self.side_bias.is_none()
            && self.spatial.is_none()
            && self.temporal.is_none()
    }
}

// Display implementations write the canonical string form back out.
// Side-bias assertion text is not retained at parse time, so an
// identifier with a side bias serializes as `[;s=a]` / `[;s=b]`.

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identifier(")?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "!")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        if let Some(index) = self.node_index {
            write!(f, "{}", index)?;
        }
        if let Some(ref id) = self.node_id {
            write!(f, "[{}]", id)?;
        }
        if let Some(ref sub) = self.sub_location {
            write!(f, "{}", sub)?;
        }
        Ok(())
    }
}

impl fmt::Display for SubLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(offset) = self.offset {
            write!(f, ":{}", offset)?;
            match self.side_bias {
                Some(SideBias::After) => write!(f, "[;s=a]")?,
                Some(SideBias::Before) => write!(f, "[;s=b]")?,
                None => {}
            }
        }
        if let Some(temporal) = self.temporal {
            write!(f, "~{}", temporal)?;
        }
        if let Some(spatial) = self.spatial {
            write!(f, "@{}:{}", spatial.from, spatial.to)?;
        }
        Ok(())
    }
}
