//! Block Model — the flat, ordered collection of resume blocks.
//!
//! Storage is a flat `Vec<Block>` with parent pointers plus an id → index map.
//! The heading → children tree is never stored; `grouping::project` derives it
//! on every read. Every operation returns a fresh `BlockCollection` so a
//! caller holding the previous snapshot keeps seeing it unchanged.
//!
//! # Invariants
//! - Block ids are unique.
//! - Headings never have a parent.
//! - A non-null `parent_id` always names a heading in the same collection.

pub mod grouping;
pub mod reorder;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Identity and content types
// ────────────────────────────────────────────────────────────────────────────

/// Opaque block identifier, stable for the block's lifetime and used as the
/// drag-and-drop identity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for blocks created by the "add block" menu.
    pub fn generate() -> Self {
        Self(format!("block-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Field-less mirror of `BlockBody`, used where only the type tag travels
/// (insert requests, error reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    TwoColumn,
    ThreeColumn,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::TwoColumn => "two-column",
            BlockKind::ThreeColumn => "three-column",
        };
        f.write_str(tag)
    }
}

/// Type tag and content shape in one value. Column counts live in the array
/// types, so a two-column block can never hold three columns.
///
/// Serialised as `{ "type": "...", "content": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum BlockBody {
    Heading(String),
    Paragraph(String),
    TwoColumn([String; 2]),
    ThreeColumn([String; 3]),
}

/// Shape-only content supplied by callers: one HTML string, or one string
/// per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Html(String),
    Columns(Vec<String>),
}

impl BlockBody {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockBody::Heading(_) => BlockKind::Heading,
            BlockBody::Paragraph(_) => BlockKind::Paragraph,
            BlockBody::TwoColumn(_) => BlockKind::TwoColumn,
            BlockBody::ThreeColumn(_) => BlockKind::ThreeColumn,
        }
    }

    /// Builds a body of `kind` from caller content. Returns `None` when the
    /// shape does not fit the kind.
    pub fn from_parts(kind: BlockKind, content: BlockContent) -> Option<Self> {
        match (kind, content) {
            (BlockKind::Heading, BlockContent::Html(html)) => Some(BlockBody::Heading(html)),
            (BlockKind::Paragraph, BlockContent::Html(html)) => Some(BlockBody::Paragraph(html)),
            (BlockKind::TwoColumn, BlockContent::Columns(cols)) => {
                cols.try_into().ok().map(BlockBody::TwoColumn)
            }
            (BlockKind::ThreeColumn, BlockContent::Columns(cols)) => {
                cols.try_into().ok().map(BlockBody::ThreeColumn)
            }
            _ => None,
        }
    }

    /// Default content offered by the "add block" menu.
    pub fn placeholder(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Heading => BlockBody::Heading("<h1>New heading</h1>".to_string()),
            BlockKind::Paragraph => BlockBody::Paragraph("<p>New paragraph</p>".to_string()),
            BlockKind::TwoColumn => BlockBody::TwoColumn([
                "<p>Left column</p>".to_string(),
                "<p>Right column</p>".to_string(),
            ]),
            BlockKind::ThreeColumn => BlockBody::ThreeColumn([
                "<p>Left column</p>".to_string(),
                "<p>Middle column</p>".to_string(),
                "<p>Right column</p>".to_string(),
            ]),
        }
    }

    /// The single HTML string of a heading or paragraph.
    pub fn html(&self) -> Option<&str> {
        match self {
            BlockBody::Heading(html) | BlockBody::Paragraph(html) => Some(html),
            _ => None,
        }
    }

    /// Applies `f` to every string, keeping the variant and column order.
    pub fn map_strings(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            BlockBody::Heading(html) => BlockBody::Heading(f(html.as_str())),
            BlockBody::Paragraph(html) => BlockBody::Paragraph(f(html.as_str())),
            BlockBody::TwoColumn([a, b]) => BlockBody::TwoColumn([f(a.as_str()), f(b.as_str())]),
            BlockBody::ThreeColumn([a, b, c]) => {
                BlockBody::ThreeColumn([f(a.as_str()), f(b.as_str()), f(c.as_str())])
            }
        }
    }
}

/// The atomic unit of resume content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub body: BlockBody,
    #[serde(default)]
    pub parent_id: Option<BlockId>,
}

impl Block {
    /// New top-level block with a generated id. `insert_after` assigns the
    /// parent.
    pub fn new(body: BlockBody) -> Self {
        Self {
            id: BlockId::generate(),
            body,
            parent_id: None,
        }
    }

    pub fn with_id(id: impl Into<BlockId>, body: BlockBody) -> Self {
        Self {
            id: id.into(),
            body,
            parent_id: None,
        }
    }

    pub fn child_of(mut self, parent: impl Into<BlockId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn placeholder(kind: BlockKind) -> Self {
        Self::new(BlockBody::placeholder(kind))
    }

    pub fn kind(&self) -> BlockKind {
        self.body.kind()
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.body, BlockBody::Heading(_))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block not found: {0}")]
    NotFound(BlockId),

    #[error("heading {id} still has {children} child block(s); confirm a cascading delete")]
    HasChildren { id: BlockId, children: usize },

    #[error("content shape does not match {kind} block {id}")]
    ShapeMismatch { id: BlockId, kind: BlockKind },

    #[error("block already exists: {0}")]
    DuplicateId(BlockId),

    #[error("heading {0} cannot have a parent")]
    NestedHeading(BlockId),

    #[error("block {id} references {parent}, which is not a heading in this collection")]
    DanglingParent { id: BlockId, parent: BlockId },

    #[error("block {id} is outside the {scope} drag scope")]
    OutOfScope { id: BlockId, scope: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Collection
// ────────────────────────────────────────────────────────────────────────────

/// Ordered block sequence. Insertion order is the rendering and
/// serialisation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockCollection {
    blocks: Vec<Block>,
    index: HashMap<BlockId, usize>,
}

impl BlockCollection {
    /// Validates the collection invariants and builds the id index.
    pub fn new(blocks: Vec<Block>) -> Result<Self, BlockError> {
        let mut index = HashMap::with_capacity(blocks.len());
        for (position, block) in blocks.iter().enumerate() {
            if index.insert(block.id.clone(), position).is_some() {
                return Err(BlockError::DuplicateId(block.id.clone()));
            }
        }

        for block in &blocks {
            let Some(parent) = &block.parent_id else {
                continue;
            };
            if block.is_heading() {
                return Err(BlockError::NestedHeading(block.id.clone()));
            }
            let resolves = index
                .get(parent)
                .is_some_and(|&position| blocks[position].is_heading());
            if !resolves {
                return Err(BlockError::DanglingParent {
                    id: block.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(Self { blocks, index })
    }

    /// Rebuilds the index for a block list the caller already knows to be
    /// consistent.
    fn reindexed(blocks: Vec<Block>) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(position, block)| (block.id.clone(), position))
            .collect();
        Self { blocks, index }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.index.get(id).map(|&position| &self.blocks[position])
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index.contains_key(id)
    }

    pub fn children_of(&self, heading_id: &BlockId) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.parent_id.as_ref() == Some(heading_id))
            .count()
    }

    fn position(&self, id: &BlockId) -> Result<usize, BlockError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| BlockError::NotFound(id.clone()))
    }

    /// Inserts `new_block` immediately after the anchor.
    ///
    /// Parent assignment: headings always become top-level; anything inserted
    /// after a heading becomes that heading's child; anything inserted after a
    /// child joins the same parent.
    pub fn insert_after(&self, anchor_id: &BlockId, mut new_block: Block) -> Result<Self, BlockError> {
        let position = self.position(anchor_id)?;
        if self.contains(&new_block.id) {
            return Err(BlockError::DuplicateId(new_block.id));
        }

        let anchor = &self.blocks[position];
        new_block.parent_id = if new_block.is_heading() {
            None
        } else if anchor.is_heading() {
            Some(anchor.id.clone())
        } else {
            anchor.parent_id.clone()
        };

        let mut blocks = self.blocks.clone();
        blocks.insert(position + 1, new_block);
        Ok(Self::reindexed(blocks))
    }

    /// Replaces a block's content. The shape must match the block's kind.
    pub fn update_content(&self, block_id: &BlockId, content: BlockContent) -> Result<Self, BlockError> {
        let position = self.position(block_id)?;
        let kind = self.blocks[position].kind();
        let body = BlockBody::from_parts(kind, content).ok_or_else(|| BlockError::ShapeMismatch {
            id: block_id.clone(),
            kind,
        })?;

        let mut blocks = self.blocks.clone();
        blocks[position].body = body;
        Ok(Self {
            blocks,
            index: self.index.clone(),
        })
    }

    /// Removes a block. Deleting a heading that still has children requires
    /// `cascade = true`, which removes the children as well.
    pub fn delete_block(&self, block_id: &BlockId, cascade: bool) -> Result<Self, BlockError> {
        let position = self.position(block_id)?;
        if self.blocks[position].is_heading() {
            let children = self.children_of(block_id);
            if children > 0 && !cascade {
                return Err(BlockError::HasChildren {
                    id: block_id.clone(),
                    children,
                });
            }
        }

        let blocks = self
            .blocks
            .iter()
            .filter(|b| b.id != *block_id && b.parent_id.as_ref() != Some(block_id))
            .cloned()
            .collect();
        Ok(Self::reindexed(blocks))
    }

    /// Turns a paragraph into a heading. Headings cannot be nested, so the
    /// promoted block always loses its parent. Promoting a heading changes
    /// nothing; column blocks have no heading form.
    pub fn promote_to_heading(&self, block_id: &BlockId) -> Result<Self, BlockError> {
        let position = self.position(block_id)?;
        let block = &self.blocks[position];
        let html = match &block.body {
            BlockBody::Heading(_) => return Ok(self.clone()),
            BlockBody::Paragraph(html) => html.clone(),
            other => {
                return Err(BlockError::ShapeMismatch {
                    id: block_id.clone(),
                    kind: other.kind(),
                })
            }
        };

        let mut blocks = self.blocks.clone();
        blocks[position].body = BlockBody::Heading(html);
        blocks[position].parent_id = None;
        Ok(Self {
            blocks,
            index: self.index.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn heading(id: &str) -> Block {
        Block::with_id(id, BlockBody::Heading(format!("<h1>{id}</h1>")))
    }

    pub fn para(id: &str, parent: &str) -> Block {
        Block::with_id(id, BlockBody::Paragraph(format!("<p>{id}</p>"))).child_of(parent)
    }

    pub fn ids(collection: &BlockCollection) -> Vec<&str> {
        collection.blocks().iter().map(|b| b.id.as_str()).collect()
    }

    /// `[H1[c1, c2], H2[c3]]`
    pub fn two_sections() -> BlockCollection {
        BlockCollection::new(vec![
            heading("H1"),
            para("c1", "H1"),
            para("c2", "H1"),
            heading("H2"),
            para("c3", "H2"),
        ])
        .unwrap()
    }
}
