//! Drag-Reorder Engine.
//!
//! Two scopes, never mixed in one operation:
//! - top level: headings move together with all of their children;
//! - children: blocks move within one heading's child list only.
//!
//! Both work on the grouping projection and flatten the result back into a
//! new collection, so a failed drag never leaves a partial reorder behind.
//! Flattening normalises storage: loose blocks first, then each heading
//! directly followed by its children.

use serde::{Deserialize, Serialize};

use crate::blocks::grouping::{flatten, loose_blocks, project, HeadingGroup};
use crate::blocks::{BlockCollection, BlockError, BlockId};

/// Which sortable list a drag gesture happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DragScope {
    TopLevel,
    Children {
        #[serde(rename = "headingId")]
        heading_id: BlockId,
    },
}

/// `(source, target, scope)` triple produced by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragRequest {
    pub source_id: BlockId,
    pub target_id: BlockId,
    pub scope: DragScope,
}

pub fn apply_drag(collection: &BlockCollection, request: &DragRequest) -> Result<BlockCollection, BlockError> {
    match &request.scope {
        DragScope::TopLevel => reorder_top_level(collection, &request.source_id, &request.target_id),
        DragScope::Children { heading_id } => {
            reorder_children(collection, heading_id, &request.source_id, &request.target_id)
        }
    }
}

/// Moves the source heading's whole group to the target group's position.
pub fn reorder_top_level(
    collection: &BlockCollection,
    source_id: &BlockId,
    target_id: &BlockId,
) -> Result<BlockCollection, BlockError> {
    if source_id == target_id {
        return Ok(collection.clone());
    }
    for id in [source_id, target_id] {
        let block = collection
            .get(id)
            .ok_or_else(|| BlockError::NotFound(id.clone()))?;
        if !block.is_heading() {
            return Err(BlockError::OutOfScope {
                id: id.clone(),
                scope: "top-level".to_string(),
            });
        }
    }

    let blocks = collection.blocks();
    let mut groups = project(blocks);
    let from = group_position(&groups, source_id)?;
    let to = group_position(&groups, target_id)?;
    move_element(&mut groups, from, to);

    Ok(BlockCollection::reindexed(flatten(&loose_blocks(blocks), &groups)))
}

/// Moves one child to another child's position inside a single heading.
/// Both blocks must currently be children of `heading_id`.
pub fn reorder_children(
    collection: &BlockCollection,
    heading_id: &BlockId,
    source_id: &BlockId,
    target_id: &BlockId,
) -> Result<BlockCollection, BlockError> {
    if source_id == target_id {
        return Ok(collection.clone());
    }
    for id in [heading_id, source_id, target_id] {
        if !collection.contains(id) {
            return Err(BlockError::NotFound(id.clone()));
        }
    }

    let scope = || format!("children-of-{heading_id}");
    let blocks = collection.blocks();
    let mut groups = project(blocks);
    let group = groups
        .iter_mut()
        .find(|g| g.heading.id == *heading_id)
        .ok_or_else(|| BlockError::OutOfScope {
            id: heading_id.clone(),
            scope: scope(),
        })?;

    let child_position = |id: &BlockId| {
        group
            .children
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| BlockError::OutOfScope {
                id: id.clone(),
                scope: scope(),
            })
    };
    let from = child_position(source_id)?;
    let to = child_position(target_id)?;
    move_element(&mut group.children, from, to);

    Ok(BlockCollection::reindexed(flatten(&loose_blocks(blocks), &groups)))
}

fn group_position(groups: &[HeadingGroup<'_>], id: &BlockId) -> Result<usize, BlockError> {
    groups
        .iter()
        .position(|g| g.heading.id == *id)
        .ok_or_else(|| BlockError::NotFound(id.clone()))
}

/// Removes the element at `from` and reinserts it at `to`.
fn move_element<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}
