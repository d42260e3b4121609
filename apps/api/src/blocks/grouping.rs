//! Grouping Projection — derives the heading → children view from the flat
//! block list. Nothing here is stored; callers recompute it on every read.

use std::collections::HashMap;

use serde::Serialize;

use crate::blocks::{Block, BlockId};

/// A heading paired with its children, in flat-collection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingGroup<'a> {
    pub heading: &'a Block,
    pub children: Vec<&'a Block>,
}

/// One group per heading, in encounter order. Children keep their relative
/// order from the flat list even when they are scattered in storage.
///
/// A block whose parent does not resolve to a heading is left out of every
/// group rather than failing the projection.
pub fn project(blocks: &[Block]) -> Vec<HeadingGroup<'_>> {
    let mut by_parent: HashMap<&BlockId, Vec<&Block>> = HashMap::new();
    for block in blocks {
        if let Some(parent) = &block.parent_id {
            by_parent.entry(parent).or_default().push(block);
        }
    }

    blocks
        .iter()
        .filter(|b| b.is_heading())
        .map(|heading| HeadingGroup {
            heading,
            children: by_parent.remove(&heading.id).unwrap_or_default(),
        })
        .collect()
}

/// Non-heading blocks without a parent. They belong to no group.
pub fn loose_blocks(blocks: &[Block]) -> Vec<&Block> {
    blocks
        .iter()
        .filter(|b| !b.is_heading() && b.parent_id.is_none())
        .collect()
}

/// Rebuilds a flat list: loose blocks first, then every group as its heading
/// followed by its children.
pub fn flatten(loose: &[&Block], groups: &[HeadingGroup<'_>]) -> Vec<Block> {
    let capacity = loose.len() + groups.iter().map(|g| 1 + g.children.len()).sum::<usize>();
    let mut flat = Vec::with_capacity(capacity);
    flat.extend(loose.iter().map(|&b| b.clone()));
    for group in groups {
        flat.push(group.heading.clone());
        flat.extend(group.children.iter().map(|&b| b.clone()));
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::test_support::{heading, para, two_sections};
    use crate::blocks::BlockBody;

    fn group_ids<'a>(groups: &[HeadingGroup<'a>]) -> Vec<(&'a str, Vec<&'a str>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.heading.id.as_str(),
                    g.children.iter().map(|c| c.id.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_project_groups_children_under_headings() {
        let blocks = two_sections();
        let groups = project(blocks.blocks());
        assert_eq!(
            group_ids(&groups),
            vec![("H1", vec!["c1", "c2"]), ("H2", vec!["c3"])]
        );
    }

    #[test]
    fn test_project_collects_scattered_children() {
        let blocks = vec![
            heading("H1"),
            para("c1", "H1"),
            heading("H2"),
            para("c3", "H2"),
            para("c2", "H1"),
        ];
        let groups = project(&blocks);
        assert_eq!(
            group_ids(&groups),
            vec![("H1", vec!["c1", "c2"]), ("H2", vec!["c3"])]
        );
    }

    #[test]
    fn test_project_omits_dangling_children() {
        let blocks = vec![heading("H1"), para("c1", "H1"), para("orphan", "gone")];
        let groups = project(&blocks);
        assert_eq!(group_ids(&groups), vec![("H1", vec!["c1"])]);
    }

    #[test]
    fn test_project_empty_heading_has_no_children() {
        let blocks = vec![heading("H1")];
        let groups = project(&blocks);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].children.is_empty());
    }

    #[test]
    fn test_loose_blocks_are_unparented_non_headings() {
        let intro = Block::with_id("intro", BlockBody::Paragraph("<p>hi</p>".into()));
        let blocks = vec![intro, heading("H1"), para("c1", "H1")];
        let loose: Vec<&str> = loose_blocks(&blocks).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(loose, vec!["intro"]);
    }

    #[test]
    fn test_project_then_flatten_round_trips_grouped_input() {
        let blocks = two_sections();
        let flat = flatten(&loose_blocks(blocks.blocks()), &project(blocks.blocks()));
        assert_eq!(flat, blocks.blocks());
    }

    #[test]
    fn test_flatten_makes_scattered_children_contiguous() {
        let blocks = vec![
            heading("H1"),
            para("c1", "H1"),
            heading("H2"),
            para("c2", "H1"),
        ];
        let flat = flatten(&loose_blocks(&blocks), &project(&blocks));
        let ids: Vec<&str> = flat.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["H1", "c1", "c2", "H2"]);
    }
}
