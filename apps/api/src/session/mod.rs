//! Editing sessions — one block document plus its resume record, held in
//! memory for the lifetime of the process.
//!
//! Every mutation computes the next collection or record first and swaps it
//! in only on success, so a failed call leaves the session exactly as it was.

pub mod handlers;
pub mod optimize;
pub mod store;

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blocks::reorder::{apply_drag, DragRequest};
use crate::blocks::{Block, BlockBody, BlockCollection, BlockContent, BlockError, BlockId, BlockKind};
use crate::optimizer::OptimizerError;
use crate::resume::{default_template, FieldBindings, ResumeData, ResumeError};
use crate::template::{resolve, resolve_blocks};
use crate::text::strip_tags;

pub use optimize::spawn_block_optimization;
pub use store::SessionStore;

/// Oldest notifications are dropped once this many are waiting.
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("{kind} block {id} has no text to optimize")]
    NotOptimizable { id: BlockId, kind: BlockKind },

    #[error("block {0} is already being optimized")]
    AlreadyPending(BlockId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// User-facing message produced outside the request that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub block_id: Option<BlockId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>, block_id: &BlockId) -> Self {
        Self {
            level,
            message: message.into(),
            block_id: Some(block_id.clone()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    blocks: BlockCollection,
    resume: ResumeData,
    bindings: FieldBindings,
    pending: HashSet<BlockId>,
    notifications: VecDeque<Notification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Starter template over sample data.
    pub fn new() -> Result<Self, SessionError> {
        Ok(Self::with_content(default_template()?, ResumeData::sample()))
    }

    pub fn with_content(blocks: BlockCollection, resume: ResumeData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            blocks,
            resume,
            bindings: FieldBindings::defaults(),
            pending: HashSet::new(),
            notifications: VecDeque::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn blocks(&self) -> &BlockCollection {
        &self.blocks
    }

    pub fn resume(&self) -> &ResumeData {
        &self.resume
    }

    pub fn is_pending(&self, block_id: &BlockId) -> bool {
        self.pending.contains(block_id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn notify(&mut self, notification: Notification) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(notification);
    }

    fn commit_blocks(&mut self, blocks: BlockCollection) {
        self.blocks = blocks;
        self.touch();
    }

    /// Replaces the whole collection after validating it.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) -> Result<(), SessionError> {
        let next = BlockCollection::new(blocks)?;
        self.commit_blocks(next);
        Ok(())
    }

    /// Inserts a new block of `kind` after the anchor and returns its id.
    /// Without `content` the block starts from its placeholder.
    pub fn insert_after(
        &mut self,
        anchor_id: &BlockId,
        kind: BlockKind,
        content: Option<BlockContent>,
    ) -> Result<BlockId, SessionError> {
        let mut block = Block::placeholder(kind);
        if let Some(content) = content {
            block.body = BlockBody::from_parts(kind, content).ok_or_else(|| BlockError::ShapeMismatch {
                id: block.id.clone(),
                kind,
            })?;
        }

        let id = block.id.clone();
        let next = self.blocks.insert_after(anchor_id, block)?;
        self.commit_blocks(next);
        Ok(id)
    }

    /// Replaces block content. Bound blocks also write their plain text
    /// through to the resume record; both change together or not at all.
    pub fn update_block_content(&mut self, block_id: &BlockId, content: BlockContent) -> Result<(), SessionError> {
        let next_blocks = self.blocks.update_content(block_id, content)?;

        let next_resume = match self.bindings.get(block_id) {
            Some(binding) => {
                let html = next_blocks
                    .get(block_id)
                    .and_then(|b| b.body.html())
                    .unwrap_or_default();
                // placeholders are stored as typed; the record gets what the reader sees
                let rendered = resolve(html, &self.resume.to_value()?);
                let value = binding.extractor.extract(&strip_tags(&rendered));
                debug!(block = %block_id, path = %binding.path, "writing block text through to resume");
                Some(self.resume.update_path(&binding.path, Value::String(value))?)
            }
            None => None,
        };

        self.blocks = next_blocks;
        if let Some(resume) = next_resume {
            self.resume = resume;
        }
        self.touch();
        Ok(())
    }

    pub fn delete_block(&mut self, block_id: &BlockId, cascade: bool) -> Result<(), SessionError> {
        let next = self.blocks.delete_block(block_id, cascade)?;
        self.commit_blocks(next);
        Ok(())
    }

    pub fn promote(&mut self, block_id: &BlockId) -> Result<(), SessionError> {
        let next = self.blocks.promote_to_heading(block_id)?;
        self.commit_blocks(next);
        Ok(())
    }

    pub fn apply_drag(&mut self, request: &DragRequest) -> Result<(), SessionError> {
        let next = apply_drag(&self.blocks, request)?;
        self.commit_blocks(next);
        Ok(())
    }

    pub fn update_field(&mut self, path: &str, value: Value) -> Result<(), SessionError> {
        self.resume = self.resume.update_field(path, value)?;
        self.touch();
        Ok(())
    }

    /// Blocks with every placeholder filled from the current record.
    pub fn preview(&self) -> Result<Vec<Block>, SessionError> {
        let data = self.resume.to_value()?;
        Ok(resolve_blocks(self.blocks.blocks(), &data))
    }

    /// Marks the block pending and returns the plain text to send to the
    /// optimizer: placeholders resolved, tags stripped.
    pub fn begin_optimization(&mut self, block_id: &BlockId) -> Result<String, SessionError> {
        let block = self
            .blocks
            .get(block_id)
            .ok_or_else(|| BlockError::NotFound(block_id.clone()))?;
        let html = block.body.html().ok_or_else(|| SessionError::NotOptimizable {
            id: block_id.clone(),
            kind: block.kind(),
        })?;
        if self.pending.contains(block_id) {
            return Err(SessionError::AlreadyPending(block_id.clone()));
        }

        let text = strip_tags(&resolve(html, &self.resume.to_value()?));
        self.pending.insert(block_id.clone());
        Ok(text)
    }

    /// Applies an optimizer result. Success replaces the block content
    /// regardless of edits made meanwhile, writing through like a manual
    /// edit; failure leaves it untouched.
    /// Either way the pending flag is cleared and a notification queued.
    pub fn finish_optimization(&mut self, block_id: &BlockId, result: Result<String, OptimizerError>) {
        self.pending.remove(block_id);

        let optimized = match result {
            Ok(optimized) => optimized,
            Err(e) => {
                warn!(block = %block_id, "optimization failed: {e}");
                self.notify(Notification::new(
                    NotificationLevel::Error,
                    format!("Optimization failed: {e}"),
                    block_id,
                ));
                return;
            }
        };

        match self.update_block_content(block_id, BlockContent::Html(optimized)) {
            Ok(()) => {
                info!(block = %block_id, "optimized content applied");
                self.notify(Notification::new(NotificationLevel::Info, "Content optimized", block_id));
            }
            Err(e) => warn!(block = %block_id, "optimization result dropped: {e}"),
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }
}
