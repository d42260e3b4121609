use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::blocks::grouping::{loose_blocks, project};
use crate::blocks::reorder::DragRequest;
use crate::blocks::{Block, BlockContent, BlockId, BlockKind};
use crate::errors::AppError;
use crate::resume::ResumeData;
use crate::session::{spawn_block_optimization, Notification, Session};
use crate::state::AppState;

/// A block as the rendering surface receives it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub pending: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub heading: BlockView,
    pub children: Vec<BlockView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub blocks: Vec<BlockView>,
    pub loose: Vec<BlockView>,
    pub groups: Vec<GroupView>,
    pub resume: ResumeData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub loose: Vec<BlockView>,
    pub groups: Vec<GroupView>,
}

fn view(session: &Session, block: &Block) -> BlockView {
    BlockView {
        block: block.clone(),
        pending: session.is_pending(&block.id),
    }
}

/// Groups and loose blocks of `blocks`, with pending flags from `session`.
fn grouped(session: &Session, blocks: &[Block]) -> (Vec<BlockView>, Vec<GroupView>) {
    let loose = loose_blocks(blocks).into_iter().map(|b| view(session, b)).collect();
    let groups = project(blocks)
        .into_iter()
        .map(|group| GroupView {
            heading: view(session, group.heading),
            children: group.children.into_iter().map(|b| view(session, b)).collect(),
        })
        .collect();
    (loose, groups)
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        let blocks = session.blocks().blocks();
        let (loose, groups) = grouped(session, blocks);
        Self {
            id: session.id,
            blocks: blocks.iter().map(|b| view(session, b)).collect(),
            loose,
            groups,
            resume: session.resume().clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBlockRequest {
    pub anchor_id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: Option<BlockContent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBlockResponse {
    pub block_id: BlockId,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: BlockContent,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceBlocksRequest {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub path: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeAccepted {
    pub block_id: BlockId,
    pub pending: bool,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let session = Session::new()?;
    let snapshot = SessionSnapshot::of(&session);
    let blocks = session.blocks().len();
    let id = state.sessions.insert(session).await;
    info!(session = %id, blocks, "session created");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.sessions.read(id, |s| Ok(SessionSnapshot::of(s))).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!(session = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/blocks
pub async fn handle_replace_blocks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceBlocksRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .write(id, |s| {
            s.replace_blocks(req.blocks)?;
            Ok(SessionSnapshot::of(s))
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/blocks
pub async fn handle_insert_block(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InsertBlockRequest>,
) -> Result<(StatusCode, Json<InsertBlockResponse>), AppError> {
    let response = state
        .sessions
        .write(id, |s| {
            let block_id = s.insert_after(&req.anchor_id, req.kind, req.content)?;
            Ok(InsertBlockResponse {
                block_id,
                session: SessionSnapshot::of(s),
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/sessions/:id/blocks/:block_id/content
pub async fn handle_update_content(
    State(state): State<AppState>,
    Path((id, block_id)): Path<(Uuid, BlockId)>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .write(id, |s| {
            s.update_block_content(&block_id, req.content)?;
            Ok(SessionSnapshot::of(s))
        })
        .await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:id/blocks/:block_id
pub async fn handle_delete_block(
    State(state): State<AppState>,
    Path((id, block_id)): Path<(Uuid, BlockId)>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .write(id, |s| {
            s.delete_block(&block_id, query.cascade)?;
            Ok(SessionSnapshot::of(s))
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/blocks/:block_id/promote
pub async fn handle_promote_block(
    State(state): State<AppState>,
    Path((id, block_id)): Path<(Uuid, BlockId)>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .write(id, |s| {
            s.promote(&block_id)?;
            Ok(SessionSnapshot::of(s))
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/blocks/:block_id/optimize
///
/// Returns as soon as the block is marked pending; the outcome arrives as a
/// notification.
pub async fn handle_optimize_block(
    State(state): State<AppState>,
    Path((id, block_id)): Path<(Uuid, BlockId)>,
) -> Result<(StatusCode, Json<OptimizeAccepted>), AppError> {
    spawn_block_optimization(state.sessions.clone(), state.optimizer.clone(), id, block_id.clone()).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(OptimizeAccepted {
            block_id,
            pending: true,
        }),
    ))
}

/// POST /api/v1/sessions/:id/reorder
pub async fn handle_reorder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DragRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .write(id, |s| {
            s.apply_drag(&req)?;
            Ok(SessionSnapshot::of(s))
        })
        .await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let preview = state
        .sessions
        .read(id, |s| {
            let resolved = s.preview()?;
            let (loose, groups) = grouped(s, &resolved);
            Ok(PreviewResponse { loose, groups })
        })
        .await?;
    Ok(Json(preview))
}

/// PATCH /api/v1/sessions/:id/resume
pub async fn handle_update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<ResumeData>, AppError> {
    let resume = state
        .sessions
        .write(id, |s| {
            s.update_field(&req.path, req.value)?;
            Ok(s.resume().clone())
        })
        .await?;
    Ok(Json(resume))
}

/// GET /api/v1/sessions/:id/notifications
pub async fn handle_drain_notifications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state.sessions.write(id, |s| Ok(s.drain_notifications())).await?;
    Ok(Json(notifications))
}
