use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::blocks::BlockId;
use crate::optimizer::SharedOptimizer;
use crate::session::{SessionError, SessionStore};

/// Starts optimizing one block in the background.
///
/// The block is marked pending and its text captured before this returns;
/// the optimizer call runs on a spawned task without holding the store lock.
/// The result is applied in a single write when it arrives.
pub async fn spawn_block_optimization(
    store: SessionStore,
    optimizer: SharedOptimizer,
    session_id: Uuid,
    block_id: BlockId,
) -> Result<JoinHandle<()>, SessionError> {
    let text = store
        .write(session_id, |session| session.begin_optimization(&block_id))
        .await?;
    info!(session = %session_id, block = %block_id, chars = text.len(), "optimization started");

    Ok(tokio::spawn(async move {
        let result = optimizer.optimize(&text).await;
        let applied = store
            .write(session_id, |session| {
                session.finish_optimization(&block_id, result);
                Ok(())
            })
            .await;
        if let Err(e) = applied {
            warn!(session = %session_id, block = %block_id, "optimization result dropped: {e}");
        }
    }))
}
