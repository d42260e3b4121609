use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::{Session, SessionError};

/// In-memory session registry shared by handlers and optimization tasks.
///
/// Access goes through short closures so the lock is never held across an
/// await point.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn remove(&self, id: Uuid) -> Result<Session, SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn read<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }

    pub async fn write<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_read() {
        let store = SessionStore::new();
        let id = store.insert(Session::new().unwrap()).await;
        let len = store.read(id, |s| Ok(s.blocks().len())).await.unwrap();
        assert!(len > 0);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new();
        let missing = Uuid::new_v4();
        let err = store.read(missing, |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_remove_frees_session() {
        let store = SessionStore::new();
        let id = store.insert(Session::new().unwrap()).await;
        assert_eq!(store.remove(id).await.unwrap().id, id);

        let err = store.read(id, |_| Ok(())).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
        assert!(matches!(store.remove(id).await, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_session() {
        let store = SessionStore::new();
        let id = store.insert(Session::new().unwrap()).await;
        let result = store
            .write(id, |s| s.delete_block(&"heading-work".into(), false))
            .await;
        assert!(result.is_err());
        let still_there = store
            .read(id, |s| Ok(s.blocks().contains(&"work-0".into())))
            .await
            .unwrap();
        assert!(still_there);
    }
}
