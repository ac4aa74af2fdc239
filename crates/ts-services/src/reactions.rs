//! Reaction Engine: at most one reaction per user per segment.

use std::sync::Arc;

use tracing::{debug, instrument};
use ts_core::{ReactionKind, Result, Thread, ThreadRepo, UserId};
use uuid::Uuid;

use crate::write::mutate_thread;
use crate::ServiceConfig;

#[derive(Clone)]
pub struct ReactionEngine {
    repo: Arc<dyn ThreadRepo>,
    config: ServiceConfig,
}

impl ReactionEngine {
    pub fn new(repo: Arc<dyn ThreadRepo>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Toggles `user`'s reaction on a segment. `raw_type` may be a canonical token
    /// or a long-form name such as `LIGHT_BULB`.
    ///
    /// Not idempotent: calling twice with the same type removes the reaction again.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn apply_reaction(
        &self,
        thread_id: Uuid,
        segment_id: Uuid,
        user: &UserId,
        raw_type: &str,
    ) -> Result<Thread> {
        let kind: ReactionKind = raw_type.parse()?;
        let mut change = None;
        let thread = mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            change = Some(thread.segment_mut(segment_id)?.toggle_reaction(user, kind));
            Ok(true)
        })
        .await?;
        debug!(?change, %kind, "reaction applied");
        Ok(thread)
    }

    /// Removes one specific reaction; only its owner may do so.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn remove_reaction(
        &self,
        thread_id: Uuid,
        segment_id: Uuid,
        reaction_id: Uuid,
        user: &UserId,
    ) -> Result<Thread> {
        mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            thread.segment_mut(segment_id)?.remove_reaction(reaction_id, user)?;
            Ok(true)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{stored, thread_by};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ts_core::{AppError, MockThreadRepo};

    #[tokio::test]
    async fn long_form_names_are_stored_canonically() {
        let thread = thread_by("alice");
        let (thread_id, segment_id) = (thread.id, thread.segments[0].id);
        let mut repo = MockThreadRepo::new();
        repo.expect_get_thread().returning(move |_| Ok(Some(thread.clone())));
        repo.expect_replace_thread().times(1).returning(|thread| Ok(stored(thread)));
        let engine = ReactionEngine::new(Arc::new(repo), ServiceConfig::default());

        let bob = UserId::from("bob");
        let updated = engine
            .apply_reaction(thread_id, segment_id, &bob, "MIND_BLOWN")
            .await
            .unwrap();
        let reaction = updated.segments[0].reaction_of(&bob).unwrap();
        assert_eq!(reaction.kind, ReactionKind::MindBlown);
        let json = serde_json::to_value(reaction).unwrap();
        assert_eq!(json["type"], "🤯");
    }

    #[tokio::test]
    async fn unknown_reaction_types_are_rejected_without_io() {
        let mut repo = MockThreadRepo::new();
        repo.expect_get_thread().never();
        let engine = ReactionEngine::new(Arc::new(repo), ServiceConfig::default());

        let err = engine
            .apply_reaction(Uuid::now_v7(), Uuid::now_v7(), &UserId::from("bob"), "THUMBS_UP")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn missing_segment_is_not_found() {
        let thread = thread_by("alice");
        let thread_id = thread.id;
        let mut repo = MockThreadRepo::new();
        repo.expect_get_thread().returning(move |_| Ok(Some(thread.clone())));
        repo.expect_replace_thread().never();
        let engine = ReactionEngine::new(Arc::new(repo), ServiceConfig::default());

        let err = engine
            .apply_reaction(thread_id, Uuid::now_v7(), &UserId::from("bob"), "🔥")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("segment", _)));
    }

    #[tokio::test]
    async fn conflicting_write_is_reapplied_on_fresh_state() {
        let original = thread_by("alice");
        let (thread_id, segment_id) = (original.id, original.segments[0].id);

        // Between our read and our write, carol reacted and bumped the version.
        let mut concurrent = stored(&original);
        concurrent.segments[0].toggle_reaction(&UserId::from("carol"), ReactionKind::Love);

        let reads = Arc::new(AtomicUsize::new(0));
        let mut repo = MockThreadRepo::new();
        let seen = reads.clone();
        repo.expect_get_thread().times(2).returning(move |_| {
            let snapshot = if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                original.clone()
            } else {
                concurrent.clone()
            };
            Ok(Some(snapshot))
        });
        repo.expect_replace_thread().times(2).returning(|thread| {
            if thread.version == 1 {
                Err(AppError::Conflict("version 1 is stale".to_string()))
            } else {
                Ok(stored(thread))
            }
        });
        let engine = ReactionEngine::new(Arc::new(repo), ServiceConfig::default());

        let updated = engine
            .apply_reaction(thread_id, segment_id, &UserId::from("bob"), "FIRE")
            .await
            .unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(updated.segments[0].reactions.len(), 2);
        assert_eq!(updated.version, 3);
    }

    #[tokio::test]
    async fn conflict_surfaces_once_attempts_run_out() {
        let thread = thread_by("alice");
        let (thread_id, segment_id) = (thread.id, thread.segments[0].id);
        let mut repo = MockThreadRepo::new();
        repo.expect_get_thread().times(2).returning(move |_| Ok(Some(thread.clone())));
        repo.expect_replace_thread()
            .times(2)
            .returning(|_| Err(AppError::Conflict("stale".to_string())));
        let engine = ReactionEngine::new(
            Arc::new(repo),
            ServiceConfig {
                max_write_attempts: 2,
            },
        );

        let err = engine
            .apply_reaction(thread_id, segment_id, &UserId::from("bob"), "🔥")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
