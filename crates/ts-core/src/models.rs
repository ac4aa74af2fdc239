//! # Domain Models
//!
//! These structs represent the core entities of ThreadSpire.
//! We use UUID v7 for time-ordered, globally unique identification.
//! Segments and reactions are embedded in their thread and are only ever
//! addressed through it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::validation;

/// Opaque user identity supplied by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five reactions a reader can leave on a segment.
/// Stored and serialized only in canonical token form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "🤯")]
    MindBlown,
    #[serde(rename = "💡")]
    LightBulb,
    #[serde(rename = "😌")]
    Relaxed,
    #[serde(rename = "🔥")]
    Fire,
    #[serde(rename = "🫶")]
    Love,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::MindBlown,
        ReactionKind::LightBulb,
        ReactionKind::Relaxed,
        ReactionKind::Fire,
        ReactionKind::Love,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ReactionKind::MindBlown => "🤯",
            ReactionKind::LightBulb => "💡",
            ReactionKind::Relaxed => "😌",
            ReactionKind::Fire => "🔥",
            ReactionKind::Love => "🫶",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            ReactionKind::MindBlown => "MIND_BLOWN",
            ReactionKind::LightBulb => "LIGHT_BULB",
            ReactionKind::Relaxed => "RELAXED",
            ReactionKind::Fire => "FIRE",
            ReactionKind::Love => "LOVE",
        }
    }
}

/// Long-form names map to canonical tokens; any other input comes back unchanged.
pub fn normalize_reaction_token(raw: &str) -> &str {
    match raw {
        "MIND_BLOWN" => "🤯",
        "LIGHT_BULB" => "💡",
        "RELAXED" => "😌",
        "FIRE" => "🔥",
        "LOVE" => "🫶",
        other => other,
    }
}

impl FromStr for ReactionKind {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::validation("reaction type is required"));
        }
        let token = normalize_reaction_token(raw);
        Self::ALL
            .into_iter()
            .find(|kind| kind.token() == token)
            .ok_or_else(|| AppError::validation(format!("unsupported reaction type: {token}")))
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ReactionKind,
    pub user: UserId,
}

/// Net effect of a toggle on a segment's reaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added(Uuid),
    Replaced { id: Uuid, previous: ReactionKind },
    Removed(Uuid),
}

/// One ordered content block of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    /// Opaque markup, never parsed here
    pub content: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Segment {
    pub fn new(content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            content,
            reactions: Vec::new(),
        }
    }

    pub fn reaction_of(&self, user: &UserId) -> Option<&Reaction> {
        self.reactions.iter().find(|reaction| &reaction.user == user)
    }

    /// Same kind again removes the user's reaction, a different kind replaces it
    /// in place, otherwise a new entry is appended.
    pub fn toggle_reaction(&mut self, user: &UserId, kind: ReactionKind) -> ReactionChange {
        match self.reactions.iter().position(|reaction| &reaction.user == user) {
            Some(index) if self.reactions[index].kind == kind => {
                let id = self.reactions[index].id;
                self.reactions.retain(|reaction| &reaction.user != user);
                ReactionChange::Removed(id)
            }
            Some(index) => {
                let reaction = &mut self.reactions[index];
                let previous = reaction.kind;
                reaction.kind = kind;
                ReactionChange::Replaced {
                    id: reaction.id,
                    previous,
                }
            }
            None => {
                let id = Uuid::now_v7();
                self.reactions.push(Reaction {
                    id,
                    kind,
                    user: user.clone(),
                });
                ReactionChange::Added(id)
            }
        }
    }

    pub fn remove_reaction(&mut self, reaction_id: Uuid, user: &UserId) -> Result<Reaction> {
        let index = self
            .reactions
            .iter()
            .position(|reaction| reaction.id == reaction_id)
            .ok_or_else(|| AppError::not_found("reaction", reaction_id))?;
        if &self.reactions[index].user != user {
            return Err(AppError::Forbidden(
                "reaction belongs to another user".to_string(),
            ));
        }
        Ok(self.reactions.remove(index))
    }
}

/// Segment as written by a client. `id` names an existing segment on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub content: String,
}

impl SegmentInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
        }
    }

    pub fn existing(id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThread {
    pub title: String,
    #[serde(default)]
    pub segments: Vec<SegmentInput>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Blunt partial update: every provided field replaces the stored one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub segments: Option<Vec<SegmentInput>>,
    pub tags: Option<Vec<String>>,
    pub is_draft: Option<bool>,
}

/// The aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: Uuid,
    pub title: String,
    pub author: UserId,
    pub segments: Vec<Segment>,
    pub tags: Vec<String>,
    pub is_draft: bool,
    /// The thread this one was forked from, if any
    pub original_thread: Option<Uuid>,
    pub fork_count: u32,
    /// Users who bookmarked this thread, each at most once
    pub bookmarks: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Document revision for conditional replaces
    pub version: u64,
}

impl Thread {
    pub fn new(author: UserId, input: NewThread, now: DateTime<Utc>) -> Result<Self> {
        let title = validation::normalize_title(&input.title)?;
        let segments = build_segments(input.segments, &[])?;
        let tags = validation::normalize_tags(&input.tags)?;
        Ok(Self {
            id: Uuid::now_v7(),
            title,
            author,
            segments,
            tags,
            is_draft: true,
            original_thread: None,
            fork_count: 0,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    pub fn ensure_author(&self, caller: &UserId, action: &str) -> Result<()> {
        if &self.author != caller {
            return Err(AppError::Forbidden(format!(
                "only the author may {action} this thread"
            )));
        }
        Ok(())
    }

    pub fn segment(&self, segment_id: Uuid) -> Result<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.id == segment_id)
            .ok_or_else(|| AppError::not_found("segment", segment_id))
    }

    pub fn segment_mut(&mut self, segment_id: Uuid) -> Result<&mut Segment> {
        self.segments
            .iter_mut()
            .find(|segment| segment.id == segment_id)
            .ok_or_else(|| AppError::not_found("segment", segment_id))
    }

    /// Draft -> Published. There is no way back.
    pub fn publish(&mut self) -> Result<()> {
        if !self.is_draft {
            return Err(AppError::InvalidState(
                "thread is already published".to_string(),
            ));
        }
        self.is_draft = false;
        Ok(())
    }

    /// Validates the whole patch before touching any field.
    pub fn apply_patch(&mut self, patch: ThreadPatch) -> Result<()> {
        let title = patch
            .title
            .as_deref()
            .map(validation::normalize_title)
            .transpose()?;
        let segments = patch
            .segments
            .map(|inputs| build_segments(inputs, &self.segments))
            .transpose()?;
        let tags = patch
            .tags
            .as_deref()
            .map(validation::normalize_tags)
            .transpose()?;
        if patch.is_draft == Some(true) && !self.is_draft {
            return Err(AppError::InvalidState(
                "published threads cannot return to draft".to_string(),
            ));
        }

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(segments) = segments {
            self.segments = segments;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if patch.is_draft == Some(false) {
            self.is_draft = false;
        }
        Ok(())
    }

    /// A new draft owned by `caller` with the same title, tags and segment
    /// content. Reactions and bookmarks stay with the source.
    pub fn fork_for(&self, caller: UserId, now: DateTime<Utc>) -> Thread {
        Thread {
            id: Uuid::now_v7(),
            title: self.title.clone(),
            author: caller,
            segments: self
                .segments
                .iter()
                .map(|segment| Segment::new(segment.content.clone()))
                .collect(),
            tags: self.tags.clone(),
            is_draft: true,
            original_thread: Some(self.id),
            fork_count: 0,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Returns false when the user had already bookmarked the thread.
    pub fn add_bookmark(&mut self, user: &UserId) -> bool {
        if self.is_bookmarked_by(user) {
            return false;
        }
        self.bookmarks.push(user.clone());
        true
    }

    pub fn remove_bookmark(&mut self, user: &UserId) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|bookmarked| bookmarked != user);
        self.bookmarks.len() != before
    }

    pub fn is_bookmarked_by(&self, user: &UserId) -> bool {
        self.bookmarks.contains(user)
    }

    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.reactions.len()).sum()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own == tag)
    }

    pub fn shares_tag_with(&self, other: &Thread) -> bool {
        self.tags.iter().any(|tag| other.has_tag(tag))
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Builds the segment list for a create or a wholesale replace. Inputs naming an
/// existing segment keep its id and reactions; the rest start fresh.
fn build_segments(inputs: Vec<SegmentInput>, existing: &[Segment]) -> Result<Vec<Segment>> {
    validation::validate_segment_count(inputs.len())?;
    let mut segments: Vec<Segment> = Vec::with_capacity(inputs.len());
    for input in inputs {
        validation::validate_segment_content(&input.content)?;
        let kept = input
            .id
            .and_then(|id| existing.iter().find(|segment| segment.id == id))
            .filter(|previous| !segments.iter().any(|segment| segment.id == previous.id));
        let segment = match kept {
            Some(previous) => Segment {
                id: previous.id,
                content: input.content,
                reactions: previous.reactions.clone(),
            },
            None => Segment::new(input.content),
        };
        segments.push(segment);
    }
    Ok(segments)
}

/// One-level fork attribution shown next to a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageRef {
    pub thread_id: Uuid,
    pub author: UserId,
    pub title: String,
}

/// A thread as shown on its own page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: Thread,
    /// `None` for originals, and for forks whose source has been deleted
    pub lineage: Option<LineageRef>,
    pub related_threads: Vec<Thread>,
}

/// Derived (user, thread) relation. Its id is the thread id; no creation time is kept.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub thread: Thread,
    pub user: UserId,
}

impl Bookmark {
    pub fn new(thread: Thread, user: UserId) -> Self {
        Self {
            id: thread.id,
            thread,
            user,
        }
    }
}

/// A user-owned named set of weak thread references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner: UserId,
    /// Thread ids in insertion order; targets may no longer exist
    pub threads: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `description: Some("")` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Collection {
    pub fn new(owner: UserId, input: NewCollection, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            name: validation::normalize_collection_name(&input.name)?,
            description: validation::normalize_description(input.description.as_deref())?,
            owner,
            threads: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    pub fn ensure_owner(&self, caller: &UserId) -> Result<()> {
        if &self.owner != caller {
            return Err(AppError::Forbidden(
                "collection belongs to another user".to_string(),
            ));
        }
        Ok(())
    }

    pub fn apply_patch(&mut self, patch: CollectionPatch) -> Result<()> {
        let name = patch
            .name
            .as_deref()
            .map(validation::normalize_collection_name)
            .transpose()?;
        let description = match patch.description.as_deref() {
            Some(raw) => Some(validation::normalize_description(Some(raw))?),
            None => None,
        };
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        Ok(())
    }

    /// Returns false when the reference was already present.
    pub fn add_thread(&mut self, thread_id: Uuid) -> bool {
        if self.threads.contains(&thread_id) {
            return false;
        }
        self.threads.push(thread_id);
        true
    }

    pub fn remove_thread(&mut self, thread_id: Uuid) -> bool {
        let before = self.threads.len();
        self.threads.retain(|id| *id != thread_id);
        self.threads.len() != before
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// A collection with its references joined to the threads that still exist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCollection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner: UserId,
    pub threads: Vec<Thread>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResolvedCollection {
    /// Keeps collection order; references without a matching thread are dropped.
    pub fn join(collection: Collection, mut found: Vec<Thread>) -> Self {
        let threads = collection
            .threads
            .iter()
            .filter_map(|id| {
                let index = found.iter().position(|thread| thread.id == *id)?;
                Some(found.swap_remove(index))
            })
            .collect();
        Self {
            id: collection.id,
            name: collection.name,
            description: collection.description,
            owner: collection.owner,
            threads,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}
