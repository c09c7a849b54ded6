use crate::scheduled_post::{PostDraft, PostId, ScheduledPost};
use crate::storage::{Storage, StorageError};
use tracing::{debug, error, info, warn};

pub const STORAGE_KEY: &str = "scheduled_posts";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot serialize posts: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Persist(#[from] StorageError),
}

/// The authoritative post collection, mirrored to storage on every change.
pub struct PostStore {
    storage: Box<dyn Storage>,
    posts: Vec<ScheduledPost>,
}

impl PostStore {
    /// Load the collection from storage.
    ///
    /// Never fails: a missing, unreadable or malformed value leaves the
    /// store empty and is only logged.
    pub fn load(storage: impl Storage + 'static) -> Self {
        let posts: Vec<ScheduledPost> = match storage.get_item(STORAGE_KEY) {
            Ok(Some(serialized)) => match serde_json::from_str(&serialized) {
                Ok(posts) => posts,
                Err(e) => {
                    warn!("discarding malformed {STORAGE_KEY}: {e}");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!("no stored {STORAGE_KEY}, starting empty");
                Vec::new()
            }
            Err(e) => {
                error!("cannot load {STORAGE_KEY}: {e}");
                Vec::new()
            }
        };
        debug!(count = posts.len(), "post store loaded");

        PostStore {
            storage: Box::new(storage),
            posts,
        }
    }

    pub fn list(&self) -> &[ScheduledPost] {
        &self.posts
    }

    pub fn get(&self, id: &PostId) -> Option<&ScheduledPost> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn add(&mut self, draft: PostDraft) -> Result<ScheduledPost, StoreError> {
        let id = loop {
            let candidate = PostId::generate();
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let post = ScheduledPost::new(id, draft);
        self.posts.push(post.clone());

        if let Err(e) = self.save() {
            self.posts.pop();
            return Err(e);
        }
        info!(id = %post.id, "scheduled post added");
        Ok(post)
    }

    pub fn delete(&mut self, id: &PostId) -> Result<(), StoreError> {
        let index = self.posts.iter().position(|p| &p.id == id);
        let removed = index.map(|i| (i, self.posts.remove(i)));

        if let Err(e) = self.save() {
            if let Some((index, post)) = removed {
                self.posts.insert(index, post);
            }
            return Err(e);
        }
        if removed.is_some() {
            info!(id = %id, "scheduled post deleted");
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&self.posts)?;
        self.storage
            .set_item(STORAGE_KEY, &serialized)
            .inspect_err(|e| error!("cannot persist {STORAGE_KEY}: {e}"))?;
        debug!(count = self.posts.len(), "post store saved");
        Ok(())
    }
}
