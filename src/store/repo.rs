use super::file::{JsonFile, LoadPolicy, StoreError};
use crate::model::SponsorChannel;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

pub const SPONSORS_FILE: &str = "sponsors.json";
pub const USERS_FILE: &str = "users.json";
pub const VIDEOS_FILE: &str = "videos.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddSponsor {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveSponsor {
    Removed,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub users: usize,
    pub videos: usize,
    pub sponsors: usize,
}

/// The bot's three collections, each backed by its own file in the data dir.
#[derive(Debug)]
pub struct Stores {
    sponsors: JsonFile<Vec<SponsorChannel>>,
    users: JsonFile<Vec<i64>>,
    videos: JsonFile<BTreeMap<String, i32>>,
}

impl Stores {
    /// Load all collections from `dir`. The sponsor list must already exist,
    /// the video map is created on first run and the user list fails soft.
    pub async fn open(dir: &Path) -> Result<Self, StoreError> {
        let sponsors = JsonFile::open(dir.join(SPONSORS_FILE), LoadPolicy::Required).await?;
        let users = JsonFile::open(dir.join(USERS_FILE), LoadPolicy::FailSoft).await?;
        let videos = JsonFile::open(dir.join(VIDEOS_FILE), LoadPolicy::CreateIfMissing).await?;
        Ok(Self {
            sponsors,
            users,
            videos,
        })
    }

    /// Write an empty sponsor list if none is provisioned yet.
    pub async fn provision(dir: &Path) -> Result<bool, StoreError> {
        let path = dir.join(SPONSORS_FILE);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(false);
        }
        JsonFile::<Vec<SponsorChannel>>::open(&path, LoadPolicy::CreateIfMissing).await?;
        info!(path=%path.display(), "provisioned empty sponsor list");
        Ok(true)
    }

    pub async fn sponsors(&self) -> Vec<SponsorChannel> {
        self.sponsors.snapshot().await
    }

    #[instrument(skip(self))]
    pub async fn add_sponsor(&self, channel: SponsorChannel) -> Result<AddSponsor, StoreError> {
        self.sponsors
            .update(|list| {
                if list.contains(&channel) {
                    (AddSponsor::AlreadyPresent, false)
                } else {
                    list.push(channel);
                    (AddSponsor::Added, true)
                }
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_sponsor(&self, handle: &str) -> Result<RemoveSponsor, StoreError> {
        self.sponsors
            .update(|list| match list.iter().position(|c| c.as_str() == handle) {
                Some(idx) => {
                    list.remove(idx);
                    (RemoveSponsor::Removed, true)
                }
                None => (RemoveSponsor::NotFound, false),
            })
            .await
    }

    /// Record a user id. Returns true if the id was not known before.
    pub async fn register_user(&self, user_id: i64) -> Result<bool, StoreError> {
        self.users
            .update(|ids| {
                if ids.contains(&user_id) {
                    (false, false)
                } else {
                    ids.push(user_id);
                    (true, true)
                }
            })
            .await
    }

    pub async fn users(&self) -> Vec<i64> {
        self.users.snapshot().await
    }

    /// Map `code` to a media-channel message id, returning the replaced id.
    #[instrument(skip(self))]
    pub async fn save_video(&self, code: &str, message_id: i32) -> Result<Option<i32>, StoreError> {
        self.videos
            .update(|map| (map.insert(code.to_string(), message_id), true))
            .await
    }

    pub async fn video(&self, code: &str) -> Option<i32> {
        self.videos.read(|map| map.get(code).copied()).await
    }

    pub async fn stats(&self) -> Stats {
        Stats {
            users: self.users.read(Vec::len).await,
            videos: self.videos.read(BTreeMap::len).await,
            sponsors: self.sponsors.read(Vec::len).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn fresh() -> (tempfile::TempDir, Stores) {
        let td = tempdir().unwrap();
        Stores::provision(td.path()).await.unwrap();
        let stores = Stores::open(td.path()).await.unwrap();
        (td, stores)
    }

    #[tokio::test]
    async fn open_requires_sponsor_file() {
        let td = tempdir().unwrap();
        let err = Stores::open(td.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn provision_is_idempotent() {
        let td = tempdir().unwrap();
        std::fs::write(td.path().join(SPONSORS_FILE), r#"["@kino"]"#).unwrap();
        assert!(!Stores::provision(td.path()).await.unwrap());
        let stores = Stores::open(td.path()).await.unwrap();
        assert_eq!(stores.sponsors().await, vec![SponsorChannel::new("@kino")]);
    }

    #[tokio::test]
    async fn sponsors_keep_insertion_order() {
        let (td, stores) = fresh().await;
        assert_eq!(stores.add_sponsor(SponsorChannel::new("@b")).await.unwrap(), AddSponsor::Added);
        assert_eq!(stores.add_sponsor(SponsorChannel::new("@a")).await.unwrap(), AddSponsor::Added);
        assert_eq!(
            stores.add_sponsor(SponsorChannel::new("@b")).await.unwrap(),
            AddSponsor::AlreadyPresent
        );
        assert_eq!(stores.remove_sponsor("@c").await.unwrap(), RemoveSponsor::NotFound);

        let on_disk: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(td.path().join(SPONSORS_FILE)).unwrap())
                .unwrap();
        assert_eq!(on_disk, vec!["@b", "@a"]);

        assert_eq!(stores.remove_sponsor("@b").await.unwrap(), RemoveSponsor::Removed);
        assert_eq!(stores.sponsors().await, vec![SponsorChannel::new("@a")]);
    }

    #[tokio::test]
    async fn videos_last_write_wins() {
        let (td, stores) = fresh().await;
        assert_eq!(stores.save_video("42", 555).await.unwrap(), None);
        assert_eq!(stores.save_video("42", 777).await.unwrap(), Some(555));
        assert_eq!(stores.video("42").await, Some(777));
        assert_eq!(stores.video("43").await, None);

        let reopened = Stores::open(td.path()).await.unwrap();
        assert_eq!(reopened.video("42").await, Some(777));
    }

    #[tokio::test]
    async fn users_are_a_set() {
        let (td, stores) = fresh().await;
        assert!(stores.register_user(1).await.unwrap());
        assert!(!stores.register_user(1).await.unwrap());
        assert!(stores.register_user(2).await.unwrap());
        assert_eq!(stores.users().await, vec![1, 2]);

        let on_disk: Vec<i64> =
            serde_json::from_str(&std::fs::read_to_string(td.path().join(USERS_FILE)).unwrap())
                .unwrap();
        assert_eq!(on_disk, vec![1, 2]);

        assert_eq!(
            stores.stats().await,
            Stats {
                users: 2,
                videos: 0,
                sponsors: 0
            }
        );
    }
}
