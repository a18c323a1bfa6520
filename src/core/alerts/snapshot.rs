//! Last known parent category of each channel.
//!
//! Update events carry the new parent but not reliably the old one, so the
//! engine keeps its own record to tell "moved into the watched category"
//! apart from "edited while already inside it".

use std::collections::HashMap;

use crate::core::host::Directory;
use crate::core::model::ChannelId;

#[derive(Debug, Clone, Default)]
pub struct CategorySnapshot {
    parents: HashMap<ChannelId, Option<ChannelId>>,
    /// Watched category the snapshot was last built for
    built_for: Option<String>,
}

impl CategorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the directory when the watched category changed.
    ///
    /// Returns true if a rebuild happened. An empty category id is ignored,
    /// and an unresolvable guild leaves the snapshot empty.
    pub fn refresh_if_needed(&mut self, watched_category_id: &str, directory: &impl Directory) -> bool {
        if watched_category_id.is_empty() {
            return false;
        }
        if self.built_for.as_deref() == Some(watched_category_id) {
            return false;
        }

        self.parents.clear();
        self.built_for = Some(watched_category_id.to_string());

        let Some(guild_id) = directory.guild_id_for_category(watched_category_id) else {
            log::debug!(
                "No guild for category {}, snapshot left empty",
                watched_category_id
            );
            return true;
        };

        for channel in directory.guild_channels(&guild_id).into_channels() {
            self.parents.insert(channel.id, channel.parent_id);
        }
        log::debug!(
            "Snapshot rebuilt for category {} ({} channels)",
            watched_category_id,
            self.parents.len()
        );
        true
    }

    /// Recorded parent of a channel. Unseen channels report `None`.
    pub fn parent_of(&self, channel_id: &str) -> Option<&str> {
        self.parents.get(channel_id).and_then(|p| p.as_deref())
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.parents.contains_key(channel_id)
    }

    /// Overwrite a channel's entry with its current parent.
    pub fn record(&mut self, channel_id: &str, parent_id: Option<&str>) {
        self.parents
            .insert(channel_id.to_string(), parent_id.map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Channel, ChannelKind, GuildChannelList};
    use std::cell::Cell;

    /// Directory that counts listing calls.
    struct CountingDirectory {
        listings: Cell<usize>,
        known_guild: bool,
    }

    impl CountingDirectory {
        fn new(known_guild: bool) -> Self {
            Self {
                listings: Cell::new(0),
                known_guild,
            }
        }
    }

    impl Directory for CountingDirectory {
        fn channel(&self, _id: &str) -> Option<Channel> {
            None
        }

        fn guild_id_for_category(&self, _category_id: &str) -> Option<String> {
            self.known_guild.then(|| "G1".to_string())
        }

        fn guild_channels(&self, _guild_id: &str) -> GuildChannelList {
            self.listings.set(self.listings.get() + 1);
            vec![
                Channel {
                    id: "X".to_string(),
                    parent_id: Some("C1".to_string()),
                    name: "x".to_string(),
                    topic: String::new(),
                    kind: ChannelKind::TEXT,
                },
                Channel {
                    id: "Y".to_string(),
                    parent_id: None,
                    name: "y".to_string(),
                    topic: String::new(),
                    kind: ChannelKind::TEXT,
                },
            ]
            .into()
        }
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let directory = CountingDirectory::new(true);
        let mut snapshot = CategorySnapshot::new();

        assert!(snapshot.refresh_if_needed("C1", &directory));
        assert!(!snapshot.refresh_if_needed("C1", &directory));
        assert_eq!(directory.listings.get(), 1);
        assert_eq!(snapshot.parent_of("X"), Some("C1"));
        assert!(snapshot.contains("Y"));
        assert_eq!(snapshot.parent_of("Y"), None);
    }

    #[test]
    fn test_category_change_rebuilds() {
        let directory = CountingDirectory::new(true);
        let mut snapshot = CategorySnapshot::new();
        snapshot.refresh_if_needed("C1", &directory);
        snapshot.record("Z", Some("C1"));

        assert!(snapshot.refresh_if_needed("C2", &directory));
        assert_eq!(directory.listings.get(), 2);
        assert!(!snapshot.contains("Z"), "old entries are cleared");
    }

    #[test]
    fn test_empty_category_is_noop() {
        let directory = CountingDirectory::new(true);
        let mut snapshot = CategorySnapshot::new();
        assert!(!snapshot.refresh_if_needed("", &directory));
        assert_eq!(directory.listings.get(), 0);
    }

    #[test]
    fn test_unknown_guild_leaves_empty() {
        let directory = CountingDirectory::new(false);
        let mut snapshot = CategorySnapshot::new();
        assert!(snapshot.refresh_if_needed("C1", &directory));
        assert!(snapshot.is_empty());
        assert!(!snapshot.refresh_if_needed("C1", &directory));
    }

    #[test]
    fn test_record_overwrites() {
        let mut snapshot = CategorySnapshot::new();
        snapshot.record("X", Some("A"));
        snapshot.record("X", None);
        assert!(snapshot.contains("X"));
        assert_eq!(snapshot.parent_of("X"), None);
        assert_eq!(snapshot.len(), 1);
    }
}
