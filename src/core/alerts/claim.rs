// Claim detection: a channel is claimed when its name or topic carries the
// configured marker.

use crate::core::config::{ClaimScope, Settings};
use crate::core::host::Directory;
use crate::core::model::Channel;

/// Text searched for the marker, per the configured scope.
fn searchable_text(channel: &Channel, scope: ClaimScope) -> String {
    match scope {
        ClaimScope::Name => channel.name.clone(),
        ClaimScope::Topic => channel.topic.clone(),
        ClaimScope::Either => format!("{}\n{}", channel.name, channel.topic),
    }
}

/// Whether the channel counts as claimed under the current settings.
pub fn is_claimed(channel_id: &str, settings: &Settings, directory: &impl Directory) -> bool {
    let marker = settings.claim_marker.as_str();
    if marker.is_empty() {
        return false;
    }

    let Some(channel) = directory.channel(channel_id) else {
        return false;
    };

    let watched = settings.watched_category_id.as_str();
    if settings.scope_claim_to_category
        && !watched.is_empty()
        && channel.parent_id.as_deref() != Some(watched)
    {
        return false;
    }

    // Literal, case-sensitive match
    searchable_text(&channel, settings.claim_scope).contains(marker)
}
