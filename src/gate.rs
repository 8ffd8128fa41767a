use crate::model::SponsorChannel;
use crate::platform::Platform;
use crate::store::Stores;
use tracing::{debug, instrument, warn};

/// True when `user_id` is subscribed to every configured sponsor channel.
#[instrument(skip(platform, stores))]
pub async fn check_subscriptions(platform: &dyn Platform, stores: &Stores, user_id: i64) -> bool {
    let sponsors = stores.sponsors().await;
    subscribed_to_all(platform, &sponsors, user_id).await
}

/// Checks channels in order and stops at the first one that fails. Lookup
/// errors count as not subscribed. An empty list passes.
pub async fn subscribed_to_all(
    platform: &dyn Platform,
    sponsors: &[SponsorChannel],
    user_id: i64,
) -> bool {
    for channel in sponsors {
        match platform.member_status(channel, user_id).await {
            Ok(status) if status.is_subscribed() => {}
            Ok(status) => {
                debug!(channel=%channel.normalized(), status=status.as_str(), "not subscribed");
                return false;
            }
            Err(err) => {
                warn!(?err, channel=%channel.normalized(), "subscription check failed");
                return false;
            }
        }
    }
    true
}
