//! Admin-only operations: broadcast fan-out.
use crate::platform::Platform;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send `text` to each recipient in turn. A failed send is counted and
/// skipped; nothing is retried.
#[instrument(skip(platform, recipients, text), fields(recipients = recipients.len()))]
pub async fn broadcast(platform: &dyn Platform, recipients: &[i64], text: &str) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for &user_id in recipients {
        match platform.send_text(user_id, text, None, None).await {
            Ok(()) => report.sent += 1,
            Err(err) => {
                debug!(?err, user_id, "broadcast send failed");
                report.failed += 1;
            }
        }
    }
    info!(sent = report.sent, failed = report.failed, "broadcast finished");
    report
}
