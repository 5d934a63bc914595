use std::sync::Arc;

use chrono::Utc;
use storage::{
    Store,
    services::{mail::EmailQueue, reminder_sweep},
};

/// Runs the reminder sweep once a day at `hour`:00 UTC. Never returns.
pub async fn reminder_loop(store: Arc<dyn Store>, mail: EmailQueue, hour: u32) {
    loop {
        let now = Utc::now();
        let next = reminder_sweep::next_run_after(now, hour);
        tracing::info!(next_run = %next, "Reminder sweep scheduled");

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        match reminder_sweep::run(store.as_ref(), &mail, Utc::now()).await {
            Ok(sent) => tracing::info!(sent, "Reminder sweep finished"),
            Err(e) => tracing::warn!(error = %e, "Reminder sweep failed"),
        }
    }
}
