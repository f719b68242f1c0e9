// Canonical event type constants pushed to mailbox client sessions
pub struct Events;

impl Events {
    pub const SUMMARY_READY: &'static str = "summary_ready";
    pub const HEARTBEAT: &'static str = "heartbeat";
}
