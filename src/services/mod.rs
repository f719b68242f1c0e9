pub mod mailbox;
pub mod notify_hub;
pub mod providers;
pub mod sink;
