pub mod events;
pub mod sse;
pub mod time;
