pub const APP_NAME: &str = "Parley";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_GROUP_NAME_LENGTH: usize = 100;
pub const MAX_ATTACHMENT_URL_LENGTH: usize = 2048;
pub const PRIVATE_CHATROOM_PARTICIPANTS: usize = 2;

// Message history paging
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// WebSocket
pub const WS_PING_FRAME: &str = "PING";

// Action queue
pub const ACTION_QUEUE_NAME: &str = "chat_actions";
pub const QUEUE_POLL_INTERVAL_MS: u64 = 500;
pub const QUEUE_RETRY_DELAY_MS: u64 = 1_000;
