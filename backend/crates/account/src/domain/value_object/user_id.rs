pub use kernel::id::{NotificationId, SessionId, UserId};
