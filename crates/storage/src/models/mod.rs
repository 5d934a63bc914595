mod activity;
mod audit_log;
mod certificate;
mod enrollment;
mod history;
mod message;
mod notification;
mod password_reset;
mod user;

pub use activity::{Activity, ActivityStatus};
pub use audit_log::AuditLogEntry;
pub use certificate::Certificate;
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use history::HistoryRecord;
pub use message::Message;
pub use notification::{Notification, NotificationKind};
pub use password_reset::{CODE_TTL_MINUTES, PasswordReset, RESET_TOKEN_TTL_MINUTES};
pub use user::{Role, User};
