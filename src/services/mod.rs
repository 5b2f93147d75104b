pub mod auth;
pub mod credentials;
pub mod dispatcher;
pub mod mailer;
pub mod notifications;
pub mod scheduling;
pub mod session;

pub use auth::AuthService;
pub use dispatcher::NotificationDispatcher;
pub use mailer::{LogMailer, MailError, Mailer, OutgoingMail, SmtpMailer};
pub use scheduling::SchedulingService;
pub use session::SessionContext;
