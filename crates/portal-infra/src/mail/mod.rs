//! Mail backends implementing the [`Mailer`](portal_core::ports::Mailer) port.

mod log;
mod memory;
#[cfg(feature = "smtp")]
mod smtp;

pub use log::LogMailer;
pub use memory::RecordingMailer;
#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer};
