//! # Notifier
//!
//! Best-effort transactional email. Sends are spawned onto the runtime and
//! never block or fail the request that triggered them; a failed send is
//! logged at warn and dropped.

use chrono::{NaiveDate, NaiveTime};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// One outgoing message, with everything needed to render it.
#[derive(Debug, Clone)]
pub enum Notification {
    Welcome {
        to: String,
        name: String,
        verification_url: String,
    },
    BookingConfirmedFan {
        to: String,
        fan_name: String,
        event_title: String,
        event_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    BookingAlertAdmin {
        to: String,
        admin_name: String,
        fan_name: String,
        fan_email: String,
        fan_phone: String,
        event_title: String,
        event_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    BookingCancelled {
        to: String,
        user_name: String,
        event_title: String,
        event_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Welcome { to, .. }
            | Notification::BookingConfirmedFan { to, .. }
            | Notification::BookingAlertAdmin { to, .. }
            | Notification::BookingCancelled { to, .. } => to,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "Welcome to Bookline",
            Notification::BookingConfirmedFan { .. } => "Booking Confirmation",
            Notification::BookingAlertAdmin { .. } => "New Booking for Your Event",
            Notification::BookingCancelled { .. } => "Booking Cancellation",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::Welcome {
                name,
                verification_url,
                ..
            } => format!(
                "Hello {name},\n\n\
                 Thank you for registering with Bookline.\n\
                 Please verify your email address: {verification_url}\n\n\
                 If you didn't create an account, you can safely ignore this email.\n\n\
                 Best regards,\nThe Bookline Team\n"
            ),
            Notification::BookingConfirmedFan {
                fan_name,
                event_title,
                event_date,
                start_time,
                end_time,
                ..
            } => format!(
                "Hello {fan_name},\n\n\
                 Your booking has been confirmed:\n\
                 Event: {event_title}\n\
                 Date: {event_date}\n\
                 Time: {start_time} - {end_time}\n\n\
                 Please arrive on time for your appointment. If you need to cancel,\n\
                 you can do so from your booking history page.\n\n\
                 Best regards,\nThe Bookline Team\n"
            ),
            Notification::BookingAlertAdmin {
                admin_name,
                fan_name,
                fan_email,
                fan_phone,
                event_title,
                event_date,
                start_time,
                end_time,
                ..
            } => format!(
                "Hello {admin_name},\n\n\
                 A new booking has been made for your event \"{event_title}\":\n\
                 Fan: {fan_name} ({fan_email}, {fan_phone})\n\
                 Date: {event_date}\n\
                 Time: {start_time} - {end_time}\n\n\
                 You can view all bookings for this event in your dashboard.\n\n\
                 Best regards,\nThe Bookline Team\n"
            ),
            Notification::BookingCancelled {
                user_name,
                event_title,
                event_date,
                start_time,
                end_time,
                ..
            } => format!(
                "Hello {user_name},\n\n\
                 The following booking has been cancelled:\n\
                 Event: {event_title}\n\
                 Date: {event_date}\n\
                 Time: {start_time} - {end_time}\n\n\
                 The time slot is now available for others to book.\n\n\
                 Best regards,\nThe Bookline Team\n"
            ),
        }
    }
}

/// Side-channel message sender. Implementations must not surface failures
/// to the caller; the reservation that triggered a send must stand whether
/// or not the email goes out.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends mail over SMTP via lettre, one spawned task per message.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_transport(config: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build())
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, notification: Notification) {
        let config = self.config.clone();

        tokio::spawn(async move {
            let recipient = notification.recipient().to_string();

            let result = async {
                let message = Message::builder()
                    .from(
                        format!("{} <{}>", config.from_name, config.from_email)
                            .parse()
                            .map_err(|e| format!("Invalid from address: {e}"))?,
                    )
                    .to(recipient
                        .parse()
                        .map_err(|e| format!("Invalid recipient address: {e}"))?)
                    .subject(notification.subject())
                    .header(ContentType::TEXT_PLAIN)
                    .body(notification.body())
                    .map_err(|e| format!("Failed to build message: {e}"))?;

                let transport = SmtpNotifier::build_transport(&config)?;
                transport
                    .send(message)
                    .await
                    .map_err(|e| format!("SMTP send failed: {e}"))?;

                Ok::<(), String>(())
            }
            .await;

            match result {
                Ok(()) => tracing::debug!("Sent notification email to {}", recipient),
                Err(err) => tracing::warn!("Failed to send email to {}: {}", recipient, err),
            }
        });
    }
}

/// Discards every message; used in tests and unconfigured deployments.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(
            "Notification suppressed (no SMTP configured): {} to {}",
            notification.subject(),
            notification.recipient()
        );
    }
}
