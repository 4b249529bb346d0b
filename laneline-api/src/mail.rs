use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use laneline_core::{Booking, Package, TimeSlot};
use laneline_store::app_config::MailConfig;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
    fn operator_email(&self) -> &str;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
    operator_email: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| anyhow!("mail enabled but smtp_host not set"))?;
        let port = config.smtp_port.unwrap_or(587);
        let username = config
            .smtp_username
            .clone()
            .ok_or_else(|| anyhow!("mail enabled but smtp_username not set"))?;
        let password = config
            .smtp_password
            .clone()
            .ok_or_else(|| anyhow!("mail enabled but smtp_password not set"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .context("Failed to create SMTP transport")?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            operator_email: config.operator_email.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let from = format!("{} <{}>", self.from_name, self.from_email);
        let email = Message::builder()
            .from(from.parse().context("Invalid from address")?)
            .to(message.to.parse().context("Invalid to address")?)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.body_html)
            .context("Failed to build email")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;
        Ok(())
    }

    fn operator_email(&self) -> &str {
        &self.operator_email
    }
}

/// Stand-in when mail is not configured; delivery is logged and dropped.
pub struct NoopMailer {
    operator_email: String,
}

impl NoopMailer {
    pub fn new(operator_email: String) -> Self {
        Self { operator_email }
    }
}

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        tracing::info!("Mail disabled; dropping \"{}\" to {}", message.subject, message.to);
        Ok(())
    }

    fn operator_email(&self) -> &str {
        &self.operator_email
    }
}

pub fn build_mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(NoopMailer {
            operator_email: config.operator_email.clone(),
        }))
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Purchase confirmation carrying the package code, sent once the payment
/// event lands. None when the package has no email on file.
pub fn package_confirmation(package: &Package) -> Option<EmailMessage> {
    let to = package.customer_email.clone()?;
    let amount = format!("${:.2}", package.amount_paid_cents as f64 / 100.0);
    let body_html = format!(
        "<h1>Swim Lesson Package Confirmation</h1>\
         <p>Thank you for your purchase!</p>\
         <p>Your package code:</p>\
         <p style=\"font-size:28px;font-weight:bold;letter-spacing:2px\">{code}</p>\
         <p>Save this code - you'll need it to book your lessons.</p>\
         <ul>\
           <li>Program: {program}</li>\
           <li>Total lessons: {lessons}</li>\
           <li>Amount paid: {amount}</li>\
         </ul>",
        code = package.code,
        program = package.program,
        lessons = package.lessons_total,
    );
    Some(EmailMessage {
        to,
        subject: format!("Your Package Code: {}", package.code),
        body_html,
    })
}

/// Booking confirmations for the customer and the operator.
pub fn booking_confirmations(
    booking: &Booking,
    slot: &TimeSlot,
    operator_email: &str,
) -> Vec<EmailMessage> {
    let when = format!(
        "{} at {}",
        slot.date.format("%A, %B %-d, %Y"),
        slot.start_time.format("%-I:%M %p")
    );
    let customer = EmailMessage {
        to: booking.customer_email.clone(),
        subject: "Swim Lesson Booking Confirmed".to_string(),
        body_html: format!(
            "<h1>Booking Confirmed</h1>\
             <p>{student} is booked for a {program} lesson on {when}.</p>\
             <p>Package code: {code}</p>",
            student = booking.student_name,
            program = slot.lesson_type,
            code = booking.package_code,
        ),
    };
    let operator = EmailMessage {
        to: operator_email.to_string(),
        subject: format!("New booking: {} on {}", booking.student_name, slot.date),
        body_html: format!(
            "<p>{student} ({program}, group {group}) on {when}.</p>\
             <p>Contact: {name} &lt;{email}&gt;</p>\
             <p>Notes: {notes}</p>",
            student = booking.student_name,
            program = slot.lesson_type,
            group = slot.group_number,
            name = booking.customer_name,
            email = booking.customer_email,
            notes = booking.notes.as_deref().unwrap_or("-"),
        ),
    };
    vec![customer, operator]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use laneline_core::{BookingStatus, PackageStatus, Program, SlotStatus};
    use uuid::Uuid;

    fn package() -> Package {
        Package {
            id: Uuid::new_v4(),
            code: "SPL-6L-123456-ABC".to_string(),
            program: Program::Splashlet,
            lessons_total: 6,
            lessons_remaining: 6,
            amount_paid_cents: 22200,
            payment_reference: Some("pi_1".to_string()),
            status: PackageStatus::Paid,
            customer_email: Some("parent@example.com".to_string()),
            customer_name: None,
            customer_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn package_confirmation_carries_the_code() {
        let message = package_confirmation(&package()).unwrap();
        assert_eq!(message.to, "parent@example.com");
        assert!(message.subject.contains("SPL-6L-123456-ABC"));
        assert!(message.body_html.contains("SPL-6L-123456-ABC"));
        assert!(message.body_html.contains("$222.00"));
    }

    #[test]
    fn package_confirmation_needs_an_address() {
        let mut pkg = package();
        pkg.customer_email = None;
        assert!(package_confirmation(&pkg).is_none());
    }

    #[test]
    fn booking_confirmations_go_to_both_parties() {
        let booking = Booking {
            id: Uuid::new_v4(),
            time_slot_id: Uuid::new_v4(),
            package_code: "SPL-6L-123456-ABC".to_string(),
            student_name: "Sam".to_string(),
            student_birthdate: None,
            customer_name: "Alex".to_string(),
            customer_email: "parent@example.com".to_string(),
            customer_phone: None,
            notes: None,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        let slot = TimeSlot {
            id: booking.time_slot_id,
            date: NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            lesson_type: Program::Splashlet,
            group_number: 1,
            max_capacity: 4,
            current_enrollment: 1,
            status: SlotStatus::Available,
            created_at: Utc::now(),
        };

        let messages = booking_confirmations(&booking, &slot, "frontdesk@example.com");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].to, "parent@example.com");
        assert_eq!(messages[1].to, "frontdesk@example.com");
        assert!(messages[0].body_html.contains("Sam"));
    }
}
