use crate::error::AppResult;
use crate::external::{Mailer, OutgoingEmail};
use crate::models::*;
use crate::utils::*;
use std::sync::Arc;

const DEFAULT_SUBJECT: &str = "General enquiry";

/// Contact form relay: one notification to the operator, one acknowledgment to the sender.
#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    contact_address: String,
}

struct ContactForm {
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
}

fn parse_form(request: ContactRequest) -> AppResult<ContactForm> {
    let name = require_field(request.name.as_deref(), "name")?;
    let email = normalize_email(&require_field(request.email.as_deref(), "email")?);
    let message = require_field(request.message.as_deref(), "message")?;
    validate_email(&email)?;
    validate_length(&name, "name", 1, 100)?;
    validate_length(&message, "message", 1, 5000)?;

    let phone = request
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    if let Some(p) = &phone {
        validate_length(p, "phone", 1, 30)?;
    }
    let subject = request
        .subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    validate_length(&subject, "subject", 1, 200)?;

    Ok(ContactForm {
        name,
        email,
        phone,
        subject,
        message,
    })
}

fn operator_notification(form: &ContactForm, to: &str) -> OutgoingEmail {
    let html_body = format!(
        "<h2>New contact form submission</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Subject:</strong> {}</p>\
         <p><strong>Message:</strong></p><p>{}</p>",
        escape_html(&form.name),
        escape_html(&form.email),
        escape_html(form.phone.as_deref().unwrap_or("Not provided")),
        escape_html(&form.subject),
        escape_html(&form.message).replace('\n', "<br>"),
    );
    OutgoingEmail {
        to: to.to_string(),
        reply_to: Some(form.email.clone()),
        subject: format!("Contact form: {}", form.subject),
        html_body,
    }
}

fn acknowledgment(form: &ContactForm) -> OutgoingEmail {
    let html_body = format!(
        "<h2>Thank you for contacting us, {}!</h2>\
         <p>We have received your message and will get back to you as soon as possible.</p>\
         <p><strong>Your message:</strong></p><p>{}</p>\
         <p>Best regards,<br>The WorkersMate team</p>",
        escape_html(&form.name),
        escape_html(&form.message).replace('\n', "<br>"),
    );
    OutgoingEmail {
        to: form.email.clone(),
        reply_to: None,
        subject: "We received your message".to_string(),
        html_body,
    }
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, contact_address: String) -> Self {
        Self {
            mailer,
            contact_address,
        }
    }

    pub async fn send(&self, request: ContactRequest) -> AppResult<ContactResponse> {
        let form = parse_form(request)?;

        self.mailer
            .send(operator_notification(&form, &self.contact_address))
            .await?;
        self.mailer.send(acknowledgment(&form)).await?;

        log::info!("Contact form relayed for {}", form.email);
        Ok(ContactResponse { sent: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::test_support::FakeMailer;

    fn request() -> ContactRequest {
        ContactRequest {
            name: Some("Tom <script>".to_string()),
            email: Some("Tom@Example.com".to_string()),
            phone: None,
            subject: None,
            message: Some("Line one\nLine two".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sends_notification_and_acknowledgment() {
        let mailer = Arc::new(FakeMailer::default());
        let contact = ContactService::new(mailer.clone(), "ops@workersmate.test".to_string());

        let response = contact.send(request()).await.unwrap();
        assert!(response.sent);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ops@workersmate.test");
        assert_eq!(sent[0].reply_to.as_deref(), Some("tom@example.com"));
        assert_eq!(sent[0].subject, "Contact form: General enquiry");
        assert!(sent[0].html_body.contains("Tom &lt;script&gt;"));
        assert!(sent[0].html_body.contains("Line one<br>Line two"));
        assert_eq!(sent[1].to, "tom@example.com");
    }

    #[tokio::test]
    async fn test_rejects_missing_fields_and_bad_email() {
        let mailer = Arc::new(FakeMailer::default());
        let contact = ContactService::new(mailer.clone(), "ops@workersmate.test".to_string());

        let mut no_message = request();
        no_message.message = None;
        assert!(matches!(
            contact.send(no_message).await.unwrap_err(),
            AppError::ValidationError(_)
        ));

        let mut bad_email = request();
        bad_email.email = Some("not-an-email".to_string());
        assert!(matches!(
            contact.send(bad_email).await.unwrap_err(),
            AppError::ValidationError(_)
        ));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_smtp_failure_surfaces() {
        let mailer = Arc::new(FakeMailer {
            fail: true,
            ..Default::default()
        });
        let err = ContactService::new(mailer, "ops@workersmate.test".to_string())
            .send(request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApiError(_)));
    }
}
