use async_trait::async_trait;
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::models::PostStatus;

/// Notifier
///
/// Outbound email for moderation decisions and contact-form relays. Every
/// send is best-effort: the boolean result is reported to the client as an
/// informational field and never fails the operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_decision(
        &self,
        email: &str,
        decision: PostStatus,
        post_title: &str,
        feedback: Option<&str>,
    ) -> bool;

    async fn send_contact_form(&self, to: &str, name: &str, from_email: &str, message: &str)
    -> bool;
}

/// NotifierState
///
/// The shared handle handlers pull from the application state.
pub type NotifierState = Arc<dyn Notifier>;

fn decision_subject(decision: PostStatus) -> String {
    let word = match decision {
        PostStatus::Approved => "Approved",
        PostStatus::Denied => "Denied",
        PostStatus::Pending => "Received",
    };
    format!("Your Story Archive Submission Was {word}")
}

fn decision_body(decision: PostStatus, post_title: &str, feedback: Option<&str>) -> String {
    match decision {
        PostStatus::Approved => format!(
            r#"<html><body>
<h2>Congratulations!</h2>
<p>Your submission has been <strong>approved</strong>.</p>
<p>Your post titled "<strong>{post_title}</strong>" is now visible on the site.</p>
<p>Thank you for contributing to our community!</p>
</body></html>"#
        ),
        _ => {
            let feedback_html = feedback
                .map(|f| {
                    format!(
                        r#"<div style="margin: 20px 0; padding: 15px; border-left: 4px solid #d9534f;">
<h3 style="margin-top: 0;">Feedback from our team:</h3>
<p style="white-space: pre-line;">{f}</p>
</div>"#
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<html><body>
<h2>Notice Regarding Your Submission</h2>
<p>We've reviewed your submission.</p>
<p>Unfortunately, your post titled "<strong>{post_title}</strong>" has not been approved at this time.</p>
{feedback_html}
<p>Common reasons for declined submissions include:</p>
<ul>
<li>Content not aligned with our community guidelines</li>
<li>Insufficient information or details</li>
<li>Quality concerns</li>
</ul>
<p>You're welcome to submit again with revised content.</p>
</body></html>"#
            )
        }
    }
}

fn contact_body(name: &str, from_email: &str, message: &str) -> String {
    format!(
        r#"<html><body>
<h2>New Contact Form Message</h2>
<p><strong>From:</strong> {name}</p>
<p><strong>Email:</strong> <a href="mailto:{from_email}">{from_email}</a></p>
<div style="margin: 20px 0; padding: 15px; border-left: 4px solid #4a90e2;">
<h3 style="margin-top: 0;">Message:</h3>
<p style="white-space: pre-line;">{message}</p>
</div>
<p>This message was submitted through the website contact form.</p>
</body></html>"#
    )
}

/// SmtpNotifier
///
/// Lettre-backed implementation over an async STARTTLS relay. When no SMTP
/// host is configured the notifier runs in no-op mode: every send logs a
/// warning and reports `false`.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Option<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: &AppConfig) -> Self {
        let from = match config.smtp_from.parse::<Mailbox>() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                tracing::warn!("invalid EMAIL_FROM address, notifier disabled: {}", e);
                None
            }
        };

        let transport = match &config.smtp_host {
            None => {
                tracing::warn!("SMTP host not configured; notifier will operate in no-op mode");
                None
            }
            Some(host) => match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(builder) => {
                    let builder = builder.port(config.smtp_port).credentials(Credentials::new(
                        config.smtp_user.clone(),
                        config.smtp_pass.clone(),
                    ));
                    Some(Arc::new(builder.build()))
                }
                Err(e) => {
                    tracing::warn!("failed to configure SMTP transport: {}", e);
                    None
                }
            },
        };

        Self { transport, from }
    }

    async fn send_html(&self, to: &str, subject: &str, html: String, reply_to: Option<&str>) -> bool {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::warn!("email not sent (no transport configured): {}", subject);
            return false;
        };

        let recipient = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::warn!("invalid recipient address {:?}: {}", to, e);
                return false;
            }
        };

        let mut builder = Message::builder()
            .from(from.clone())
            .to(recipient)
            .subject(subject)
            .header(header::ContentType::TEXT_HTML);

        if let Some(reply_to) = reply_to.and_then(|r| r.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }

        let message = match builder.body(html) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("failed to build email: {}", e);
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("email send failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_decision(
        &self,
        email: &str,
        decision: PostStatus,
        post_title: &str,
        feedback: Option<&str>,
    ) -> bool {
        let subject = decision_subject(decision);
        let body = decision_body(decision, post_title, feedback);
        self.send_html(email, &subject, body, None).await
    }

    async fn send_contact_form(
        &self,
        to: &str,
        name: &str,
        from_email: &str,
        message: &str,
    ) -> bool {
        let subject = format!("Contact Form: Message from {name}");
        let body = contact_body(name, from_email, message);
        // Reply-To points at the sender so staff can answer directly.
        self.send_html(to, &subject, body, Some(from_email)).await
    }
}

/// SentEmail
///
/// Record of one mock delivery, inspectable by tests.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// MockNotifier
///
/// Records every send instead of talking to SMTP. `should_fail` simulates an
/// upstream outage so tests can assert the best-effort semantics.
#[derive(Default)]
pub struct MockNotifier {
    pub should_fail: bool,
    pub sent: Mutex<Vec<SentEmail>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything delivered so far.
    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_decision(
        &self,
        email: &str,
        decision: PostStatus,
        post_title: &str,
        feedback: Option<&str>,
    ) -> bool {
        if self.should_fail {
            return false;
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: email.to_string(),
            subject: decision_subject(decision),
            body: decision_body(decision, post_title, feedback),
        });
        true
    }

    async fn send_contact_form(
        &self,
        to: &str,
        name: &str,
        from_email: &str,
        message: &str,
    ) -> bool {
        if self.should_fail {
            return false;
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: format!("Contact Form: Message from {name}"),
            body: contact_body(name, from_email, message),
        });
        true
    }
}
