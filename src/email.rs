use anyhow::Context;
use axum::async_trait;
use serde::Serialize;

use crate::config::MailConfig;

/// Outbound email capability. Awaited within the request; failures surface
/// to the caller.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
}

/// Transactional-email API client (Brevo-style JSON endpoint).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl HttpMailer {
    pub fn new(cfg: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            sender_email: cfg.sender_email.clone(),
            sender_name: cfg.sender_name.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.sender_email.clone(),
                name: Some(self.sender_name.clone()),
            },
            to: vec![EmailAddress {
                email: to.to_string(),
                name: None,
            }],
            subject: subject.to_string(),
            html_content: html.to_string(),
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("mail api request")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("mail send failed (status={status}): {detail}");
        }
        Ok(())
    }
}

fn otp_template(heading: &str, intro: &str, otp: &str, footer: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h2 style="color: #2563eb;">{heading}</h2>
  <p>{intro}</p>
  <div style="background-color: #f3f4f6; padding: 15px; text-align: center; margin: 20px 0; font-size: 24px; font-weight: bold; letter-spacing: 2px; color: #1f2937;">
    {otp}
  </div>
  <p>This OTP will expire in 10 minutes.</p>
  <p>{footer}</p>
  <hr style="border: none; border-top: 1px solid #e5e7eb; margin: 20px 0;">
  <p style="font-size: 12px; color: #6b7280;">This is an automated message, please do not reply.</p>
</div>"#
    )
}

/// Subject and body for the email-verification code.
pub fn verification_email(otp: &str) -> (String, String) {
    (
        "Verify Your Email - CATerview".to_string(),
        otp_template(
            "Email Verification",
            "Thank you for registering with CATerview. Please use the following OTP to verify your email address:",
            otp,
            "If you didn't request this, please ignore this email.",
        ),
    )
}

/// Subject and body for the password-reset code.
pub fn reset_email(otp: &str) -> (String, String) {
    (
        "Password Reset OTP - CATerview".to_string(),
        otp_template(
            "Password Reset Request",
            "You have requested to reset your password. Use the following OTP to proceed:",
            otp,
            "If you didn't request this, please ignore this email and your password will remain unchanged.",
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_template_embeds_code_and_validity() {
        let (subject, html) = verification_email("123456");
        assert!(subject.contains("Verify"));
        assert!(html.contains("123456"));
        assert!(html.contains("expire in 10 minutes"));
    }

    #[test]
    fn reset_template_embeds_code_and_validity() {
        let (subject, html) = reset_email("654321");
        assert!(subject.contains("Password Reset"));
        assert!(html.contains("654321"));
        assert!(html.contains("expire in 10 minutes"));
    }

    #[test]
    fn templates_differ_by_purpose() {
        let (_, verify) = verification_email("111111");
        let (_, reset) = reset_email("111111");
        assert!(verify.contains("verify your email address"));
        assert!(reset.contains("reset your password"));
    }
}
