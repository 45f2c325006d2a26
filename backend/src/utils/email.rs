use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

pub struct EmailService {
    mailer: SmtpTransport,
    from_address: String,
}

impl EmailService {
    pub fn new() -> Result<Self> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address = env::var("SMTP_FROM_ADDRESS")
            .unwrap_or_else(|_| "noreply@bondcrm.local".to_string());

        let mailer = if smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .build()
        } else {
            let creds = Credentials::new(smtp_username, smtp_password);
            SmtpTransport::relay(&smtp_host)?
                .port(smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }

    /// Sends the login verification code. Delivery is best-effort: the OTP
    /// flow must remain testable without a live SMTP relay, so failures are
    /// logged (with the code, for local runs) instead of surfaced.
    pub fn send_otp(&self, to_email: &str, otp: &str) {
        if env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true" {
            return;
        }

        let result = self.build_otp_message(to_email, otp).and_then(|email| {
            self.mailer.send(&email)?;
            Ok(())
        });

        match result {
            Ok(()) => tracing::info!(email = %to_email, "OTP email sent"),
            Err(err) => {
                tracing::warn!(email = %to_email, error = ?err, "Failed to send OTP email");
                tracing::info!(email = %to_email, otp = %otp, "TEST MODE - OTP code");
            }
        }
    }

    fn build_otp_message(&self, to_email: &str, otp: &str) -> Result<Message> {
        let body = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: #1e40af; padding: 20px; text-align: center;">
    <h1 style="color: white; margin: 0;">BondCRM</h1>
  </div>
  <div style="padding: 30px; background: white;">
    <h2 style="color: #1e40af;">Login Verification Code</h2>
    <p style="color: #64748b;">Please use the following verification code to complete your login:</p>
    <div style="background: #f8fafc; border: 2px solid #e2e8f0; padding: 20px; text-align: center; border-radius: 8px;">
      <h1 style="color: #1e40af; font-size: 36px; letter-spacing: 8px; margin: 0;">{otp}</h1>
    </div>
    <p style="color: #64748b; font-size: 14px;">
      This code will expire in 10 minutes. If you didn't request this code, please ignore this email.
    </p>
  </div>
</div>"#
        );

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("BondCRM - Your Login OTP")
            .header(ContentType::TEXT_HTML)
            .body(body)?;
        Ok(email)
    }

    pub fn send_welcome_email(&self, to_email: &str, name: &str) {
        if env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true" {
            return;
        }

        let body = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: #1e40af; padding: 20px; text-align: center;">
    <h1 style="color: white; margin: 0;">Welcome to BondCRM</h1>
  </div>
  <div style="padding: 30px; background: white;">
    <h2 style="color: #1e40af;">Hello {name}!</h2>
    <p style="color: #64748b;">
      Your account has been created. You can now log in with your email address
      using a one-time passcode.
    </p>
  </div>
</div>"#
        );

        let result = Message::builder()
            .from(match self.from_address.parse() {
                Ok(from) => from,
                Err(err) => {
                    tracing::warn!(error = ?err, "Invalid SMTP from address");
                    return;
                }
            })
            .to(match to_email.parse() {
                Ok(to) => to,
                Err(err) => {
                    tracing::warn!(email = %to_email, error = ?err, "Invalid recipient address");
                    return;
                }
            })
            .subject("Welcome to BondCRM")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(anyhow::Error::from)
            .and_then(|email| {
                self.mailer.send(&email)?;
                Ok(())
            });

        if let Err(err) = result {
            tracing::warn!(email = %to_email, error = ?err, "Failed to send welcome email");
        }
    }
}
