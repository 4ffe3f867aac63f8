use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::cart::CartLine;
use crate::config::AppConfig;
use crate::models::{Customer, Order};

/// Thousands separated with spaces, the way the shop prints FCFA amounts.
pub fn format_price(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Outbound SMTP transport. When SMTP settings are absent the mailer runs
/// disabled: every send logs a warning and reports failure, and checkout
/// carries on regardless.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<String>,
    admin_email: Option<String>,
    app_url: String,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> Self {
        let transport = match (
            config.smtp_host.as_deref(),
            config.smtp_user.as_deref(),
            config.smtp_password.as_deref(),
        ) {
            (Some(host), Some(user), Some(password)) => {
                match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                    Ok(builder) => Some(
                        builder
                            .port(config.smtp_port)
                            .credentials(Credentials::new(user.to_string(), password.to_string()))
                            .build(),
                    ),
                    Err(err) => {
                        tracing::warn!(error = %err, host, "invalid SMTP relay, mail disabled");
                        None
                    }
                }
            }
            _ => {
                tracing::info!("SMTP not configured, mail disabled");
                None
            }
        };

        Self {
            transport,
            from: config.mail_from.clone(),
            admin_email: config.admin_email.clone(),
            app_url: config.app_url.clone(),
        }
    }

    /// Disabled mailer for tests and offline runs.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
            admin_email: None,
            app_url: "http://localhost:3000".to_string(),
        }
    }

    /// Sends one HTML mail. Returns whether the transport acknowledged it;
    /// never propagates an error to the caller.
    pub async fn send(&self, to: &str, subject: &str, html: String) -> bool {
        let (Some(transport), Some(from)) = (self.transport.as_ref(), self.from.as_deref()) else {
            tracing::warn!(to, subject, "mail skipped: SMTP not configured");
            return false;
        };

        let sender = match from.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!(error = %err, "mail skipped: invalid sender address");
                return false;
            }
        };
        let recipient = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                tracing::warn!(error = %err, "mail skipped: invalid recipient address");
                return false;
            }
        };
        let message = match Message::builder()
            .from(sender)
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
        {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "mail skipped: invalid message");
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                tracing::info!(to, subject, "mail sent");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, to, "mail send failed");
                false
            }
        }
    }

    pub async fn send_order_confirmation(
        &self,
        order: &Order,
        customer: &Customer,
        lines: &[CartLine],
    ) -> bool {
        let subject = format!("Votre commande #{} - Sensations by Arda J", short_id(order));
        let html = confirmation_body(order, customer, lines);
        self.send(&customer.email, &subject, html).await
    }

    pub async fn send_admin_alert(
        &self,
        order: &Order,
        customer: &Customer,
        lines: &[CartLine],
    ) -> bool {
        let Some(admin_email) = self.admin_email.as_deref() else {
            tracing::warn!("admin alert skipped: ADMIN_EMAIL not configured");
            return false;
        };
        let subject = format!(
            "Nouvelle commande #{} - {}",
            short_id(order),
            customer.full_name()
        );
        let html = admin_alert_body(order, customer, lines, &self.app_url);
        self.send(admin_email, &subject, html).await
    }
}

fn short_id(order: &Order) -> String {
    order.id.to_string().chars().take(8).collect()
}

fn line_rows(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "<li><strong>{}</strong> — {} × {} FCFA = <strong>{} FCFA</strong></li>",
                line.name,
                line.quantity,
                format_price(line.price),
                format_price(line.price * i64::from(line.quantity)),
            )
        })
        .collect()
}

fn confirmation_body(order: &Order, customer: &Customer, lines: &[CartLine]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h1>Merci pour votre commande, {first_name} !</h1>
  <p>Nous avons bien reçu votre commande <strong>#{id}</strong> du {date}.</p>
  <ul>{rows}</ul>
  <p style="font-size: 20px;"><strong>TOTAL : {total} FCFA</strong></p>
  <p>Nous vous contacterons au {phone} pour organiser la livraison à :<br>{address}</p>
  <p>Sensations by Arda J — Parfums &amp; Essences</p>
</body>
</html>"#,
        first_name = customer.first_name,
        id = short_id(order),
        date = order.created_at.format("%d/%m/%Y à %H:%M"),
        rows = line_rows(lines),
        total = format_price(order.total),
        phone = customer.phone,
        address = customer.address,
    )
}

fn admin_alert_body(
    order: &Order,
    customer: &Customer,
    lines: &[CartLine],
    app_url: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h1>Nouvelle commande reçue</h1>
  <p><strong>Commande #{id}</strong> — {date} — statut : en cours</p>
  <h3>Client</h3>
  <p>{name}<br>{email}<br>{phone}<br>{address}</p>
  <h3>Articles</h3>
  <ul>{rows}</ul>
  <p style="font-size: 20px;"><strong>TOTAL : {total} FCFA</strong></p>
  <p><a href="{app_url}">Ouvrir le dashboard admin</a></p>
</body>
</html>"#,
        id = short_id(order),
        date = order.created_at.format("%d/%m/%Y à %H:%M"),
        name = customer.full_name(),
        email = customer.email,
        phone = customer.phone,
        address = customer.address,
        rows = line_rows(lines),
        total = format_price(order.total),
        app_url = app_url,
    )
}
