use reqwest::Client;

use crate::config::Config;
use crate::entities::booking::{self, BookingStatus};
use crate::error::{AppError, AppResult};

/// Sends customer and operator notifications through a Mailgun-style HTTP
/// API. Constructed only when mail settings are present; callers treat a
/// `None` mailer as "delivery disabled".
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
    admin_address: String,
    contact_phone: String,
    contact_email: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Option<Self> {
        config.mail.as_ref().map(|mail| Self {
            client: Client::new(),
            api_url: mail.api_url.clone(),
            api_key: mail.api_key.clone(),
            from_address: mail.from_address.clone(),
            admin_address: mail.admin_address.clone(),
            contact_phone: config.contact_phone.clone(),
            contact_email: config.contact_email.clone(),
        })
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let response = self
            .client
            .post(&self.api_url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from_address.as_str()),
                ("to", to),
                ("subject", subject),
                ("text", body),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Mail provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Mail provider returned {}",
                response.status()
            )));
        }

        tracing::info!(to, subject, "Notification email sent");
        Ok(())
    }

    /// Initial acknowledgement sent to the customer right after booking.
    pub async fn send_booking_received(&self, b: &booking::Model) -> AppResult<()> {
        let subject = format!("Booking Confirmation - {}", b.destination);
        let body = booking_received_body(b);
        self.deliver(&b.customer_email, &subject, &body).await
    }

    /// Heads-up to the operator about a new booking request.
    pub async fn send_admin_alert(&self, b: &booking::Model) -> AppResult<()> {
        let subject = format!("New Booking Request - {}", b.destination);
        let body = admin_alert_body(b);
        self.deliver(&self.admin_address, &subject, &body).await
    }

    pub async fn send_status_update(&self, b: &booking::Model) -> AppResult<()> {
        let subject = format!("Booking Update - {}", b.destination);
        let body = status_update_body(b, &self.contact_phone, &self.contact_email);
        self.deliver(&b.customer_email, &subject, &body).await
    }

    pub async fn send_date_time_update(&self, b: &booking::Model) -> AppResult<()> {
        let subject = format!("Tour Schedule Update - {}", b.destination);
        let body = date_time_update_body(b, &self.contact_phone, &self.contact_email);
        self.deliver(&b.customer_email, &subject, &body).await
    }
}

/// First 8 characters of the UUID, the short reference customers see.
fn short_id(b: &booking::Model) -> String {
    b.id.to_string().chars().take(8).collect()
}

fn status_line(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "Your booking has been confirmed!",
        BookingStatus::Cancelled => "Your booking has been cancelled",
        BookingStatus::Completed => "Thank you for your tour with us!",
        BookingStatus::Pending => "Your booking status has been updated",
    }
}

fn booking_received_body(b: &booking::Model) -> String {
    let preferred = b
        .preferred_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Flexible".to_string());
    let requests = if b.special_requests.is_empty() {
        "None"
    } else {
        &b.special_requests
    };

    format!(
        "Dear {},\n\n\
         Thank you for your booking request. We have received the following details:\n\n\
         Destination: {}\n\
         Group Size: {}\n\
         Preferred Date: {}\n\
         Special Requests: {}\n\
         Booking Reference: {}\n\n\
         We will get back to you shortly to confirm your tour.\n",
        b.customer_name,
        b.destination,
        b.group_size,
        preferred,
        requests,
        short_id(b),
    )
}

fn admin_alert_body(b: &booking::Model) -> String {
    let phone = b.customer_phone.as_deref().unwrap_or("Not provided");
    let preferred = b
        .preferred_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Flexible".to_string());
    let requests = if b.special_requests.is_empty() {
        "None"
    } else {
        &b.special_requests
    };

    format!(
        "New booking request received:\n\n\
         Customer: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Destination: {}\n\
         Group Size: {}\n\
         Preferred Date: {}\n\
         Special Requests: {}\n\
         Booking ID: {}\n\n\
         Please log into the admin dashboard to manage this booking.\n",
        b.customer_name,
        b.customer_email,
        phone,
        b.destination,
        b.group_size,
        preferred,
        requests,
        short_id(b),
    )
}

fn schedule_block(b: &booking::Model) -> String {
    let mut lines = String::new();
    if let Some(date) = b.confirmed_date {
        lines.push_str(&format!("Confirmed Date: {}\n", date));
    }
    if let Some(time) = b.confirmed_time {
        lines.push_str(&format!("Start Time: {}\n", time.format("%H:%M")));
    }
    lines.push_str(&format!("Duration: {} day(s)\n", b.duration_days));
    if let Some(amount) = b.amount {
        lines.push_str(&format!("Amount: KES {:.2}\n", amount));
    }
    lines
}

fn contact_block(phone: &str, email: &str) -> String {
    format!(
        "Questions? Reach us on {} or {}.\n",
        if phone.is_empty() { "our phone line" } else { phone },
        if email.is_empty() { "our email" } else { email },
    )
}

fn status_update_body(b: &booking::Model, phone: &str, email: &str) -> String {
    let message = if b.admin_message.is_empty() {
        String::new()
    } else {
        format!("\nMessage from us: {}\n", b.admin_message)
    };

    format!(
        "Dear {},\n\n\
         {}\n\n\
         Destination: {}\n\
         {}{}\n\
         Booking Reference: {}\n\n\
         {}",
        b.customer_name,
        status_line(b.status),
        b.destination,
        schedule_block(b),
        message,
        short_id(b),
        contact_block(phone, email),
    )
}

fn date_time_update_body(b: &booking::Model, phone: &str, email: &str) -> String {
    let previous = match (b.previous_confirmed_date, b.previous_confirmed_time) {
        (Some(date), Some(time)) => format!("Previous schedule: {} at {}\n", date, time.format("%H:%M")),
        (Some(date), None) => format!("Previous schedule: {}\n", date),
        _ => String::new(),
    };
    let message = if b.admin_message.is_empty() {
        String::new()
    } else {
        format!("\nMessage from us: {}\n", b.admin_message)
    };

    format!(
        "Dear {},\n\n\
         The schedule for your {} tour has been updated.\n\n\
         {}{}{}\n\
         Booking Reference: {}\n\n\
         {}",
        b.customer_name,
        b.destination,
        previous,
        schedule_block(b),
        message,
        short_id(b),
        contact_block(phone, email),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use uuid::Uuid;

    use super::*;

    fn booking() -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            customer_name: "Jane Doe".to_string(),
            customer_email: "jane@x.com".to_string(),
            customer_phone: None,
            destination: "Maasai Mara".to_string(),
            group_size: 2,
            preferred_date: None,
            confirmed_date: Some(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()),
            confirmed_time: Some(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
            previous_confirmed_date: Some(NaiveDate::from_ymd_opt(2025, 8, 25).unwrap()),
            previous_confirmed_time: None,
            duration_days: 3,
            amount: Some(45000.0),
            special_requests: String::new(),
            notes: String::new(),
            admin_message: "See you at the gate".to_string(),
            status: BookingStatus::Confirmed,
            customer_notified: false,
            last_notification_sent: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_booking_received_defaults() {
        let body = booking_received_body(&booking());
        assert!(body.contains("Dear Jane Doe"));
        assert!(body.contains("Preferred Date: Flexible"));
        assert!(body.contains("Special Requests: None"));
    }

    #[test]
    fn test_admin_alert_missing_phone() {
        let body = admin_alert_body(&booking());
        assert!(body.contains("Phone: Not provided"));
        assert!(body.contains("Destination: Maasai Mara"));
    }

    #[test]
    fn test_status_update_includes_schedule_and_message() {
        let body = status_update_body(&booking(), "0700000000", "tours@example.com");
        assert!(body.contains("Your booking has been confirmed!"));
        assert!(body.contains("Confirmed Date: 2025-09-01"));
        assert!(body.contains("Start Time: 08:30"));
        assert!(body.contains("Amount: KES 45000.00"));
        assert!(body.contains("Message from us: See you at the gate"));
        assert!(body.contains("0700000000"));
    }

    #[test]
    fn test_date_time_update_mentions_previous_schedule() {
        let body = date_time_update_body(&booking(), "", "");
        assert!(body.contains("Previous schedule: 2025-08-25"));
        assert!(body.contains("Confirmed Date: 2025-09-01"));
    }

    #[test]
    fn test_short_id_is_eight_chars() {
        assert_eq!(short_id(&booking()).len(), 8);
    }
}
