//! 邮件模板
//!
//! 确认邮件与群发邮件共用同一套页眉和页脚

use crate::business::domain::Donation;
use crate::shared::utils::{escape_html, format_pickup_date, format_time_slot};

const HEADER: &str = r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: auto; padding: 20px; border: 1px solid #ddd;">
  <header style="text-align: center; padding: 10px 0; border-bottom: 1px solid #ddd;">
    <img src="https://i.imgur.com/EZEiPz2.jpeg" alt="Swara Foundation Logo" style="max-height: 50px;">
    <h1 style="margin: 10px 0; color: #333;">Swara Foundation</h1>
  </header>"#;

const SOCIAL_LINKS: &str = r#"    <a href="https://www.facebook.com/profile.php?id=100068099547129" style="margin: 0 10px;">
      <img src="https://img.icons8.com/color/48/000000/facebook.png" alt="Facebook" style="max-height: 30px;">
    </a>
    <a href="https://www.instagram.com/swarafoundation" style="margin: 0 10px;">
      <img src="https://img.icons8.com/color/48/000000/instagram-new.png" alt="Instagram" style="max-height: 30px;">
    </a>
    <a href="https://www.linkedin.com/company/swara-foundation" style="margin: 0 10px;">
      <img src="https://img.icons8.com/color/48/000000/linkedin.png" alt="LinkedIn" style="max-height: 30px;">
    </a>"#;

fn footer(caption: &str) -> String {
    format!(
        r#"  <footer style="text-align: center; padding: 10px 0; border-top: 1px solid #ddd;">
    <p style="margin: 10px 0;">{caption}</p>
{SOCIAL_LINKS}
  </footer>
</div>"#
    )
}

/// 渲染预约确认邮件
pub fn render_confirmation(donation: &Donation) -> String {
    let salutation = escape_html(&format!("{} {}", donation.title, donation.donor_name()));
    let date = escape_html(&format_pickup_date(donation.date.as_deref().unwrap_or_default()));
    let slot = escape_html(&format_time_slot(donation.time_slot.as_deref().unwrap_or_default()));

    format!(
        r#"{HEADER}
  <section style="padding: 20px 0;">
    <p>Dear {salutation},</p>
    <p>Thank you for reaching out to Swara Foundation and placing your trust in us. Your generosity is a beacon of hope for the children we support.</p>
    <p>We have successfully scheduled your donation for <b>{date}</b>, during the time slot <b>{slot}</b>. Your commitment to our cause is truly inspiring.</p>
    <p>We are excited to connect with you on the chosen date and look forward to the positive impact your support will bring. Thank you for being an integral part of our journey and for making a difference in the lives of those who need it most.</p>
    <p>With heartfelt gratitude,</p>
    <p>The Swara Foundation Team</p>
  </section>
{footer}"#,
        footer = footer("Stay connected with us:"),
    )
}

/// 渲染群发通知邮件
///
/// 消息由管理员撰写，允许携带 HTML 格式，原样插入；换行转换为 `<br>`
pub fn render_broadcast(message: &str) -> String {
    let body = message.replace('\n', "<br>");
    format!(
        r#"{HEADER}
  <section style="padding: 20px 0;">
    <p style="font-size: 16px; line-height: 1.6;">{body}</p>
  </section>
{footer}"#,
        footer = footer("Follow us on:"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{NewDonation, Title};

    #[test]
    fn test_confirmation_contains_formatted_slot() {
        let mut submission = NewDonation::new(Title::Mrs);
        submission.first_name = Some("Asha".to_string());
        submission.last_name = Some("Rao".to_string());
        submission.date = Some("2024-05-01".to_string());
        submission.time_slot = Some("9-11".to_string());
        let donation =
            Donation::from_submission(uuid::Uuid::new_v4(), submission, chrono::Utc::now());

        let html = render_confirmation(&donation);
        assert!(html.contains("Dear Mrs Asha Rao,"));
        assert!(html.contains("<b>01-05-2024</b>"));
        assert!(html.contains("<b>9 AM - 11 AM</b>"));
        assert!(html.contains("Stay connected with us:"));
    }

    #[test]
    fn test_broadcast_keeps_admin_markup() {
        let html = render_broadcast("Drive on <b>Sunday</b>\nSee you!");
        assert!(html.contains("Drive on <b>Sunday</b><br>See you!"));
        assert!(html.contains("Follow us on:"));
    }
}
