//! User-facing reply texts (Telegram HTML) and their inline keyboards.

use crate::{
    actions::ButtonAction,
    bulk::BulkReport,
    formatting::{escape_html, preview},
    messaging::types::InlineKeyboard,
    usage::UserStats,
    validation::{ALIAS_MAX_LEN, ALIAS_MIN_LEN},
};

const URL_PREVIEW_CHARS: usize = 100;
const BULK_PREVIEW_CHARS: usize = 50;
const BULK_INVALID_SHOWN: usize = 5;

pub fn welcome(first_name: &str, bulk_max: usize) -> String {
    format!(
        "👋 Hello {}!\n\n\
<b>🔗 URL Shortener Bot</b>\n\n\
I can shorten your long URLs using the Cuttly service.\n\n\
<b>📝 How to use:</b>\n\
1. Send me any long URL\n\
2. I'll shorten it instantly\n\
3. Get your short link with analytics\n\n\
<b>✨ Features:</b>\n\
• Fast URL shortening\n\
• Custom alias support\n\
• Click analytics\n\
• QR code generation\n\
• Bulk URL shortening (up to {bulk_max})\n\n\
<b>⚙️ Commands:</b>\n\
/start - Show this message\n\
/help - Detailed help\n\
/stats - Your statistics\n\
/bulk - Shorten multiple URLs\n\
/custom - Set custom alias\n\
/qr - Generate QR code\n\n\
<b>📎 Just send me a URL to get started!</b>",
        escape_html(first_name)
    )
}

pub fn help(bulk_max: usize) -> String {
    format!(
        "<b>📚 Help Guide</b>\n\n\
<b>Basic Usage:</b>\n\
Just send any URL starting with http:// or https://\n\n\
<b>Advanced Features:</b>\n\
1. <b>Custom Alias</b>: <code>/custom your-alias https://example.com</code>\n\
2. <b>QR Code</b>: <code>/qr https://example.com</code>\n\
3. <b>Bulk URLs</b>: send /bulk, then URLs separated by new lines\n\
4. <b>Statistics</b>: /stats to see your usage\n\n\
<b>Examples:</b>\n\
• <code>https://www.example.com/very-long-url-path</code>\n\
• <code>/custom mysite https://example.com</code>\n\
• <code>/qr https://example.com</code>\n\n\
<b>Limitations:</b>\n\
• Must start with http:// or https://\n\
• Alias: {ALIAS_MIN_LEN}-{ALIAS_MAX_LEN} letters, numbers or hyphens\n\
• Bulk: at most {bulk_max} URLs per message\n\
• No spam or malicious URLs"
    )
}

pub fn stats(first_name: &str, stats: Option<&UserStats>) -> String {
    let name = escape_html(first_name);
    let Some(s) = stats else {
        return format!(
            "<b>📊 Your Statistics</b>\n\n\
👤 <b>User:</b> {name}\n\
🔗 <b>URLs Shortened:</b> 0\n\
📅 <b>First Used:</b> Never\n\
⏰ <b>Last Used:</b> Never\n\n\
🎯 <b>Start by shortening your first URL!</b>"
        );
    };

    let fmt_ts = |ts: Option<chrono::DateTime<chrono::Utc>>| {
        ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string())
    };

    format!(
        "<b>📊 Your Statistics</b>\n\n\
👤 <b>User:</b> {name}\n\
🔗 <b>URLs Shortened:</b> {}\n\
📅 <b>First Used:</b> {}\n\
⏰ <b>Last Used:</b> {}\n\n\
🎯 <b>Rank:</b> {}",
        s.shortened_count,
        fmt_ts(s.first_seen_at),
        fmt_ts(s.last_seen_at),
        s.rank().label()
    )
}

pub fn custom_usage() -> String {
    format!(
        "❌ <b>Usage:</b> <code>/custom your-alias https://example.com</code>\n\n\
<b>Example:</b>\n\
<code>/custom mysite https://www.mywebsite.com</code>\n\n\
<b>Rules for alias:</b>\n\
• {ALIAS_MIN_LEN}-{ALIAS_MAX_LEN} characters\n\
• Letters, numbers, hyphens only\n\
• Must be unique"
    )
}

pub fn custom_missing_arg() -> String {
    "❌ Please provide both alias and URL.\n\
Example: <code>/custom mysite https://example.com</code>"
        .to_string()
}

pub fn invalid_alias() -> String {
    format!(
        "❌ <b>Invalid alias!</b>\n\n\
<b>Valid alias must:</b>\n\
• Be {ALIAS_MIN_LEN}-{ALIAS_MAX_LEN} characters\n\
• Contain only letters, numbers, hyphens\n\
• No spaces or special characters"
    )
}

pub fn invalid_url(with_command_hints: bool) -> String {
    let mut out = "❌ <b>Invalid URL!</b>\n\n\
Please send a valid URL starting with:\n\
• <code>http://</code> or <code>https://</code>\n\
• Example: <code>https://example.com</code>"
        .to_string();
    if with_command_hints {
        out.push_str(
            "\n\nOr use commands:\n\
• <code>/custom alias url</code> - Custom alias\n\
• <code>/qr url</code> - Generate QR code\n\
• <code>/bulk</code> - Multiple URLs",
        );
    }
    out
}

pub fn shortening_progress(alias: Option<&str>) -> String {
    match alias {
        Some(a) => format!("⏳ Shortening with alias <code>{}</code>...", escape_html(a)),
        None => "⏳ Shortening your URL...".to_string(),
    }
}

pub struct Shortened<'a> {
    pub original: &'a str,
    pub short_url: &'a str,
    pub already_existed: bool,
    pub alias: Option<&'a str>,
    pub stats_url: &'a str,
}

pub fn shortened(r: &Shortened<'_>) -> String {
    let short = escape_html(r.short_url);
    let mut out = format!(
        "✅ <b>URL Shortened Successfully!</b>\n\n\
🌐 <b>Original URL:</b>\n<code>{}</code>\n\n\
🔗 <b>Short URL:</b>\n<code>{short}</code>\n\n",
        escape_html(&preview(r.original, URL_PREVIEW_CHARS)),
    );
    if r.already_existed {
        out.push_str("ℹ️ This URL was already shortened before.\n\n");
    }
    if let Some(a) = r.alias {
        out.push_str(&format!(
            "🏷️ <b>Custom Alias:</b> <code>{}</code>\n\n",
            escape_html(a)
        ));
    }
    out.push_str(&format!(
        "📊 <b>Analytics:</b> {}\n\n📋 <b>Copy:</b> <code>{short}</code>",
        escape_html(r.stats_url)
    ));
    if r.alias.is_none() {
        out.push_str("\n\n💡 <b>Tip:</b> Use /custom for a custom alias");
    }
    out
}

/// Copy / View Stats / Open URL, plus a QR action when requested.
pub fn shortened_keyboard(short_url: &str, stats_url: &str, with_qr: bool) -> InlineKeyboard {
    let kb = InlineKeyboard::default()
        .action("📋 Copy URL", &ButtonAction::Copy(short_url.to_string()))
        .link("📊 View Stats", stats_url)
        .link("🔗 Open URL", short_url);
    if with_qr {
        kb.action("📱 QR Code", &ButtonAction::ShowQr(short_url.to_string()))
    } else {
        kb
    }
}

pub fn shorten_failed(error: &str) -> String {
    format!("❌ <b>Failed to shorten URL:</b>\n{}", escape_html(error))
}

pub fn qr_usage() -> String {
    "❌ <b>Usage:</b> <code>/qr https://example.com</code>\n\n\
<b>Example:</b>\n\
<code>/qr https://www.mywebsite.com</code>\n\n\
I'll generate a QR code for your URL!"
        .to_string()
}

pub fn qr_generated(url: &str, qr_link: &str) -> String {
    format!(
        "📱 <b>QR Code Generated</b>\n\n\
🔗 <b>URL:</b>\n<code>{}</code>\n\n\
📸 <b>QR Code Image:</b> <a href=\"{}\">Click to View</a>\n\n\
<b>To use:</b>\n\
1. Scan with phone camera\n\
2. Or use QR scanner app\n\
3. Click the image to save",
        escape_html(&preview(url, URL_PREVIEW_CHARS)),
        escape_html(qr_link)
    )
}

pub fn qr_keyboard(url: &str, qr_link: &str) -> InlineKeyboard {
    InlineKeyboard::default()
        .link("📸 View QR Code", qr_link)
        .link("🔗 Open URL", url)
}

/// QR view reached from a short link's button.
pub fn qr_from_button(url: &str, qr_link: &str) -> String {
    format!(
        "📱 <b>QR Code Generated</b>\n\n\
🔗 <b>URL:</b> <code>{}</code>\n\n\
📸 <b>QR Code:</b> <a href=\"{}\">Click to View</a>\n\n\
<b>To use:</b>\n\
1. Scan with phone camera\n\
2. Save the image\n\
3. Share with others",
        escape_html(url),
        escape_html(qr_link)
    )
}

pub fn copied(url: &str) -> String {
    format!(
        "📋 <b>Ready to copy</b>\n\n<code>{}</code>\n\n<i>Tap the link above to copy it.</i>",
        escape_html(url)
    )
}

pub fn bulk_instructions(max: usize) -> String {
    format!(
        "📦 <b>Bulk URL Shortener</b>\n\n\
Send me multiple URLs (one per line):\n\n\
<b>Example:</b>\n\
<pre>https://example.com/page1\n\
https://example.com/page2\n\
https://example.com/page3</pre>\n\n\
I'll shorten all of them and send back the results!\n\n\
<b>Note:</b> Maximum {max} URLs at once."
    )
}

pub fn bulk_too_many(max: usize) -> String {
    format!("❌ Maximum {max} URLs allowed. Please send fewer URLs.")
}

pub fn bulk_no_valid() -> String {
    "❌ No valid URLs found. Please check your URLs and try again.".to_string()
}

pub fn bulk_progress(count: usize) -> String {
    format!("⏳ Processing {count} URLs...")
}

pub fn bulk_report(r: &BulkReport) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !r.succeeded.is_empty() {
        parts.push(format!(
            "✅ <b>Successfully shortened {} URLs:</b>\n",
            r.succeeded.len()
        ));
        for (_, short) in &r.succeeded {
            parts.push(format!("• <code>{}</code>", escape_html(short)));
        }
    }

    if !r.failed.is_empty() {
        parts.push(format!("\n❌ <b>Failed to shorten {} URLs:</b>", r.failed.len()));
        for (original, reason) in &r.failed {
            parts.push(format!(
                "• {} → {}",
                escape_html(&preview(original, BULK_PREVIEW_CHARS)),
                escape_html(reason)
            ));
        }
    }

    if !r.rejected.is_empty() {
        parts.push(format!("\n⚠️ <b>Invalid URLs ({}):</b>", r.rejected.len()));
        for line in r.rejected.iter().take(BULK_INVALID_SHOWN) {
            parts.push(format!(
                "• <code>{}</code>",
                escape_html(&preview(line, BULK_PREVIEW_CHARS))
            ));
        }
        if r.rejected.len() > BULK_INVALID_SHOWN {
            parts.push(format!("• ... and {} more", r.rejected.len() - BULK_INVALID_SHOWN));
        }
    }

    parts.join("\n")
}

pub fn unknown_command() -> String {
    "🤔 Unknown command. Send /help to see what I can do.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::ButtonTarget;

    #[test]
    fn stats_for_unknown_user() {
        let s = stats("Ann", None);
        assert!(s.contains("URLs Shortened:</b> 0"));
        assert!(s.contains("Never"));
    }

    #[test]
    fn stats_for_known_user_shows_rank() {
        let now = chrono::Utc::now();
        let s = stats(
            "<Ann>",
            Some(&UserStats {
                shortened_count: 7,
                first_seen_at: Some(now),
                last_seen_at: Some(now),
            }),
        );
        assert!(s.contains("&lt;Ann&gt;"));
        assert!(s.contains("URLs Shortened:</b> 7"));
        assert!(s.contains("Rank:</b> Regular"));
        assert!(!s.contains("Never"));
    }

    #[test]
    fn shortened_reply_mentions_alias_and_stats() {
        let text = shortened(&Shortened {
            original: "https://example.com/a?b=1&c=2",
            short_url: "https://cutt.ly/mysite",
            already_existed: false,
            alias: Some("mysite"),
            stats_url: "https://cutt.ly/mysite/stats",
        });
        assert!(text.contains("https://example.com/a?b=1&amp;c=2"));
        assert!(text.contains("<code>mysite</code>"));
        assert!(text.contains("https://cutt.ly/mysite/stats"));
        assert!(!text.contains("Tip:"));
    }

    #[test]
    fn shortened_keyboard_layout() {
        let kb = shortened_keyboard("https://cutt.ly/x", "https://cutt.ly/x/stats", true);
        let labels: Vec<&str> = kb.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["📋 Copy URL", "📊 View Stats", "🔗 Open URL", "📱 QR Code"]
        );
        assert_eq!(
            kb.buttons[3].target,
            ButtonTarget::Callback(r#"{"show_qr":"https://cutt.ly/x"}"#.to_string())
        );

        let kb = shortened_keyboard("https://cutt.ly/x", "https://cutt.ly/x/stats", false);
        assert_eq!(kb.buttons.len(), 3);
    }

    #[test]
    fn bulk_report_sections() {
        let r = BulkReport {
            succeeded: vec![("https://a.com".into(), "https://cutt.ly/a".into())],
            failed: vec![("https://b.com".into(), "Cuttly Error: Invalid URL".into())],
            rejected: (0..7).map(|i| format!("junk{i}")).collect(),
        };
        let text = bulk_report(&r);
        assert!(text.contains("Successfully shortened 1 URLs"));
        assert!(text.contains("<code>https://cutt.ly/a</code>"));
        assert!(text.contains("https://b.com → Cuttly Error: Invalid URL"));
        assert!(text.contains("Invalid URLs (7)"));
        assert!(text.contains("junk4"));
        assert!(!text.contains("junk5"));
        assert!(text.contains("... and 2 more"));
    }
}
