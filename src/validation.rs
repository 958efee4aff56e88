// src/validation.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::models::{NewAppointment, SubmitAppointmentRequest};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 254;
const PHONE_MIN_DIGITS: usize = 10;
const MESSAGE_MAX_CHARS: usize = 1000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

const SANITIZE_MAX_PASSES: usize = 8;

/// Strips every tag (and the body of `script` / `style`) from untrusted
/// text. The result is plain text: entities added by the sanitizer's
/// serializer are decoded again, so use [`escape_html`] before putting it
/// into markup.
///
/// Decoding can surface markup that arrived entity-encoded, so cleaning
/// repeats until a pass leaves the text unchanged. A fixed point contains
/// no tags.
pub fn sanitize_text(input: &str) -> String {
    let cleaner = {
        let mut b = ammonia::Builder::empty();
        b.clean_content_tags(HashSet::from(["script", "style"]));
        b
    };

    let mut current = input.trim().to_string();
    for _ in 0..SANITIZE_MAX_PASSES {
        let next = decode_serializer_entities(&cleaner.clean(&current).to_string());
        if next == current {
            return next;
        }
        current = next;
    }

    // Entity nesting deeper than the pass budget.
    current.replace(['<', '>'], "")
}

fn decode_serializer_entities(s: &str) -> String {
    s.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn phone_digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Parses `YYYY-MM-DD`; `None` if malformed.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn trimmed(v: &Option<String>) -> String {
    v.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Trims and sanitizes a raw booking, then checks every field. All
/// failures are collected; `today` is the earliest acceptable date.
pub fn validate_submission(
    raw: &SubmitAppointmentRequest,
    today: NaiveDate,
) -> Result<NewAppointment, Vec<FieldError>> {
    let full_name = sanitize_text(&trimmed(&raw.full_name));
    let email = sanitize_text(&trimmed(&raw.email));
    let phone = sanitize_text(&trimmed(&raw.phone));
    let preferred_date = trimmed(&raw.preferred_date);
    let preferred_time = trimmed(&raw.preferred_time);
    let message = sanitize_text(&trimmed(&raw.message));

    let mut errors = Vec::new();

    let name_len = full_name.chars().count();
    if name_len == 0 {
        errors.push(FieldError::new("fullName", "Full name is required"));
    } else if name_len < NAME_MIN_CHARS {
        errors.push(FieldError::new("fullName", "Name must be at least 2 characters"));
    } else if name_len > NAME_MAX_CHARS {
        errors.push(FieldError::new("fullName", "Name must be at most 100 characters"));
    }

    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    } else if email.chars().count() > EMAIL_MAX_CHARS {
        errors.push(FieldError::new("email", "Email is too long"));
    }

    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if phone_digit_count(&phone) < PHONE_MIN_DIGITS {
        errors.push(FieldError::new("phone", "Phone must be at least 10 digits"));
    }

    // Stored in canonical form so slot lookups compare like with like.
    let mut preferred_date = preferred_date;
    if preferred_date.is_empty() {
        errors.push(FieldError::new("preferredDate", "Preferred date is required"));
    } else {
        match parse_date(&preferred_date) {
            None => errors.push(FieldError::new("preferredDate", "Date must be YYYY-MM-DD")),
            Some(d) if d < today => {
                errors.push(FieldError::new("preferredDate", "Please select a future date"))
            }
            Some(d) => preferred_date = format_date(d),
        }
    }

    if preferred_time.is_empty() {
        errors.push(FieldError::new("preferredTime", "Preferred time is required"));
    }

    if message.chars().count() > MESSAGE_MAX_CHARS {
        errors.push(FieldError::new("message", "Message must be at most 1000 characters"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewAppointment {
        full_name,
        email,
        phone,
        preferred_date,
        preferred_time,
        message: (!message.is_empty()).then_some(message),
    })
}
