// src/mail/templates.rs

use super::{NotificationKind, OutgoingEmail};
use crate::models::{Appointment, AppointmentStatus};
use crate::validation::escape_html;

fn wrap(clinic: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; color: #1f2937;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
      <h2 style="color: #0f766e;">{clinic}</h2>
{body}
    </div>
  </body>
</html>"#,
        clinic = escape_html(clinic),
    )
}

fn details_table(rows: &[(&str, &str)]) -> String {
    let mut out = String::from("      <table cellpadding=\"6\" style=\"border-collapse: collapse;\">\n");
    for (label, value) in rows {
        out.push_str(&format!(
            "        <tr><td><strong>{}</strong></td><td>{}</td></tr>\n",
            escape_html(label),
            escape_html(value)
        ));
    }
    out.push_str("      </table>");
    out
}

pub fn patient_confirmation(clinic: &str, apt: &Appointment) -> OutgoingEmail {
    let body = format!(
        "      <p>Dear {name},</p>\n      <p>Your appointment has been <strong>confirmed</strong>.</p>\n{table}\n      <p>We look forward to seeing you.</p>",
        name = escape_html(&apt.full_name),
        table = details_table(&[("Date", &apt.preferred_date), ("Time", &apt.preferred_time)]),
    );
    OutgoingEmail {
        kind: NotificationKind::PatientConfirmation,
        to: apt.email.clone(),
        subject: format!("Your appointment at {clinic} is confirmed"),
        html: wrap(clinic, &body),
    }
}

pub fn patient_cancellation(clinic: &str, apt: &Appointment) -> OutgoingEmail {
    let body = format!(
        "      <p>Dear {name},</p>\n      <p>Your appointment has been <strong>cancelled</strong>.</p>\n{table}\n      <p>Please contact us or book a new time if you would like to reschedule.</p>",
        name = escape_html(&apt.full_name),
        table = details_table(&[("Date", &apt.preferred_date), ("Time", &apt.preferred_time)]),
    );
    OutgoingEmail {
        kind: NotificationKind::PatientCancellation,
        to: apt.email.clone(),
        subject: format!("Your appointment at {clinic} has been cancelled"),
        html: wrap(clinic, &body),
    }
}

fn appointment_rows(apt: &Appointment) -> Vec<(&'static str, &str)> {
    vec![
        ("Appointment ID", apt.id.as_str()),
        ("Name", apt.full_name.as_str()),
        ("Email", apt.email.as_str()),
        ("Phone", apt.phone.as_str()),
        ("Date", apt.preferred_date.as_str()),
        ("Time", apt.preferred_time.as_str()),
        ("Message", apt.message.as_deref().unwrap_or("-")),
    ]
}

pub fn admin_new_request(clinic: &str, inbox: &str, apt: &Appointment) -> OutgoingEmail {
    let body = format!(
        "      <p>A new appointment request is awaiting review.</p>\n{}",
        details_table(&appointment_rows(apt))
    );
    OutgoingEmail {
        kind: NotificationKind::AdminNewRequest,
        to: inbox.to_string(),
        subject: format!("New appointment request: {} on {}", apt.full_name, apt.preferred_date),
        html: wrap(clinic, &body),
    }
}

pub fn admin_status_change(
    clinic: &str,
    inbox: &str,
    apt: &Appointment,
    status: AppointmentStatus,
) -> OutgoingEmail {
    let mut rows = appointment_rows(apt);
    rows.push(("Status", status.as_str()));
    let body = format!(
        "      <p>An appointment was marked <strong>{}</strong>.</p>\n{}",
        status,
        details_table(&rows)
    );
    OutgoingEmail {
        kind: NotificationKind::AdminStatusChange,
        to: inbox.to_string(),
        subject: format!("Appointment {}: {} on {}", status, apt.full_name, apt.preferred_date),
        html: wrap(clinic, &body),
    }
}
