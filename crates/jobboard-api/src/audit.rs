//! Security audit logging for authentication events
//!
//! Signups, logins and rejected requests at the session gate are logged at
//! INFO level under the `audit` target, so they can be filtered and routed
//! separately from request traces. Events never carry passwords or tokens.

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Security audit events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// New account created
    SignupSuccess {
        user_id: Uuid,
        email: String,
        role: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Signup rejected before anything was stored
    SignupFailure {
        email: Option<String>,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Credentials accepted and a token issued
    LoginSuccess {
        user_id: Uuid,
        email: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Credentials rejected
    LoginFailure {
        identifier: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Request stopped at the session gate
    AccessDenied {
        path: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Account removed along with its postings
    AccountDeleted {
        user_id: Uuid,
        ip_address: Option<String>,
    },
}

/// Log an audit event under the `audit` target
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::SignupSuccess {
            user_id,
            email,
            role,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                role = %role,
                ip_address = ?ip_address,
                "Signup successful"
            );
        }
        AuditEvent::SignupFailure {
            email,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = ?email,
                reason = %reason,
                ip_address = ?ip_address,
                "Signup failed"
            );
        }
        AuditEvent::LoginSuccess {
            user_id,
            email,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            identifier,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                identifier = %identifier,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::AccessDenied {
            path,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                path = %path,
                reason = %reason,
                ip_address = ?ip_address,
                "Access denied"
            );
        }
        AuditEvent::AccountDeleted {
            user_id,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                ip_address = ?ip_address,
                "Account deleted"
            );
        }
    }
}

/// Client IP from proxy headers, if any
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    // X-Forwarded-For: first entry is the client
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
