//! User service events: accounts, sessions, tokens and security signals.

use super::note;
use crate::registry::Registry;
use crate::standard::{
    FAILED_LOGIN_ATTEMPTS_BY_IP, JWT_TOKENS_ISSUED_TOTAL, JWT_TOKENS_REVOKED_TOTAL,
    JWT_TOKENS_VALIDATED_TOTAL, RATE_LIMIT_EXCEEDED_TOTAL, SUSPICIOUS_ACTIVITIES_TOTAL,
    USER_ACCOUNT_ACTIONS_TOTAL, USER_ACTIVE_SESSIONS, USER_EMAIL_VERIFICATIONS_TOTAL,
    USER_LOGIN_ATTEMPTS_TOTAL, USER_PASSWORD_RESET_REQUESTS_TOTAL, USER_PROFILE_UPDATES_TOTAL,
    USER_REGISTRATIONS_TOTAL, USER_SESSIONS_CREATED_TOTAL,
};

pub const DEFAULT_SOURCE: &str = "web";
pub const DEFAULT_LOGIN_METHOD: &str = "email";
pub const DEFAULT_TOKEN_TYPE: &str = "access";
pub const ANONYMOUS_USER: &str = "anonymous";

/// `source`: web, mobile, api.
pub fn registered(reg: &Registry, source: &str) {
    note("registered", reg.inc_counter(USER_REGISTRATIONS_TOTAL, &[source]));
}

/// `method`: email, social.
pub fn login_attempted(reg: &Registry, success: bool, method: &str) {
    let status = if success { "success" } else { "failed" };
    note(
        "login_attempted",
        reg.inc_counter(USER_LOGIN_ATTEMPTS_TOTAL, &[status, method]),
    );
}

/// Labels by raw IP: one series per address.
pub fn failed_login_from(reg: &Registry, ip_address: &str) {
    note(
        "failed_login_from",
        reg.inc_counter(FAILED_LOGIN_ATTEMPTS_BY_IP, &[ip_address]),
    );
}

pub fn session_created(reg: &Registry) {
    note("session_created", reg.inc_counter(USER_SESSIONS_CREATED_TOTAL, &[]));
}

pub fn active_sessions(reg: &Registry, count: u64) {
    note(
        "active_sessions",
        reg.set_gauge(USER_ACTIVE_SESSIONS, &[], count as f64),
    );
}

/// `status`: initiated, completed, failed.
pub fn password_reset(reg: &Registry, status: &str) {
    note(
        "password_reset",
        reg.inc_counter(USER_PASSWORD_RESET_REQUESTS_TOTAL, &[status]),
    );
}

/// `field`: email, name, address, preferences.
pub fn profile_updated(reg: &Registry, field: &str) {
    note("profile_updated", reg.inc_counter(USER_PROFILE_UPDATES_TOTAL, &[field]));
}

/// `status`: sent, verified, failed.
pub fn email_verification(reg: &Registry, status: &str) {
    note(
        "email_verification",
        reg.inc_counter(USER_EMAIL_VERIFICATIONS_TOTAL, &[status]),
    );
}

/// `action`: deactivate, reactivate, delete.
pub fn account_action(reg: &Registry, action: &str) {
    note("account_action", reg.inc_counter(USER_ACCOUNT_ACTIONS_TOTAL, &[action]));
}

/// `token_type`: access, refresh.
pub fn jwt_issued(reg: &Registry, token_type: &str) {
    note("jwt_issued", reg.inc_counter(JWT_TOKENS_ISSUED_TOTAL, &[token_type]));
}

/// `status`: valid, expired, invalid.
pub fn jwt_validated(reg: &Registry, status: &str) {
    note("jwt_validated", reg.inc_counter(JWT_TOKENS_VALIDATED_TOTAL, &[status]));
}

/// `reason`: logout, security, expired.
pub fn jwt_revoked(reg: &Registry, reason: &str) {
    note("jwt_revoked", reg.inc_counter(JWT_TOKENS_REVOKED_TOTAL, &[reason]));
}

/// `kind`: brute_force, unusual_location, rapid_requests.
pub fn suspicious_activity(reg: &Registry, kind: &str) {
    note(
        "suspicious_activity",
        reg.inc_counter(SUSPICIOUS_ACTIVITIES_TOTAL, &[kind]),
    );
}

pub fn rate_limit_exceeded(reg: &Registry, endpoint: &str, user_id: &str) {
    note(
        "rate_limit_exceeded",
        reg.inc_counter(RATE_LIMIT_EXCEEDED_TOTAL, &[endpoint, user_id]),
    );
}
