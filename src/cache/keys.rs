use std::time::Duration;

pub const SESSION_RECORD_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn session_record_key(session_id: &str) -> String {
    format!("screening:session:{}", session_id)
}
