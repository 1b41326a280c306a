use chrono::Utc;
use rand::Rng;

pub const EMPLOYEE_CODE_PREFIX: &str = "EMP";
pub const PROJECT_CODE_PREFIX: &str = "PRJ";

/// `<PREFIX>-<unix millis>-<3-digit random>`.
pub fn generate_code(prefix: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{}-{}-{:03}", prefix, Utc::now().timestamp_millis(), suffix)
}

pub fn is_generated_code(prefix: &str, code: &str) -> bool {
    let Some(rest) = code
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    let Some((timestamp, suffix)) = rest.split_once('-') else {
        return false;
    };

    !timestamp.is_empty()
        && timestamp.chars().all(|c| c.is_ascii_digit())
        && suffix.len() == 3
        && suffix.chars().all(|c| c.is_ascii_digit())
}
