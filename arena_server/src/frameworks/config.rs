use std::{env, net::IpAddr, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(23915)
}

pub fn http_host() -> IpAddr {
    env::var("ARENA_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]))
}

// Enables the `upgrayde` debug command.
pub fn allow_upgrayde() -> bool {
    env::var("ARENA_ENABLE_UPGRAYDE")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

pub fn client_buffer() -> usize {
    env::var("ARENA_CLIENT_BUFFER")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CLIENT_BUFFER)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 4096;
pub const DEFAULT_CLIENT_BUFFER: usize = 1024;

pub const PHYSICS_INTERVAL: Duration = Duration::from_millis(16);
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
