use time::OffsetDateTime;

/// The current instant in UTC. Anything time-dependent takes the instant as
/// an argument and callers pass this in, so nothing caches "now".
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}
