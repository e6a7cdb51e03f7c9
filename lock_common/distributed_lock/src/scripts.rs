//! Lua scripts for distributed lock operations

/// Lua script for releasing lock
/// Returns nil when the key is absent, otherwise deletes it only if the value matches.
/// Replies 1 when the key was deleted and 0 when another owner holds it.
pub const RELEASE_LOCK: &str = r#"
    local current = redis.call('get', KEYS[1])
    if not current then
        return nil
    end
    if current == ARGV[1] then
        return redis.call('del', KEYS[1])
    end
    return 0
"#;
