// Fri Jan 16 2026 - Alex

use std::borrow::Cow;

pub struct StringUtils;

impl StringUtils {
    pub fn truncate(s: &str, max_len: usize) -> Cow<'_, str> {
        if s.chars().count() <= max_len {
            Cow::Borrowed(s)
        } else if max_len >= 3 {
            let head: String = s.chars().take(max_len - 3).collect();
            Cow::Owned(format!("{}...", head))
        } else {
            Cow::Owned(s.chars().take(max_len).collect())
        }
    }

    /// `PoolState` -> `pool_state`, `USDCoin` -> `usd_coin`, `SUI` -> `sui`.
    pub fn snake_case(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len() + 4);

        for (i, &c) in chars.iter().enumerate() {
            if c.is_uppercase() {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();
                let boundary = match prev {
                    Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                    Some(p) if p.is_uppercase() => next.map_or(false, |n| n.is_lowercase()),
                    _ => false,
                };
                if boundary && !result.ends_with('_') {
                    result.push('_');
                }
                result.extend(c.to_lowercase());
            } else if c == ' ' || c == '-' {
                if !result.ends_with('_') {
                    result.push('_');
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    pub fn is_valid_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {
                chars.all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    pub fn sanitize_identifier(s: &str) -> String {
        if Self::is_valid_identifier(s) {
            return s.to_string();
        }

        let mut result: String = s
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        let collapsed = result.trim_matches('_').to_string();
        result = collapsed;

        if result.is_empty() || result.chars().next().map_or(false, |c| c.is_numeric()) {
            result = format!("_{}", result);
        }

        result
    }

    pub fn indent(level: usize, size: usize) -> String {
        " ".repeat(level * size)
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    StringUtils::truncate(s, max_len).into_owned()
}

pub fn snake_case(s: &str) -> String {
    StringUtils::snake_case(s)
}

pub fn sanitize_identifier(s: &str) -> String {
    StringUtils::sanitize_identifier(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("PoolState"), "pool_state");
        assert_eq!(snake_case("AdminCap"), "admin_cap");
        assert_eq!(snake_case("USDCoin"), "usd_coin");
        assert_eq!(snake_case("SUI"), "sui");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("a-b"), "a_b");
        assert_eq!(sanitize_identifier("9lives"), "_9lives");
        assert_eq!(sanitize_identifier("<>"), "_");
        assert!(StringUtils::is_valid_identifier("coin_in"));
        assert!(!StringUtils::is_valid_identifier("1x"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long line", 8), "a ver...");
    }
}
