//! Naming conventions between Rust identifiers and SQL identifiers.

use std::collections::HashSet;

/// Converts between a Rust name (type or field) and a SQL name.
pub trait NameMapper: Send + Sync {
    fn obj_to_table(&self, name: &str) -> String;
    fn table_to_obj(&self, name: &str) -> String;
}

/// `UserInfo` <-> `user_info`. Every upper-case letter starts a word.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeMapper;

impl NameMapper for SnakeMapper {
    fn obj_to_table(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, ch) in name.chars().enumerate() {
            if ch.is_ascii_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    fn table_to_obj(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut upper = true;
        for ch in name.chars() {
            if ch == '_' {
                upper = true;
            } else if upper {
                out.push(ch.to_ascii_uppercase());
                upper = false;
            } else {
                out.push(ch);
            }
        }
        out
    }
}

/// Identity mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameMapper;

impl NameMapper for SameMapper {
    fn obj_to_table(&self, name: &str) -> String {
        name.to_string()
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.to_string()
    }
}

const INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TLS", "TTL", "UI", "UID",
    "UUID", "URI", "URL", "UTF8", "VM", "XML", "XSRF", "XSS",
];

/// Snake case that keeps runs of capitals together: `HTTPServer` <->
/// `http_server`, `UserID` <-> `user_id`. Known initialisms are restored
/// in upper case when mapping back.
#[derive(Debug, Clone)]
pub struct GonicMapper {
    initialisms: HashSet<String>,
}

impl GonicMapper {
    /// Mapper with the common initialisms.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initialisms(INITIALISMS.iter().copied())
    }

    #[must_use]
    pub fn with_initialisms<'a>(initialisms: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            initialisms: initialisms.into_iter().map(str::to_ascii_uppercase).collect(),
        }
    }
}

impl Default for GonicMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl NameMapper for GonicMapper {
    fn obj_to_table(&self, name: &str) -> String {
        let mut out: Vec<char> = Vec::with_capacity(name.len() + 4);
        for (i, ch) in name.chars().enumerate() {
            if ch.is_ascii_uppercase()
                && i > 0
                && out.last().is_some_and(|c| !c.is_ascii_uppercase())
            {
                out.push('_');
            }
            if !ch.is_ascii_uppercase() && i > 1 {
                let n = out.len();
                if n >= 2 && out[n - 1].is_ascii_uppercase() && out[n - 2].is_ascii_uppercase() {
                    // `HTTPServer`: the last capital starts the next word
                    let last = out[n - 1];
                    out[n - 1] = '_';
                    out.push(last);
                }
            }
            out.push(ch);
        }
        out.into_iter().collect::<String>().to_ascii_lowercase()
    }

    fn table_to_obj(&self, name: &str) -> String {
        let lower = name.to_ascii_lowercase();
        let mut out = String::with_capacity(name.len());
        for part in lower.split('_') {
            let upper = part.to_ascii_uppercase();
            if self.initialisms.contains(&upper) {
                out.push_str(&upper);
                continue;
            }
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.extend(chars);
            }
        }
        out
    }
}

/// Adds a fixed prefix to the names produced by another mapper.
#[derive(Debug, Clone)]
pub struct PrefixMapper<M> {
    pub mapper: M,
    pub prefix: String,
}

impl<M: NameMapper> PrefixMapper<M> {
    #[must_use]
    pub fn new(mapper: M, prefix: impl Into<String>) -> Self {
        Self {
            mapper,
            prefix: prefix.into(),
        }
    }
}

impl<M: NameMapper> NameMapper for PrefixMapper<M> {
    fn obj_to_table(&self, name: &str) -> String {
        format!("{}{}", self.prefix, self.mapper.obj_to_table(name))
    }

    fn table_to_obj(&self, name: &str) -> String {
        let name = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        self.mapper.table_to_obj(name)
    }
}

/// Adds a fixed suffix to the names produced by another mapper.
#[derive(Debug, Clone)]
pub struct SuffixMapper<M> {
    pub mapper: M,
    pub suffix: String,
}

impl<M: NameMapper> SuffixMapper<M> {
    #[must_use]
    pub fn new(mapper: M, suffix: impl Into<String>) -> Self {
        Self {
            mapper,
            suffix: suffix.into(),
        }
    }
}

impl<M: NameMapper> NameMapper for SuffixMapper<M> {
    fn obj_to_table(&self, name: &str) -> String {
        format!("{}{}", self.mapper.obj_to_table(name), self.suffix)
    }

    fn table_to_obj(&self, name: &str) -> String {
        let name = name.strip_suffix(self.suffix.as_str()).unwrap_or(name);
        self.mapper.table_to_obj(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_mapper() {
        assert_eq!(SnakeMapper.obj_to_table("UserInfo"), "user_info");
        assert_eq!(SnakeMapper.obj_to_table("user_id"), "user_id");
        assert_eq!(SnakeMapper.obj_to_table("UserID"), "user_i_d");
        assert_eq!(SnakeMapper.table_to_obj("user_info"), "UserInfo");
    }

    #[test]
    fn test_same_mapper() {
        assert_eq!(SameMapper.obj_to_table("UserInfo"), "UserInfo");
        assert_eq!(SameMapper.table_to_obj("user_info"), "user_info");
    }

    #[test]
    fn test_gonic_mapper() {
        let mapper = GonicMapper::new();
        assert_eq!(mapper.obj_to_table("HTTPServer"), "http_server");
        assert_eq!(mapper.obj_to_table("UserID"), "user_id");
        assert_eq!(mapper.obj_to_table("UserInfo"), "user_info");
        assert_eq!(mapper.obj_to_table("URL"), "url");

        assert_eq!(mapper.table_to_obj("user_id"), "UserID");
        assert_eq!(mapper.table_to_obj("http_server"), "HTTPServer");
        assert_eq!(mapper.table_to_obj("user_info"), "UserInfo");
    }

    #[test]
    fn test_prefix_and_suffix() {
        let prefixed = PrefixMapper::new(SnakeMapper, "app_");
        assert_eq!(prefixed.obj_to_table("UserInfo"), "app_user_info");
        assert_eq!(prefixed.table_to_obj("app_user_info"), "UserInfo");

        let suffixed = SuffixMapper::new(GonicMapper::new(), "_v2");
        assert_eq!(suffixed.obj_to_table("UserID"), "user_id_v2");
        assert_eq!(suffixed.table_to_obj("user_id_v2"), "UserID");
    }
}
