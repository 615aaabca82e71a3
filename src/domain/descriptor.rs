//! Backend descriptor parsing.
//!
//! A descriptor is the connection string handed to the facade, e.g.
//! `redis=127.0.0.1:6379:2`, `memcached=10.0.0.1;10.0.0.2:11212`,
//! `folder=/var/cache/app/`, `apcu` or `auto`. Parsing is total: anything
//! that is not understood becomes [`Descriptor::Unrecognized`], which the
//! facade turns into the file fallback.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::capability::Accelerator;

static REDIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^redis=(.+)").expect("valid redis descriptor regex"));
static MEMCACHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^memcached=(.+)").expect("valid memcached descriptor regex"));
static FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^folder[ \t]*=[ \t]*([^ \t]+)").expect("valid folder descriptor regex")
});

/// Default memcached port, appended to servers given without one.
pub const MEMCACHED_DEFAULT_PORT: u16 = 11211;

/// Parsed Redis connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisTarget {
    pub host: String,
    /// `0` means the driver default.
    pub port: u16,
    pub db: Option<i64>,
}

/// A descriptor string in parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// Empty descriptor: caching disabled.
    Disabled,
    Redis(RedisTarget),
    /// Memcached servers as `host:port`.
    Memcached(Vec<String>),
    Folder(PathBuf),
    Accelerator(Accelerator),
    Auto,
    Unrecognized,
}

impl Descriptor {
    /// Parses a descriptor. Surrounding whitespace is ignored.
    pub fn parse(dsn: &str) -> Self {
        let dsn = dsn.trim();

        if dsn.is_empty() {
            return Self::Disabled;
        }

        if let Some(caps) = REDIS_RE.captures(dsn) {
            return parse_redis(&caps[1]);
        }

        if let Some(caps) = MEMCACHED_RE.captures(dsn) {
            return parse_memcached(&caps[1]);
        }

        if let Some(caps) = FOLDER_RE.captures(dsn) {
            return Self::Folder(PathBuf::from(&caps[1]));
        }

        if let Some(accelerator) = Accelerator::from_keyword(dsn) {
            return Self::Accelerator(accelerator);
        }

        if dsn.eq_ignore_ascii_case("auto") {
            return Self::Auto;
        }

        Self::Unrecognized
    }
}

fn parse_redis(spec: &str) -> Descriptor {
    let mut parts = spec.split(':');

    let host = parts.next().unwrap_or_default().trim();
    if host.is_empty() {
        return Descriptor::Unrecognized;
    }

    let port = parts
        .next()
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(0);
    let db = parts.next().and_then(|d| d.trim().parse::<i64>().ok());

    Descriptor::Redis(RedisTarget {
        host: host.to_string(),
        port,
        db,
    })
}

fn parse_memcached(spec: &str) -> Descriptor {
    let servers: Vec<String> = spec
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains(':') {
                s.to_string()
            } else {
                format!("{}:{}", s, MEMCACHED_DEFAULT_PORT)
            }
        })
        .collect();

    if servers.is_empty() {
        Descriptor::Unrecognized
    } else {
        Descriptor::Memcached(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_disabled() {
        assert_eq!(Descriptor::parse(""), Descriptor::Disabled);
        assert_eq!(Descriptor::parse("   "), Descriptor::Disabled);
    }

    #[test]
    fn test_redis_host_only() {
        assert_eq!(
            Descriptor::parse("redis=localhost"),
            Descriptor::Redis(RedisTarget {
                host: "localhost".to_string(),
                port: 0,
                db: None,
            })
        );
    }

    #[test]
    fn test_redis_full() {
        assert_eq!(
            Descriptor::parse("redis=10.0.0.5:6380:3"),
            Descriptor::Redis(RedisTarget {
                host: "10.0.0.5".to_string(),
                port: 6380,
                db: Some(3),
            })
        );
    }

    #[test]
    fn test_redis_bad_port_means_default() {
        let Descriptor::Redis(target) = Descriptor::parse("redis=cache:abc") else {
            panic!("expected redis descriptor");
        };
        assert_eq!(target.port, 0);
        assert_eq!(target.db, None);
    }

    #[test]
    fn test_redis_without_host_is_unrecognized() {
        assert_eq!(Descriptor::parse("redis=:6379"), Descriptor::Unrecognized);
    }

    #[test]
    fn test_memcached_servers() {
        assert_eq!(
            Descriptor::parse("memcached=10.0.0.1;10.0.0.2:11212;"),
            Descriptor::Memcached(vec![
                "10.0.0.1:11211".to_string(),
                "10.0.0.2:11212".to_string(),
            ])
        );
        assert_eq!(Descriptor::parse("memcached=;"), Descriptor::Unrecognized);
    }

    #[test]
    fn test_folder_tolerates_spaces_around_equals() {
        assert_eq!(
            Descriptor::parse("folder=/tmp/cache/"),
            Descriptor::Folder(PathBuf::from("/tmp/cache/"))
        );
        assert_eq!(
            Descriptor::parse("folder = /tmp/cache/"),
            Descriptor::Folder(PathBuf::from("/tmp/cache/"))
        );
        assert_eq!(
            Descriptor::parse("folder=/tmp/a b"),
            Descriptor::Folder(PathBuf::from("/tmp/a"))
        );
    }

    #[test]
    fn test_accelerator_keywords() {
        assert_eq!(
            Descriptor::parse("apcu"),
            Descriptor::Accelerator(Accelerator::Apcu)
        );
        assert_eq!(
            Descriptor::parse("xcache"),
            Descriptor::Accelerator(Accelerator::Xcache)
        );
        assert_eq!(Descriptor::parse("APCU"), Descriptor::Unrecognized);
    }

    #[test]
    fn test_auto_is_case_insensitive() {
        assert_eq!(Descriptor::parse("auto"), Descriptor::Auto);
        assert_eq!(Descriptor::parse("AuTo"), Descriptor::Auto);
    }

    #[test]
    fn test_unknown_is_unrecognized() {
        assert_eq!(Descriptor::parse("mongodb=localhost"), Descriptor::Unrecognized);
        assert_eq!(Descriptor::parse("redis"), Descriptor::Unrecognized);
    }
}
