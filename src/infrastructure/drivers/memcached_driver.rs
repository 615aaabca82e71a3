//! Memcached-backed driver speaking the ASCII protocol.
//!
//! Each key lives on exactly one server, picked by CRC32 of the key. A fresh
//! TCP connection is used per operation.

use std::io;

use super::driver::{CacheDriver, matches_pattern};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Longest key memcached accepts.
pub const MAX_KEY_LENGTH: usize = 250;

/// Relative expiry limit; larger values are read by memcached as a unix timestamp.
const MAX_RELATIVE_EXPIRY: u64 = 60 * 60 * 24 * 30;

/// Largest exptime memcached parses (a signed 32-bit field).
const MAX_EXPTIME: u64 = i32::MAX as u64;

/// Largest value a server may announce; matches memcached's `-I` ceiling.
const MAX_VALUE_LENGTH: usize = 1024 * 1024 * 1024;

type Connection = BufStream<TcpStream>;

/// Memcached driver over one or more servers.
pub struct MemcachedDriver {
    servers: Vec<String>,
}

impl MemcachedDriver {
    /// Creates a driver over `servers` given as `host:port`.
    pub fn new(servers: Vec<String>) -> Self {
        debug!("Using MemcachedDriver over {:?}", servers);
        Self { servers }
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    fn server_for(&self, key: &str) -> &str {
        let index = crc32fast::hash(key.as_bytes()) as usize % self.servers.len().max(1);
        self.servers.get(index).map(String::as_str).unwrap_or_default()
    }

    async fn connect(addr: &str) -> io::Result<Connection> {
        let stream = TcpStream::connect(addr).await?;
        Ok(BufStream::new(stream))
    }

    async fn fetch(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let mut conn = Self::connect(self.server_for(key)).await?;
        conn.write_all(format!("get {}\r\n", key).as_bytes()).await?;
        conn.flush().await?;

        let header = read_line(&mut conn).await?;
        if header == "END" {
            return Ok(None);
        }

        let len = parse_value_header(&header)?;
        let mut data = vec![0u8; len + 2];
        conn.read_exact(&mut data).await?;
        data.truncate(len);

        let trailer = read_line(&mut conn).await?;
        if trailer != "END" {
            return Err(protocol_error(&trailer));
        }

        Ok(Some(data))
    }

    async fn store(&self, key: &str, value: &[u8], ttl_seconds: u64) -> io::Result<String> {
        let mut conn = Self::connect(self.server_for(key)).await?;
        let command = format!(
            "set {} 0 {} {}\r\n",
            key,
            expiry_for(ttl_seconds),
            value.len()
        );
        conn.write_all(command.as_bytes()).await?;
        conn.write_all(value).await?;
        conn.write_all(b"\r\n").await?;
        conn.flush().await?;

        read_line(&mut conn).await
    }

    async fn delete(conn: &mut Connection, key: &str) -> io::Result<bool> {
        conn.write_all(format!("delete {}\r\n", key).as_bytes()).await?;
        conn.flush().await?;

        match read_line(conn).await?.as_str() {
            "DELETED" => Ok(true),
            "NOT_FOUND" => Ok(false),
            other => Err(protocol_error(other)),
        }
    }

    /// Lists every key held by the connected server using the LRU crawler.
    async fn dump_keys(conn: &mut Connection) -> io::Result<Vec<String>> {
        conn.write_all(b"lru_crawler metadump all\r\n").await?;
        conn.flush().await?;

        let mut keys = Vec::new();
        loop {
            let line = read_line(conn).await?;
            if line == "END" {
                break;
            }
            if line.starts_with("ERROR") || line.starts_with("BUSY") {
                return Err(protocol_error(&line));
            }

            let encoded = line
                .split_whitespace()
                .find_map(|field| field.strip_prefix("key="));
            if let Some(encoded) = encoded {
                match urlencoding::decode(encoded) {
                    Ok(key) => keys.push(key.into_owned()),
                    Err(_) => keys.push(encoded.to_string()),
                }
            }
        }

        Ok(keys)
    }

    async fn reset_server(addr: &str, prefix: &str, suffix: &str) -> io::Result<usize> {
        let mut conn = Self::connect(addr).await?;
        let keys = Self::dump_keys(&mut conn).await?;

        let mut removed = 0usize;
        for key in keys.iter().filter(|k| matches_pattern(k, prefix, suffix)) {
            if Self::delete(&mut conn, key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Whether memcached accepts `key` as-is.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && !key.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Converts a relative TTL into the exptime field memcached expects.
fn expiry_for(ttl_seconds: u64) -> u64 {
    if ttl_seconds > MAX_RELATIVE_EXPIRY {
        (Utc::now().timestamp().max(0) as u64)
            .saturating_add(ttl_seconds)
            .min(MAX_EXPTIME)
    } else {
        ttl_seconds
    }
}

/// Reads one CRLF-terminated protocol line without its terminator.
async fn read_line(conn: &mut Connection) -> io::Result<String> {
    let mut buf = Vec::new();
    let read = conn.read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "memcached closed the connection",
        ));
    }

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Extracts the byte count from `VALUE <key> <flags> <bytes>`.
fn parse_value_header(line: &str) -> io::Result<usize> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some("VALUE") {
        return Err(protocol_error(line));
    }

    fields
        .nth(2)
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|len| *len <= MAX_VALUE_LENGTH)
        .ok_or_else(|| protocol_error(line))
}

fn protocol_error(line: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("unexpected memcached response: {}", line),
    )
}

#[async_trait]
impl CacheDriver for MemcachedDriver {
    fn name(&self) -> &'static str {
        "memcached"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        if !is_valid_key(key) {
            debug!("Memcached MISS (invalid key): {}", key);
            return None;
        }

        match self.fetch(key).await {
            Ok(Some(bytes)) if !bytes.is_empty() => {
                debug!("Memcached HIT: {}", key);
                Some(bytes)
            }
            Ok(_) => {
                debug!("Memcached MISS: {}", key);
                None
            }
            Err(e) => {
                warn!("Memcached GET error for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> CacheResult<()> {
        if !is_valid_key(key) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }

        let reply = self.store(key, value, ttl_seconds).await.map_err(|e| {
            warn!("Memcached SET error for {}: {}", key, e);
            CacheError::OperationError(format!("Memcached SET failed for {}: {}", key, e))
        })?;

        if reply != "STORED" {
            return Err(CacheError::OperationError(format!(
                "Memcached refused {}: {}",
                key, reply
            )));
        }

        debug!("Memcached SET: {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn clear(&self, key: &str) -> bool {
        if !is_valid_key(key) {
            return false;
        }

        let result = match Self::connect(self.server_for(key)).await {
            Ok(mut conn) => Self::delete(&mut conn, key).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(deleted) => {
                if deleted {
                    debug!("Memcached CLEAR: {}", key);
                }
                deleted
            }
            Err(e) => {
                warn!("Memcached DELETE error for {}: {}", key, e);
                false
            }
        }
    }

    async fn reset(&self, prefix: &str, suffix: &str) -> bool {
        for addr in &self.servers {
            match Self::reset_server(addr, prefix, suffix).await {
                Ok(removed) => debug!(
                    "Memcached RESET {}*{} on {}: {} removed",
                    prefix, suffix, addr, removed
                ),
                Err(e) => warn!("Memcached reset error on {}: {}", addr, e),
            }
        }
        true
    }
}
