use crate::error::StoreError;

const DEFAULT_PORT: u16 = 6379;

/// Redis endpoint and options extracted from a connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisDescriptor {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<i64>,
    pub tls: bool,
}

impl RedisDescriptor {
    /// Render the descriptor as a URL accepted by `redis::Client::open`.
    pub fn to_url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let auth = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            (None, Some(password)) => format!(":{}@", urlencoding::encode(password)),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            (None, None) => String::new(),
        };
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let mut url = format!("{}://{}{}:{}", scheme, auth, host, self.port);
        if let Some(db) = self.database {
            url.push_str(&format!("/{}", db));
        }
        url
    }
}

/// Turn a connection descriptor into something `redis::Client::open` accepts.
///
/// URLs (`redis://`, `rediss://`, `redis+unix://`, `unix://`) pass through
/// untouched. Anything else is read as a comma-separated list of endpoints
/// and `key=value` options, e.g.
/// - "localhost"
/// - "localhost:6379"
/// - "cache.internal:6380,password=s3cret,defaultDatabase=2,ssl=true"
///
/// Only the first endpoint is used; the sink holds a single connection.
pub fn to_connection_url(descriptor: &str) -> Result<String, StoreError> {
    let trimmed = descriptor.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("redis://")
        || lower.starts_with("rediss://")
        || lower.starts_with("redis+unix://")
        || lower.starts_with("unix://")
    {
        Ok(trimmed.to_string())
    } else {
        parse_descriptor(trimmed).map(|d| d.to_url())
    }
}

/// Parse the comma-separated `host:port,option=value` form.
pub fn parse_descriptor(descriptor: &str) -> Result<RedisDescriptor, StoreError> {
    let mut endpoint: Option<(String, u16)> = None;
    let mut user = None;
    let mut password = None;
    let mut database = None;
    let mut tls = false;

    for part in descriptor.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "password" => password = Some(value.to_string()),
                "user" => user = Some(value.to_string()),
                "defaultdatabase" | "db" => {
                    let db = value.parse::<i64>().map_err(|_| {
                        StoreError::InvalidDescriptor(format!("bad database number `{}`", value))
                    })?;
                    database = Some(db);
                }
                "ssl" => tls = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        } else if endpoint.is_none() {
            endpoint = Some(parse_endpoint(part)?);
        }
    }

    let (host, port) = endpoint
        .ok_or_else(|| StoreError::InvalidDescriptor("no endpoint in descriptor".to_string()))?;

    Ok(RedisDescriptor {
        host,
        port,
        user,
        password,
        database,
        tls,
    })
}

fn parse_endpoint(endpoint: &str) -> Result<(String, u16), StoreError> {
    // [::1]:6379
    if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            StoreError::InvalidDescriptor(format!("unterminated IPv6 endpoint `{}`", endpoint))
        })?;
        let port = match tail.strip_prefix(':') {
            Some(port) => parse_port(port)?,
            None => DEFAULT_PORT,
        };
        return Ok((host.to_string(), port));
    }

    match endpoint.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => Ok((host.to_string(), parse_port(port)?)),
        _ => Ok((endpoint.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, StoreError> {
    port.parse::<u16>()
        .map_err(|_| StoreError::InvalidDescriptor(format!("bad port `{}`", port)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_and_port() {
        assert_eq!(
            to_connection_url("localhost:6379").unwrap(),
            "redis://localhost:6379"
        );
    }

    #[test]
    fn bare_host_gets_default_port() {
        let d = parse_descriptor("cache").unwrap();
        assert_eq!(d.host, "cache");
        assert_eq!(d.port, 6379);
    }

    #[test]
    fn options_are_applied_and_encoded() {
        let url =
            to_connection_url("cache:6380, password=p@ss/word ,defaultDatabase=2,ssl=true,abortConnect=false")
                .unwrap();
        assert_eq!(url, "rediss://:p%40ss%2Fword@cache:6380/2");
    }

    #[test]
    fn first_endpoint_wins() {
        let d = parse_descriptor("a:1,b:2").unwrap();
        assert_eq!((d.host.as_str(), d.port), ("a", 1));
    }

    #[test]
    fn urls_pass_through() {
        assert_eq!(
            to_connection_url(" redis://user:pw@host:1/3 ").unwrap(),
            "redis://user:pw@host:1/3"
        );
    }

    #[test]
    fn ipv6_endpoint() {
        let d = parse_descriptor("[::1]:7000").unwrap();
        assert_eq!(d.host, "::1");
        assert_eq!(d.to_url(), "redis://[::1]:7000");
    }

    #[test]
    fn rejects_missing_endpoint_and_bad_numbers() {
        assert!(matches!(
            parse_descriptor("password=x"),
            Err(StoreError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            parse_descriptor("host:notaport"),
            Err(StoreError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            parse_descriptor("host,db=two"),
            Err(StoreError::InvalidDescriptor(_))
        ));
    }
}
