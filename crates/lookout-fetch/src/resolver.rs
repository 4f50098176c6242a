use crate::error::{FetchError, Result};
use async_trait::async_trait;
use dns_lookup::{AddrInfoHints, LookupError, LookupErrorKind, SockType};
use std::io;
use std::net::{IpAddr, SocketAddr};

/// Forward and reverse address lookups.
///
/// An authoritative "no such record" answer is [`FetchError::NoRecord`].
/// Any other failure, SERVFAIL or a timeout for instance, is
/// [`FetchError::Resolve`].
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve `host` to its addresses, deduplicated, in resolver order.
    async fn lookup_host(&self, host: &str) -> Result<Vec<IpAddr>>;

    /// Reverse-resolve `ip` to a host name.
    async fn reverse(&self, ip: IpAddr) -> Result<String>;
}

/// Resolver using the operating system's name service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

fn classify(subject: &str, err: LookupError) -> FetchError {
    match err.kind() {
        LookupErrorKind::NoName | LookupErrorKind::NoData => {
            FetchError::NoRecord(subject.to_string())
        }
        _ => FetchError::Resolve(format!("{subject}: {}", io::Error::from(err))),
    }
}

fn forward(host: &str) -> Result<Vec<IpAddr>> {
    let hints = AddrInfoHints {
        socktype: SockType::Stream.into(),
        ..AddrInfoHints::default()
    };
    let answers = dns_lookup::getaddrinfo(Some(host), None, Some(hints))
        .map_err(|e| classify(host, e))?;

    let mut ips: Vec<IpAddr> = Vec::new();
    for answer in answers {
        let ip = answer
            .map_err(|e| FetchError::Resolve(format!("{host}: {e}")))?
            .sockaddr
            .ip();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }

    if ips.is_empty() {
        return Err(FetchError::NoRecord(host.to_string()));
    }
    Ok(ips)
}

fn backward(ip: IpAddr) -> Result<String> {
    let subject = ip.to_string();
    let (name, _) =
        dns_lookup::getnameinfo(&SocketAddr::new(ip, 0), 0).map_err(|e| classify(&subject, e))?;

    // Without a PTR record getnameinfo echoes the numeric form back.
    if name == subject {
        return Err(FetchError::NoRecord(subject));
    }
    Ok(name)
}

async fn blocking<T, F>(what: &'static str, lookup: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(lookup)
        .await
        .map_err(|e| FetchError::Resolve(format!("{what} task failed: {e}")))?
}

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn lookup_host(&self, host: &str) -> Result<Vec<IpAddr>> {
        let host = host.to_string();
        blocking("forward lookup", move || forward(&host)).await
    }

    async fn reverse(&self, ip: IpAddr) -> Result<String> {
        blocking("reverse lookup", move || backward(ip)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_lookup_literal_address() {
        let ips = SystemResolver.lookup_host("127.0.0.1").await.unwrap();
        assert_eq!(ips, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    }

    // glibc gai codes: EAI_NONAME = -2, EAI_AGAIN = -3.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_classify_lookup_errors() {
        let missing = classify("nothing-here.example", LookupError::new(-2));
        assert!(matches!(
            missing,
            FetchError::NoRecord(ref host) if host == "nothing-here.example"
        ));

        let transient = classify("example.com", LookupError::new(-3));
        assert!(matches!(
            transient,
            FetchError::Resolve(ref msg) if msg.starts_with("example.com: ")
        ));
    }

    #[tokio::test]
    #[ignore = "requires a working system resolver"]
    async fn test_unknown_name_is_no_record() {
        let err = SystemResolver
            .lookup_host("nothing-here.invalid")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NoRecord(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    #[ignore = "requires a working system resolver"]
    async fn test_reverse_loopback() {
        let name = SystemResolver
            .reverse(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .await
            .unwrap();
        assert!(!name.is_empty());
    }
}
