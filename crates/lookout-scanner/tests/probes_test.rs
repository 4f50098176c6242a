mod common;

use common::{context, StubFetcher, StubResolver};
use lookout_core::{Found, Identifier, ProbeStatus, QueryType};
use lookout_fetch::FetchError;
use lookout_scanner::probes::profile::{ProfileProbe, GITHUB, INSTAGRAM, LINKEDIN, TELEGRAM, VK};
use lookout_scanner::probes::{email_probes, AddressProbe, DnsSummaryProbe, EndpointProbe};
use lookout_scanner::{Probe, ScanError};

fn username(raw: &str) -> Identifier {
    Identifier::parse(QueryType::Username, raw).unwrap()
}

#[tokio::test]
async fn test_private_instagram_profile() {
    let body = r#"<html><head>
        <meta property="og:title" content="Jane (@jane)">
        <script>window._sharedData = {};</script>
        </head><body>This Account is Private</body></html>"#;
    let ctx = context(
        StubFetcher::new().page("https://instagram.com/jane", 200, body),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(INSTAGRAM)
        .check(&ctx, &username("jane"))
        .await
        .unwrap();

    assert_eq!(result.found, Found::Yes);
    assert_eq!(result.fields.get("title"), Some("Jane (@jane)"));
    assert_eq!(result.fields.get("access_type"), Some("Private"));
}

#[tokio::test]
async fn test_instagram_login_wall_is_inconclusive() {
    let ctx = context(
        StubFetcher::new().page("https://instagram.com/jane", 200, "<html>Log in</html>"),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(INSTAGRAM)
        .check(&ctx, &username("jane"))
        .await
        .unwrap();

    assert_eq!(result.found, Found::Unknown);
    assert_eq!(result.status, ProbeStatus::Accessible);
    assert!(result.fields.is_empty());
}

#[tokio::test]
async fn test_telegram_channel_flag() {
    let body = r#"<html><head><meta property="og:title" content="Rust News"></head>
        <body><div class="tgme_page_extra">12 345 subscribers</div></body></html>"#;
    let ctx = context(
        StubFetcher::new().page("https://t.me/rustnews", 200, body),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(TELEGRAM)
        .check(&ctx, &username("@RustNews"))
        .await
        .unwrap();

    assert_eq!(result.source_url, "https://t.me/rustnews");
    assert_eq!(result.fields.get("name"), Some("Rust News"));
    assert_eq!(result.fields.get("type"), Some("Channel"));
}

#[tokio::test]
async fn test_vk_deleted_profile() {
    let ctx = context(
        StubFetcher::new().page("https://vk.com/durov", 200, "<html>Профиль удален</html>"),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(VK)
        .check(&ctx, &username("durov"))
        .await
        .unwrap();

    assert_eq!(result.found, Found::No);
    assert_eq!(result.status, ProbeStatus::NotFound);
}

#[tokio::test]
async fn test_rate_limited_profile() {
    let ctx = context(
        StubFetcher::new().page("https://vk.com/durov", 429, ""),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(VK)
        .check(&ctx, &username("durov"))
        .await
        .unwrap();

    assert_eq!(result.found, Found::Unknown);
    assert_eq!(result.status, ProbeStatus::Http(429));
}

#[tokio::test]
async fn test_fetch_failure_propagates_from_probe() {
    let ctx = context(
        StubFetcher::new().failing("https://vk.com/durov", "tls handshake failed"),
        StubResolver::new(),
    );

    let err = ProfileProbe::new(VK)
        .check(&ctx, &username("durov"))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Fetch(_)));
    assert!(err.to_string().contains("tls handshake failed"));
}

#[tokio::test]
async fn test_endpoint_probe_encodes_query() {
    let fetcher = std::sync::Arc::new(
        StubFetcher::new().page("https://example.test/search?q=a%2Bb%40mail.com", 200, "{}"),
    );
    let resolver = std::sync::Arc::new(StubResolver::new());
    let ctx = lookout_scanner::ProbeContext::new(fetcher.clone(), resolver);
    let id = Identifier::parse(QueryType::Email, "a+b@mail.com").unwrap();

    let result = EndpointProbe::new("Search", "https://example.test/search?q={query}")
        .check(&ctx, &id)
        .await
        .unwrap();

    assert_eq!(result.status, ProbeStatus::Accessible);
    assert_eq!(result.found, Found::Unknown);
    assert_eq!(fetcher.requested(), ["https://example.test/search?q=a%2Bb%40mail.com"]);
}

#[tokio::test]
async fn test_address_probe_for_subdomain() {
    let ctx = context(
        StubFetcher::new(),
        StubResolver::new().host("api.eu.example.com", &["203.0.113.7"]),
    );
    let id = Identifier::parse(QueryType::Domain, "API.eu.example.com").unwrap();

    let result = AddressProbe.check(&ctx, &id).await.unwrap();

    assert_eq!(result.found, Found::Yes);
    assert_eq!(result.source_url, "dns:api.eu.example.com");
    assert_eq!(result.fields.get("subdomain"), Some("api.eu"));
    assert_eq!(result.fields.get("main_domain"), Some("example.com"));
    assert_eq!(result.fields.get("ip_address"), Some("203.0.113.7"));
}

#[tokio::test]
async fn test_unresolvable_domain() {
    let ctx = context(StubFetcher::new(), StubResolver::new());
    let id = Identifier::parse(QueryType::Domain, "nothing-here.example").unwrap();

    let address = AddressProbe.check(&ctx, &id).await.unwrap();
    let dns = DnsSummaryProbe.check(&ctx, &id).await.unwrap();

    assert_eq!(address.found, Found::No);
    assert_eq!(address.fields.get("main_domain"), Some("nothing-here.example"));
    assert!(!address.fields.contains_key("ip_address"));
    assert_eq!(dns.found, Found::No);
    assert!(dns.fields.is_empty());
}

#[tokio::test]
async fn test_domain_probe_rejects_other_identifiers() {
    let ctx = context(StubFetcher::new(), StubResolver::new());

    let err = DnsSummaryProbe.check(&ctx, &username("octocat")).await.unwrap_err();

    assert!(matches!(err, ScanError::UnsupportedIdentifier { .. }));
}

#[tokio::test]
async fn test_github_followers_link() {
    let body = r#"<html><body>
        <span class="p-nickname">octocat</span>
        <a class="Link--secondary" href="/octocat?tab=followers">
          <span class="text-bold">21.7k</span> followers
        </a>
        <a href="/octocat?tab=following">9 following</a>
        </body></html>"#;
    let ctx = context(
        StubFetcher::new().page("https://github.com/octocat", 200, body),
        StubResolver::new(),
    );

    let result = ProfileProbe::new(GITHUB)
        .check(&ctx, &username("octocat"))
        .await
        .unwrap();

    assert_eq!(result.found, Found::Yes);
    assert_eq!(result.fields.get("followers_link"), Some("21.7k followers"));
}

#[tokio::test]
async fn test_linkedin_visibility() {
    let public = r#"<html><head>
        <meta property="og:title" content="Jane Doe - Engineer">
        </head><body>Experience</body></html>"#;
    let private = "<html><body>This profile is private</body></html>";
    let ctx = context(
        StubFetcher::new()
            .page("https://linkedin.com/in/jane", 200, public)
            .page("https://linkedin.com/in/hidden", 200, private),
        StubResolver::new(),
    );
    let probe = ProfileProbe::new(LINKEDIN);

    let open = probe.check(&ctx, &username("jane")).await.unwrap();
    assert_eq!(open.fields.get("profile_title"), Some("Jane Doe - Engineer"));
    assert_eq!(open.fields.get("visibility"), Some("Public"));

    let hidden = probe.check(&ctx, &username("hidden")).await.unwrap();
    assert_eq!(hidden.found, Found::Yes);
    assert_eq!(hidden.fields.get("visibility"), Some("Private"));
}

#[tokio::test]
async fn test_linkedin_directory_endpoint_for_email() {
    let ctx = context(
        StubFetcher::new().page("https://www.linkedin.com/pub/dir?company=", 200, "<html></html>"),
        StubResolver::new(),
    );
    let id = Identifier::parse(QueryType::Email, "jane@corp.example").unwrap();
    let probes = email_probes();
    let linkedin = probes
        .iter()
        .find(|p| p.platform() == "LinkedIn")
        .expect("LinkedIn email endpoint registered");

    let result = linkedin.check(&ctx, &id).await.unwrap();

    assert_eq!(result.source_url, "https://www.linkedin.com/pub/dir?company=");
    assert_eq!(result.status, ProbeStatus::Accessible);
    assert_eq!(result.found, Found::Unknown);
}

#[tokio::test]
async fn test_transient_resolver_failure_propagates() {
    let ctx = context(
        StubFetcher::new(),
        StubResolver::new()
            .broken("example.com", "temporary failure in name resolution")
            .broken("192.0.2.1", "temporary failure in name resolution"),
    );
    let domain = Identifier::parse(QueryType::Domain, "example.com").unwrap();
    let ip = Identifier::parse(QueryType::Domain, "192.0.2.1").unwrap();

    for err in [
        AddressProbe.check(&ctx, &domain).await.unwrap_err(),
        AddressProbe.check(&ctx, &ip).await.unwrap_err(),
        DnsSummaryProbe.check(&ctx, &domain).await.unwrap_err(),
    ] {
        assert!(matches!(err, ScanError::Fetch(FetchError::Resolve(_))), "{err}");
    }
}
