use crate::error::{Result, ScanError};
use lookout_core::Identifier;

/// Expand a probe URL template for `identifier`.
///
/// Supported placeholders:
/// - `{query}` - URL-encoded normalized identifier
/// - `{local}` - URL-encoded local part of an email address
/// - `{digits}` - digits of a phone number
/// - `{host}` - bare host of a domain or IP
pub fn build_probe_url(template: &str, identifier: &Identifier) -> Result<String> {
    let mut url = template.replace("{query}", &urlencoding::encode(identifier.normalized()));

    if url.contains("{local}") {
        let (local, _) = identifier
            .email_parts()
            .ok_or_else(|| template_error(template, "{local} needs an email address"))?;
        url = url.replace("{local}", &urlencoding::encode(local));
    }

    if url.contains("{digits}") {
        match identifier {
            Identifier::PhoneNumber { normalized, .. } => url = url.replace("{digits}", normalized),
            _ => return Err(template_error(template, "{digits} needs a phone number")),
        }
    }

    if url.contains("{host}") {
        match identifier {
            Identifier::DomainOrIp { normalized, .. } => url = url.replace("{host}", normalized),
            _ => return Err(template_error(template, "{host} needs a domain or IP")),
        }
    }

    if let Some(start) = url.find('{') {
        if url[start..].contains('}') {
            return Err(template_error(template, "unknown placeholder"));
        }
    }

    Ok(url)
}

fn template_error(template: &str, reason: &str) -> ScanError {
    ScanError::Template {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}
