//! Email address helpers: shape validation and display masking.

/// Minimal shape check: one `@`, non-empty local part and domain, domain
/// contains a dot. Deliverability is the mail provider's problem.
pub fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Mask an email address for display: keep the first two characters of the
/// local part, replace the rest of the local part with `*`, keep the domain.
///
/// `"alice@example.com"` → `"al***@example.com"`. Local parts of two or fewer
/// characters are masked entirely. Shown on the recovery verify page as
/// confirmation without revealing the full address.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "*".repeat(email.chars().count());
    };
    let chars: Vec<char> = local.chars().collect();
    let keep = if chars.len() > 2 { 2 } else { 0 };
    let mut masked: String = chars[..keep].iter().collect();
    masked.extend(std::iter::repeat_n('*', chars.len() - keep));
    format!("{masked}@{domain}")
}
