//! Campaign identifiers

/// Lowercase slug: every run of non-alphanumeric characters becomes one `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "campaign".to_string()
    } else {
        slug
    }
}

/// Native id when the export carries one, else `{platform_slug}-{slug(name)}`
pub fn build_campaign_id(platform_slug: &str, campaign_name: &str, explicit_id: Option<&str>) -> String {
    match explicit_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => format!("{}-{}", platform_slug, slugify(campaign_name)),
    }
}
