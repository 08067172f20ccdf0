//! Canonical URLs for published posts. Every presenter that emits a link to a
//! post goes through [`entry_link`], so the feed, tag pages, archives and
//! index listings always agree with the path the post's page was written to.

/// Returns `site_url` without trailing slashes.
pub fn site_root(site_url: &str) -> &str {
    site_url.trim_end_matches('/')
}

/// Builds `{site_url}/{post_dir}/{slug}.html` with exactly one `/` between
/// the parts, whatever slashes the inputs carry. An empty `post_dir` (a post
/// published at the site root) yields `{site_url}/{slug}.html`.
pub fn entry_link(site_url: &str, post_dir: &str, slug: &str) -> String {
    let post_dir = post_dir.trim_matches('/');
    let mut link = String::from(site_root(site_url));
    link.push('/');
    if !post_dir.is_empty() {
        link.push_str(post_dir);
        link.push('/');
    }
    link.push_str(slug);
    link.push_str(".html");
    link
}
