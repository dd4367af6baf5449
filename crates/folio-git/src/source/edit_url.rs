//! Edit links for catalog files.

use folio_core::RefKind;

use super::content_source::EditUrl;

/// Picks the edit-URL template for one repository and ref kind.
///
/// Known hosts get a default template; unknown hosts and local repositories
/// get none unless the source gives one.
pub fn template_for(
    setting: &EditUrl,
    web_url: Option<&str>,
    host: Option<&str>,
    kind: RefKind,
) -> Option<String> {
    match setting {
        EditUrl::Disabled => None,
        EditUrl::Template(template) => Some(template.clone()),
        EditUrl::Default => {
            web_url?;
            let host = host?.to_ascii_lowercase();
            let template = if host.contains("bitbucket") {
                "{web_url}/src/{refname}/{path}"
            } else if host.contains("github") || host.contains("gitlab") {
                match kind {
                    RefKind::Branch => "{web_url}/edit/{refname}/{path}",
                    RefKind::Tag => "{web_url}/blob/{refname}/{path}",
                }
            } else {
                return None;
            };
            Some(template.to_string())
        },
    }
}

/// Fills the placeholders of an edit-URL template.
pub fn render(
    template: &str,
    web_url: Option<&str>,
    refname: &str,
    refhash: &str,
    path: &str,
) -> String {
    template
        .replace("{web_url}", web_url.unwrap_or_default())
        .replace("{refname}", refname)
        .replace("{refhash}", refhash)
        .replace("{path}", path)
}
