//! Classification of content paths into modules and families.
//!
//! Paths are relative to a component's start path. The standard layout is
//!
//! ```text
//! antora.yml
//! modules/<module>/pages/**          -> page
//! modules/<module>/pages/_partials/** -> partial
//! modules/<module>/partials/**       -> partial
//! modules/<module>/images/**         -> image       (also assets/images)
//! modules/<module>/attachments/**    -> attachment  (also assets/attachments)
//! modules/<module>/examples/**       -> example
//! ```
//!
//! Family folders placed directly below the start path belong to the `ROOT`
//! module. Files listed as nav files in the descriptor are family `nav`
//! wherever they live.

use crate::types::{Family, ROOT_MODULE};

/// File name of the component descriptor.
pub const DESCRIPTOR_FILENAME: &str = "antora.yml";

/// Where a path sits in the content layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A catalog file.
    File {
        module: String,
        family: Family,
        /// Path relative to the family folder (or to the module folder for nav files).
        relative: String,
    },
    /// The component descriptor itself.
    Descriptor,
    /// Hidden, backup or out-of-layout path.
    Ignored,
}

/// Classifies a path relative to the start path.
///
/// `nav` holds the nav file paths declared by the descriptor.
pub fn classify(path: &str, nav: &[String]) -> Placement {
    if path == DESCRIPTOR_FILENAME {
        return Placement::Descriptor;
    }

    let segments: Vec<&str> = path.split('/').collect();
    if path.ends_with('~')
        || segments
            .iter()
            .any(|segment| segment.is_empty() || segment.starts_with('.'))
    {
        return Placement::Ignored;
    }

    let (module, rest) = match segments.as_slice() {
        ["modules", module, rest @ ..] if !rest.is_empty() => (*module, rest),
        _ => (ROOT_MODULE, segments.as_slice()),
    };

    if nav.iter().any(|declared| declared == path) {
        return Placement::File {
            module: module.to_string(),
            family: Family::Nav,
            relative: rest.join("/"),
        };
    }

    let (family, relative) = match rest {
        ["pages", "_partials", relative @ ..] => (Family::Partial, relative),
        ["pages", relative @ ..] => (Family::Page, relative),
        ["partials", relative @ ..] => (Family::Partial, relative),
        ["images", relative @ ..] | ["assets", "images", relative @ ..] => {
            (Family::Image, relative)
        },
        ["attachments", relative @ ..] | ["assets", "attachments", relative @ ..] => {
            (Family::Attachment, relative)
        },
        ["examples", relative @ ..] => (Family::Example, relative),
        _ => return Placement::Ignored,
    };

    if relative.is_empty() {
        return Placement::Ignored;
    }

    Placement::File {
        module: module.to_string(),
        family,
        relative: relative.join("/"),
    }
}

/// Reads the `page-aliases` attribute from the header of an AsciiDoc page.
///
/// The header ends at the first blank line after any content. Line comments
/// are skipped and a trailing ` \` continues the value on the next line.
pub fn page_aliases(contents: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(contents);
    let mut lines = text.lines();
    let mut seen_content = false;

    while let Some(line) = lines.next() {
        let line = line.trim_end();
        if line.is_empty() {
            if seen_content {
                break;
            }
            continue;
        }
        seen_content = true;

        if line.starts_with("//") {
            continue;
        }

        let Some(value) = line.strip_prefix(":page-aliases:") else {
            continue;
        };

        let mut value = value.trim().to_string();
        while let Some(stripped) = value.strip_suffix(" \\") {
            value = stripped.to_string();
            match lines.next() {
                Some(next) => {
                    value.push(' ');
                    value.push_str(next.trim());
                },
                None => break,
            }
        }

        return value
            .split(',')
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(String::from)
            .collect();
    }

    Vec::new()
}
