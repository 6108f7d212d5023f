//! Image reference templating.
//!
//! Templates such as `dhis2/core:{version}-latest-alpine` carry `{token}`
//! placeholders from a fixed set ([`ImageToken`]). Rendering is a single
//! left-to-right pass: known tokens with a value are replaced, everything
//! else (unknown tokens, known tokens without a value, stray braces) is
//! copied through verbatim.

use std::borrow::Cow;

/// Placeholder tokens understood by image and URL templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageToken {
    /// Release channel, rendered as a `-<channel>` suffix
    Channel,
    /// DHIS2 core version
    Version,
}

impl ImageToken {
    /// Parse the text between braces.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "channel" => Some(Self::Channel),
            "version" => Some(Self::Version),
            _ => None,
        }
    }
}

/// The stable channel contributes nothing to an image tag.
pub const STABLE_CHANNEL: &str = "stable";

/// Values available for substitution.
///
/// `channel` is always substituted: unset or [`STABLE_CHANNEL`] renders as an
/// empty string. `version` is substituted only when set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substitutions<'a> {
    /// Release channel
    pub channel: Option<&'a str>,
    /// DHIS2 core version
    pub version: Option<&'a str>,
}

impl<'a> Substitutions<'a> {
    /// Substitutions for a channel and version.
    #[must_use]
    pub const fn new(channel: Option<&'a str>, version: Option<&'a str>) -> Self {
        Self { channel, version }
    }

    fn value(&self, token: ImageToken) -> Option<Cow<'a, str>> {
        match token {
            ImageToken::Channel => match self.channel {
                None | Some(STABLE_CHANNEL) => Some(Cow::Borrowed("")),
                Some(channel) => Some(Cow::Owned(format!("-{channel}"))),
            },
            ImageToken::Version => self.version.map(Cow::Borrowed),
        }
    }
}

/// Replace every occurrence of each known token with its value.
fn substitute(template: &str, lookup: impl Fn(ImageToken) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        // Next brace of either kind decides whether this is a token
        match after.find(['{', '}']) {
            Some(end) if after.as_bytes()[end] == b'}' => {
                let name = &after[..end];
                match ImageToken::parse(name).and_then(&lookup) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            Some(end) => {
                out.push('{');
                out.push_str(&after[..end]);
                rest = &after[end..];
            }
            None => {
                out.push('{');
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render an image reference from a template.
///
/// A non-empty `variant` is appended as a `-<variant>` suffix after
/// substitution.
#[must_use]
pub fn render_image(template: &str, substitutions: &Substitutions<'_>, variant: Option<&str>) -> String {
    let mut image = substitute(template, |token| {
        substitutions.value(token).map(Cow::into_owned)
    });

    if let Some(variant) = variant.filter(|v| !v.is_empty()) {
        image.push('-');
        image.push_str(variant);
    }

    image
}

/// Replace `{version}` in a URL or path template.
#[must_use]
pub fn substitute_version(template: &str, version: &str) -> String {
    substitute(template, |token| match token {
        ImageToken::Version => Some(version.to_string()),
        ImageToken::Channel => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_TEMPLATE: &str = "dhis2/core:{version}-latest-alpine";

    #[test]
    fn test_stable_channel_contributes_nothing() {
        let subs = Substitutions::new(Some("stable"), Some("2.38"));
        assert_eq!(
            render_image(DEFAULT_TEMPLATE, &subs, None),
            "dhis2/core:2.38-latest-alpine"
        );
    }

    #[test]
    fn test_dev_channel_adds_suffix() {
        let subs = Substitutions::new(Some("dev"), Some("2.38"));
        assert_eq!(
            render_image("dhis2/core:{version}{channel}", &subs, None),
            "dhis2/core:2.38-dev"
        );
    }

    #[test]
    fn test_unset_channel_is_stripped() {
        let subs = Substitutions::new(None, Some("2.39"));
        assert_eq!(
            render_image("dhis2/core{channel}:{version}", &subs, None),
            "dhis2/core:2.39"
        );
    }

    #[test]
    fn test_variant_suffix() {
        let subs = Substitutions::new(None, Some("2.38"));
        assert_eq!(
            render_image("dhis2/core:{version}", &subs, Some("jdk11")),
            "dhis2/core:2.38-jdk11"
        );
        assert_eq!(
            render_image("dhis2/core:{version}", &subs, Some("")),
            "dhis2/core:2.38"
        );
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let subs = Substitutions::new(Some("canary"), Some("2.40"));
        assert_eq!(
            render_image("{version}/{version}{channel}{channel}", &subs, None),
            "2.40/2.40-canary-canary"
        );
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let subs = Substitutions::new(None, Some("2.38"));
        assert_eq!(
            render_image("registry/{org}/core:{version}-{arch}", &subs, None),
            "registry/{org}/core:2.38-{arch}"
        );
    }

    #[test]
    fn test_missing_version_left_literal() {
        let subs = Substitutions::new(Some("stable"), None);
        assert_eq!(
            render_image(DEFAULT_TEMPLATE, &subs, None),
            "dhis2/core:{version}-latest-alpine"
        );
    }

    #[test]
    fn test_no_tokens_unchanged() {
        let subs = Substitutions::new(Some("dev"), Some("2.38"));
        assert_eq!(render_image("nginx:latest", &subs, None), "nginx:latest");
    }

    #[test]
    fn test_stray_braces() {
        let subs = Substitutions::new(None, Some("2.38"));
        assert_eq!(render_image("a{b{version}", &subs, None), "a{b2.38");
        assert_eq!(render_image("a{version", &subs, None), "a{version");
        assert_eq!(render_image("a}{version}", &subs, None), "a}2.38");
    }

    #[test]
    fn test_substitute_version_leaves_channel() {
        assert_eq!(
            substitute_version(
                "https://github.com/dhis2/dhis2-demo-db/blob/master/sierra-leone/{version}/dhis2-db-sierra-leone.sql.gz?raw=true",
                "2.38"
            ),
            "https://github.com/dhis2/dhis2-demo-db/blob/master/sierra-leone/2.38/dhis2-db-sierra-leone.sql.gz?raw=true"
        );
        assert_eq!(substitute_version("{channel}-{version}", "1"), "{channel}-1");
    }
}
