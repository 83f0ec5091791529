//! Locale name resolution.

use crate::paths::Environment;

/// Canonicalise a locale name.
///
/// An explicit name wins. An empty name falls back to the `LC_ALL`,
/// `LC_CTYPE` and `LANG` environment variables in that order, and finally to
/// `"C"`. A handful of aliases are folded to their base form.
pub fn resolve_locale(env: &Environment, locale: &str) -> String {
    let name = if !locale.is_empty() {
        locale
    } else {
        env.lc_all()
            .or_else(|| env.lc_ctype())
            .or_else(|| env.lang())
            .unwrap_or("C")
    };

    match name {
        "POSIX" => "C".to_string(),
        other => other.to_string(),
    }
}
