//! Compose file discovery paths.
//!
//! The loader and the `%H`/`%L`/`%S` include expansions consult three
//! sources: the `XCOMPOSEFILE` environment variable, the user's
//! `$HOME/.XCompose`, and the per-locale file under the X locale directory
//! (`XLOCALEDIR`, defaulting to `/usr/share/X11/locale`).
//!
//! All lookups go through an [`Environment`] value so embedders and tests
//! can override individual variables without touching the process
//! environment.

use std::path::PathBuf;

pub const DEFAULT_XLOCALEDIR: &str = "/usr/share/X11/locale";

/// A snapshot of the environment variables the engine consults.
///
/// [`Environment::from_process`] captures the real process environment;
/// the `with_*` builders override individual entries.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    home: Option<String>,
    xcomposefile: Option<String>,
    xlocaledir: Option<String>,
    lc_all: Option<String>,
    lc_ctype: Option<String>,
    lang: Option<String>,
}

fn getenv(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

impl Environment {
    /// An environment with nothing set.
    pub fn empty() -> Environment {
        Environment::default()
    }

    /// Capture the process environment.
    pub fn from_process() -> Environment {
        Environment {
            home: getenv("HOME"),
            xcomposefile: getenv("XCOMPOSEFILE"),
            xlocaledir: getenv("XLOCALEDIR"),
            lc_all: getenv("LC_ALL"),
            lc_ctype: getenv("LC_CTYPE"),
            lang: getenv("LANG"),
        }
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Environment {
        self.home = Some(home.into());
        self
    }

    pub fn with_xcomposefile(mut self, path: impl Into<String>) -> Environment {
        self.xcomposefile = Some(path.into());
        self
    }

    pub fn with_xlocaledir(mut self, dir: impl Into<String>) -> Environment {
        self.xlocaledir = Some(dir.into());
        self
    }

    pub fn with_locale_vars(
        mut self,
        lc_all: Option<String>,
        lc_ctype: Option<String>,
        lang: Option<String>,
    ) -> Environment {
        self.lc_all = lc_all;
        self.lc_ctype = lc_ctype;
        self.lang = lang;
        self
    }

    pub fn home(&self) -> Option<&str> {
        self.home.as_deref()
    }

    pub(crate) fn lc_all(&self) -> Option<&str> {
        self.lc_all.as_deref()
    }

    pub(crate) fn lc_ctype(&self) -> Option<&str> {
        self.lc_ctype.as_deref()
    }

    pub(crate) fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
}

/// Path named by `XCOMPOSEFILE`, if set.
pub fn xcomposefile_path(env: &Environment) -> Option<PathBuf> {
    env.xcomposefile.as_ref().map(PathBuf::from)
}

/// `$HOME/.XCompose`, if `HOME` is set.
pub fn home_xcompose_file_path(env: &Environment) -> Option<PathBuf> {
    env.home.as_ref().map(|h| PathBuf::from(h).join(".XCompose"))
}

/// The X locale directory (`XLOCALEDIR` or the system default).
pub fn xlocaledir_path(env: &Environment) -> PathBuf {
    match &env.xlocaledir {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(DEFAULT_XLOCALEDIR),
    }
}

/// The per-locale Compose file, `<xlocaledir>/<locale>/Compose`.
pub fn locale_compose_file_path(env: &Environment, locale: &str) -> Option<PathBuf> {
    if locale.is_empty() {
        return None;
    }
    Some(xlocaledir_path(env).join(locale).join("Compose"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment() {
        let env = Environment::empty();
        assert_eq!(xcomposefile_path(&env), None);
        assert_eq!(home_xcompose_file_path(&env), None);
        assert_eq!(xlocaledir_path(&env), PathBuf::from(DEFAULT_XLOCALEDIR));
    }

    #[test]
    fn overrides() {
        let env = Environment::empty()
            .with_home("/home/ran")
            .with_xlocaledir("/opt/X11/locale")
            .with_xcomposefile("/etc/Compose");
        assert_eq!(
            home_xcompose_file_path(&env),
            Some(PathBuf::from("/home/ran/.XCompose"))
        );
        assert_eq!(xcomposefile_path(&env), Some(PathBuf::from("/etc/Compose")));
        assert_eq!(
            locale_compose_file_path(&env, "en_US.UTF-8"),
            Some(PathBuf::from("/opt/X11/locale/en_US.UTF-8/Compose"))
        );
        assert_eq!(locale_compose_file_path(&env, ""), None);
    }
}
