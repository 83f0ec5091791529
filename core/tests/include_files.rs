// Include handling: recursive parsing, %-expansions against an explicit
// environment, the depth guard, and the from_locale search order. Files are
// staged under a per-test directory in the system temp dir.

use std::fs;
use std::path::PathBuf;

use libcompose_core::{
    CompileFlags, ComposeError, ComposeTable, Environment, Format, Keysym,
};

struct TestDir {
    root: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> TestDir {
        let root = std::env::temp_dir().join(format!(
            "libcompose_test_{}_{}",
            tag,
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("create test dir");
        TestDir { root }
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write test file");
        path
    }

    fn path(&self) -> &str {
        self.root.to_str().expect("utf-8 temp path")
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn has_sequence(table: &ComposeTable, names: &[&str], utf8: &str) -> bool {
    let wanted: Vec<Keysym> = names
        .iter()
        .map(|n| Keysym::from_name(n).expect("known keysym"))
        .collect();
    table
        .sequences()
        .any(|entry| entry.keysyms == wanted && entry.utf8 == Some(utf8))
}

#[test]
fn include_by_absolute_path() {
    let dir = TestDir::new("abs_include");
    let included = dir.write("fragment", "<a> <b> : \"inner\"\n");

    let source = format!(
        "include \"{}\"\n\
         <x> <y> : \"outer\"\n",
        included.display()
    );
    let table = ComposeTable::from_buffer_with_env(
        &Environment::empty(),
        &source,
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a", "b"], "inner"));
    assert!(has_sequence(&table, &["x", "y"], "outer"));
}

#[test]
fn include_with_home_expansion() {
    let dir = TestDir::new("home_include");
    dir.write("frag", "<a> : \"home\"\n");

    let env = Environment::empty().with_home(dir.path());
    let table = ComposeTable::from_buffer_with_env(
        &env,
        "include \"%H/frag\"\n",
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a"], "home"));
}

#[test]
fn include_with_locale_expansion() {
    let dir = TestDir::new("locale_include");
    dir.write("tt_TT.UTF-8/Compose", "<a> : \"locale\"\n");

    let env = Environment::empty().with_xlocaledir(dir.path());
    let table = ComposeTable::from_buffer_with_env(
        &env,
        "include \"%L\"\n",
        "tt_TT.UTF-8",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a"], "locale"));
}

#[test]
fn include_with_system_dir_expansion() {
    let dir = TestDir::new("system_include");
    dir.write("extra/Compose", "<a> : \"system\"\n");

    let env = Environment::empty().with_xlocaledir(dir.path());
    let table = ComposeTable::from_buffer_with_env(
        &env,
        "include \"%S/extra/Compose\"\n",
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a"], "system"));
}

#[test]
fn nested_includes() {
    let dir = TestDir::new("nested_include");
    let inner = dir.write("inner", "<a> : \"deepest\"\n");
    let middle = dir.write(
        "middle",
        &format!("include \"{}\"\n<b> : \"middle\"\n", inner.display()),
    );

    let source = format!("include \"{}\"\n", middle.display());
    let table = ComposeTable::from_buffer_with_env(
        &Environment::empty(),
        &source,
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a"], "deepest"));
    assert!(has_sequence(&table, &["b"], "middle"));
}

#[test]
fn include_loop_fails_the_parse() {
    let dir = TestDir::new("include_loop");
    let path = dir.root.join("loop");
    fs::write(&path, format!("include \"{}\"\n", path.display())).unwrap();

    let source = format!("include \"{}\"\n", path.display());
    let err = ComposeTable::from_buffer_with_env(
        &Environment::empty(),
        &source,
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap_err();

    assert!(matches!(err, ComposeError::Parse(_)));
}

#[test]
fn missing_include_file_fails_the_parse() {
    let dir = TestDir::new("missing_include");
    let source = format!("include \"{}/does-not-exist\"\n", dir.path());

    let err = ComposeTable::from_buffer_with_env(
        &Environment::empty(),
        &source,
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap_err();

    assert!(matches!(err, ComposeError::Parse(_)));
}

#[test]
fn bad_percent_expansion_is_line_local() {
    // An unknown % escape spoils only the include line; the file goes on.
    let table = ComposeTable::from_buffer_with_env(
        &Environment::empty(),
        "include \"%Q/whatever\"\n\
         <a> : \"still here\"\n",
        "C",
        Format::TextV1,
        CompileFlags::NONE,
    )
    .unwrap();

    assert!(has_sequence(&table, &["a"], "still here"));
}

#[test]
fn from_locale_prefers_xcomposefile() {
    let dir = TestDir::new("search_xcomposefile");
    let custom = dir.write("custom", "<a> : \"custom\"\n");
    dir.write("home/.XCompose", "<a> : \"home\"\n");
    dir.write("locale/uu_UU.UTF-8/Compose", "<a> : \"locale\"\n");

    let env = Environment::empty()
        .with_xcomposefile(custom.to_str().unwrap())
        .with_home(dir.root.join("home").to_str().unwrap())
        .with_xlocaledir(dir.root.join("locale").to_str().unwrap());

    let table =
        ComposeTable::from_locale_with_env(&env, "uu_UU.UTF-8", CompileFlags::NONE).unwrap();
    assert!(has_sequence(&table, &["a"], "custom"));
    assert_eq!(table.locale(), "uu_UU.UTF-8");
}

#[test]
fn from_locale_falls_back_to_home_xcompose() {
    let dir = TestDir::new("search_home");
    dir.write("home/.XCompose", "<a> : \"home\"\n");
    dir.write("locale/uu_UU.UTF-8/Compose", "<a> : \"locale\"\n");

    let env = Environment::empty()
        .with_home(dir.root.join("home").to_str().unwrap())
        .with_xlocaledir(dir.root.join("locale").to_str().unwrap());

    let table =
        ComposeTable::from_locale_with_env(&env, "uu_UU.UTF-8", CompileFlags::NONE).unwrap();
    assert!(has_sequence(&table, &["a"], "home"));
}

#[test]
fn from_locale_falls_back_to_locale_file() {
    let dir = TestDir::new("search_locale");
    dir.write("locale/uu_UU.UTF-8/Compose", "<a> : \"locale\"\n");

    let env = Environment::empty()
        .with_xlocaledir(dir.root.join("locale").to_str().unwrap());

    let table =
        ComposeTable::from_locale_with_env(&env, "uu_UU.UTF-8", CompileFlags::NONE).unwrap();
    assert!(has_sequence(&table, &["a"], "locale"));
}

#[test]
fn from_locale_with_no_file_anywhere_fails() {
    let dir = TestDir::new("search_nothing");
    let env = Environment::empty()
        .with_xlocaledir(dir.root.join("locale").to_str().unwrap());

    let err = ComposeTable::from_locale_with_env(&env, "uu_UU.UTF-8", CompileFlags::NONE)
        .unwrap_err();
    assert!(matches!(err, ComposeError::NoComposeFile(locale) if locale == "uu_UU.UTF-8"));
}
