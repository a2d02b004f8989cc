use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("html-comment-remover").unwrap()
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn help_exits_zero() {
    bin()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--recursive"));
}

#[test]
fn strips_single_file_in_place() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.html");
    write(&page, "A<!--x-->B<!--[if IE]>C<![endif]--><!--x-->D");

    bin()
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Comments removed:    3"));
    assert_eq!(fs::read_to_string(&page).unwrap(), "ABD");
}

#[test]
fn scope_limits_removal() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.shtml");
    write(&page, r#"<!--#include file="x"-->Hello<!-- note -->"#);

    bin()
        .args(["-s", "server-directive"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("Comments kept:       1"));
    assert_eq!(fs::read_to_string(&page).unwrap(), "Hello<!-- note -->");
}

#[test]
fn all_flag_overrides_scope() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.html");
    write(&page, "<!-- a --><!--[if IE]>x<![endif]-->");

    bin()
        .args(["-a", "-s", "conditional"])
        .arg(&page)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&page).unwrap(), "");
}

#[test]
fn recursive_output_mirrors_tree_and_leaves_inputs() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("site");
    let out = dir.path().join("out");
    write(&site.join("a.txt"), "a<!-- 1 -->");
    write(&site.join("sub/b.txt"), "b<!-- 2 -->");

    bin()
        .arg("-r")
        .arg("-o")
        .arg(&out)
        .arg(&site)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed:           2"));

    assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "a");
    assert_eq!(fs::read_to_string(out.join("sub/b.txt")).unwrap(), "b");
    assert_eq!(fs::read_to_string(site.join("sub/b.txt")).unwrap(), "b<!-- 2 -->");
}

#[test]
fn non_recursive_reports_subdirectory_as_skipped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), "a<!-- 1 -->");
    write(&dir.path().join("sub/b.txt"), "b<!-- 2 -->");

    bin()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed:           1"))
        .stdout(predicate::str::contains("Skipped:             1"));
    assert_eq!(fs::read_to_string(dir.path().join("sub/b.txt")).unwrap(), "b<!-- 2 -->");
}

#[test]
fn exclusions_are_honored() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("keep.html"), "k<!-- 1 -->");
    write(&dir.path().join("skip.tpl"), "s<!-- 2 -->");

    bin()
        .args(["-e", ".tpl"])
        .arg(dir.path())
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dir.path().join("keep.html")).unwrap(), "k");
    assert_eq!(fs::read_to_string(dir.path().join("skip.tpl")).unwrap(), "s<!-- 2 -->");
}

#[test]
fn dry_run_diff_writes_nothing() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.html");
    write(&page, "<p>x</p>\n<!-- secret -->\n");

    bin()
        .args(["-n", "-d"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("-<!-- secret -->"))
        .stdout(predicate::str::contains("(dry run)"));
    assert_eq!(fs::read_to_string(&page).unwrap(), "<p>x</p>\n<!-- secret -->\n");
}

#[test]
fn missing_input_is_a_usage_error() {
    let dir = tempdir().unwrap();
    bin()
        .arg(dir.path().join("nope.html"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn unreadable_file_fails_the_run_but_not_the_others() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.html"), "a<!-- 1 -->");
    fs::write(dir.path().join("b.bin"), [0u8, 159, 146, 150]).unwrap();
    write(&dir.path().join("c.html"), "c<!-- 3 -->");

    bin()
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed:              1"));
    assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), "a");
    assert_eq!(fs::read_to_string(dir.path().join("c.html")).unwrap(), "c");
}

#[test]
fn roots_sharing_a_relative_path_do_not_overwrite_each_other() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    write(&dir.path().join("a/index.html"), "from-a<!-- 1 -->");
    write(&dir.path().join("b/index.html"), "from-b<!-- 2 -->");

    bin()
        .arg("-o")
        .arg(&out)
        .arg(dir.path().join("a"))
        .arg(dir.path().join("b"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Processed:           1"))
        .stdout(predicate::str::contains("Failed:              1"));
    assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "from-a");
}

#[test]
fn output_that_is_a_file_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let page = dir.path().join("p.html");
    write(&out, "");
    write(&page, "p<!-- 1 -->");

    bin()
        .arg("-o")
        .arg(&out)
        .arg(&page)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"))
        .stdout(predicate::str::contains("Summary").not());
    assert_eq!(fs::read_to_string(&page).unwrap(), "p<!-- 1 -->");
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_skipped_and_fails_the_run() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("good.html"), "g<!-- 1 -->");
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    bin()
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Processed:           1"))
        .stdout(predicate::str::contains("Skipped:             1"))
        .stdout(predicate::str::contains("Failed:              0"));
    assert_eq!(fs::read_to_string(dir.path().join("good.html")).unwrap(), "g");
}
