use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_plugdoc")))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

const README: &str = r#"# three

Tabs, windows and projects.

<!-- TOC -->
<!-- /TOC -->

## Setup

```lua
require("three").setup({
})
```

## API

### Bufferline

<!-- bufferline API -->
<!-- /bufferline API -->

### Windows

<!-- windows API -->
<!-- /windows API -->

### Projects

<!-- projects API -->
<!-- /projects API -->
"#;

const INIT: &str = r#"local lazy = require("three.util").lazy

local M = {}

-- BUFFERLINE API
-- /BUFFERLINE API

-- WINDOWS API
-- /WINDOWS API

-- PROJECTS API
-- /PROJECTS API

M.setup = function(opts)
  require("three.config").apply(opts)
end

return M
"#;

const CONFIG: &str = r#"local M = {}

local default_config = {
  bufferline = {
    enabled = true,
  },
  windows = {
    winwidth = 34,
  },
}

return M
"#;

const TYPES: &str = r#"---@class three.NextOpts
---@field wrap? boolean Wrap around at the end
---@field count? integer How many buffers to move

---@alias three.Direction
---| "left" Move left
---| "right" Move right
"#;

const BUFFERLINE: &str = r#"local M = {}

---Move to the next buffer
---@param opts? three.NextOpts
---@return boolean moved
function M.next(opts)
end

---@param direction three.Direction
function M.move(direction)
end

---@private
function M.redraw()
end

return M
"#;

const WINDOWS: &str = r#"local M = {}

---Close a window, keeping the layout
---@param winid integer
---@note
---The last window is never closed
function M.close(winid)
end

return M
"#;

const PROJECTS: &str = r#"local M = {}

---Open a project in a new tab
---@param path string
---@example
---require("three").open_project("~/src")
function M.open_project(path)
end

local function helper()
end

return M
"#;

/// A plugin tree with all three API groups.
fn plugin() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "README.md", README);
    write(root, "lua/three/init.lua", INIT);
    write(root, "lua/three/config.lua", CONFIG);
    write(root, "lua/three/types.lua", TYPES);
    write(root, "lua/three/bufferline/state.lua", BUFFERLINE);
    write(root, "lua/three/windows/init.lua", WINDOWS);
    write(root, "lua/three/projects/init.lua", PROJECTS);
    dir
}

fn run(root: &Path) -> assert_cmd::assert::Assert {
    cmd().arg("--root").arg(root).assert()
}

#[test]
fn readme_is_regenerated() {
    let dir = plugin();
    run(dir.path()).success();

    let readme = read(dir.path(), "README.md");
    assert!(readme.contains(
        "require(\"three\").setup({\n  bufferline = {\n    enabled = true,\n  },\n  windows = {\n    winwidth = 34,\n  },\n})"
    ));
    assert!(readme.contains("<!-- bufferline API -->\n\n### next(opts)\n"));
    assert!(readme.contains("`next(opts?: three.NextOpts): boolean` \\\nMove to the next buffer"));
    assert!(readme.contains(">wrap"));
    assert!(readme.contains("### close(winid)"));
    assert!(readme.contains("### open_project(path)"));
    assert!(!readme.contains("redraw"));
    assert!(!readme.contains("helper"));
    assert!(readme.contains("<!-- TOC -->\n\n- [three](#three)\n"));
    assert!(readme.contains("  - [Setup](#setup)"));
    assert!(readme.contains("    - [open_project(path)](#open_projectpath)"));
}

#[test]
fn stubs_are_regenerated() {
    let dir = plugin();
    run(dir.path()).success();

    let init = read(dir.path(), "lua/three/init.lua");
    assert!(init.contains("M.next = lazy(\"bufferline.state\", \"next\")"));
    assert!(init.contains("M.move = lazy(\"bufferline.state\", \"move\")"));
    assert!(init.contains("M.close = lazy(\"windows\", \"close\")"));
    assert!(init.contains("M.open_project = lazy(\"projects\", \"open_project\")"));
    assert!(!init.contains("M.redraw"));
    assert!(init.contains("---@param opts? three.NextOpts"));
    // Hand-written code outside the markers is kept
    assert!(init.starts_with("local lazy = require(\"three.util\").lazy\n"));
    assert!(init.contains("M.setup = function(opts)"));
}

#[test]
fn vimdoc_is_written() {
    let dir = plugin();
    run(dir.path()).success();

    let help = read(dir.path(), "doc/three.txt");
    assert!(help.starts_with("*three.txt*\n"));
    assert!(help.contains("|three-options|"));
    assert!(help.contains("\n\n>\n    require(\"three\").setup({\n      bufferline = {\n"));
    assert!(help.contains("|three-bufferline-api|"));
    assert!(help.contains("*three.next*"));
    assert!(help.contains("*three.open_project*"));
    assert!(help.contains("    Examples: >lua\n        require(\"three\").open_project(\"~/src\")\n    <"));
    assert!(help.ends_with("vim:tw=80:ts=2:ft=help:norl:syntax=help:\n"));
}

#[test]
fn second_run_is_byte_identical() {
    let dir = plugin();
    run(dir.path()).success();
    let readme = read(dir.path(), "README.md");
    let init = read(dir.path(), "lua/three/init.lua");
    let help = read(dir.path(), "doc/three.txt");

    run(dir.path()).success();
    assert_eq!(read(dir.path(), "README.md"), readme);
    assert_eq!(read(dir.path(), "lua/three/init.lua"), init);
    assert_eq!(read(dir.path(), "doc/three.txt"), help);
}

#[test]
fn multi_line_example_survives_rerun() {
    let dir = plugin();
    write(
        dir.path(),
        "lua/three/windows/init.lua",
        r#"local M = {}

---Open a window
---@param opts table
---@example
--- require("three").open({
---   split = "right",
--- })
function M.open(opts)
end

return M
"#,
    );

    run(dir.path()).success();
    let readme = read(dir.path(), "README.md");
    assert!(readme.contains("```lua\nrequire(\"three\").open({\n  split = \"right\",\n})\n```"));

    run(dir.path()).success();
    assert_eq!(read(dir.path(), "README.md"), readme);
    cmd()
        .arg("--root")
        .arg(dir.path())
        .arg("--check")
        .assert()
        .success();
}

#[test]
fn check_reports_stale_files() {
    let dir = plugin();
    cmd()
        .arg("--root")
        .arg(dir.path())
        .arg("--check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("README.md"));
    assert_eq!(read(dir.path(), "README.md"), README);
    assert!(!dir.path().join("doc/three.txt").exists());

    run(dir.path()).success();
    cmd()
        .arg("--root")
        .arg(dir.path())
        .arg("--check")
        .assert()
        .success();
}

#[test]
fn crlf_readme_keeps_line_endings() {
    let dir = plugin();
    write(dir.path(), "README.md", &README.replace('\n', "\r\n"));
    run(dir.path()).success();

    let readme = read(dir.path(), "README.md");
    assert!(readme.contains("### next(opts)\r\n"));
    assert!(!readme.replace("\r\n", "").contains('\n'));
}

#[test]
fn missing_marker_fails() {
    let dir = plugin();
    write(
        dir.path(),
        "README.md",
        &README.replace("<!-- /windows API -->\n", ""),
    );
    run(dir.path())
        .failure()
        .stderr(predicate::str::contains("windows API"));
    // Nothing is written when a step fails
    assert_eq!(read(dir.path(), "lua/three/init.lua"), INIT);
}

#[test]
fn duplicate_marker_fails() {
    let dir = plugin();
    write(dir.path(), "README.md", &format!("{}\n<!-- TOC -->\n", README));
    run(dir.path())
        .failure()
        .stderr(predicate::str::contains("matches 2 lines"));
}

#[test]
fn unresolved_type_fails() {
    let dir = plugin();
    write(
        dir.path(),
        "lua/three/windows/init.lua",
        "local M = {}\n\n---@param layout three.Layout\nfunction M.restore(layout)\nend\n\nreturn M\n",
    );
    run(dir.path())
        .failure()
        .stderr(predicate::str::contains("three.Layout"));
}

#[test]
fn config_file_overrides_layout() {
    let dir = plugin();
    write(
        dir.path(),
        "plugdoc.toml",
        r#"
stub_annotations = false

[[groups]]
name = "windows"
source = "three/windows/init.lua"
module = "windows"
marker = "WINDOWS API"
"#,
    );
    run(dir.path()).success();

    let init = read(dir.path(), "lua/three/init.lua");
    assert!(init.contains("-- WINDOWS API\n\nM.close = lazy(\"windows\", \"close\")\n\n-- /WINDOWS API"));
    assert!(!init.contains("M.next"));
}

#[test]
fn unknown_config_key_fails() {
    let dir = plugin();
    write(dir.path(), "plugdoc.toml", "readme_path = \"x\"\n");
    run(dir.path())
        .failure()
        .stderr(predicate::str::contains("plugdoc.toml"));
}
