//! Locating and reading template files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::CliError;

/// Directory under the root holding `<kind>.tmpl` files.
pub const TEMPLATES_DIR: &str = "templates";
pub const TEMPLATE_EXT: &str = "tmpl";

/// Checkout location inside a GOPATH workspace.
const GOPATH_CHECKOUT: &str = "src/github.com/pierremarc/futil";

/// Template root: explicit flag (or `FUTIL_ROOT`), then a GOPATH checkout
/// that has a templates directory, then the working directory.
pub fn resolve_root(explicit: Option<&Path>, gopath: Option<&OsStr>, work_dir: &Path) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }

    if let Some(gopath) = gopath
        && let Some(checkout) = std::env::split_paths(gopath)
            .map(|p| p.join(GOPATH_CHECKOUT))
            .find(|p| p.join(TEMPLATES_DIR).is_dir())
    {
        return checkout;
    }

    work_dir.to_path_buf()
}

pub fn template_path(root: &Path, kind: &str) -> PathBuf {
    root.join(TEMPLATES_DIR).join(format!("{kind}.{TEMPLATE_EXT}"))
}

/// Read a template. When `kind` is given and the file is missing, the error
/// carries the closest kind available next to it.
pub fn load_template(path: &Path, kind: Option<&str>) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| {
        let suggestion = kind.and_then(|kind| {
            let dir = path.parent()?;
            suggest_kind(kind, &available_kinds(dir))
        });
        CliError::TemplateRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
            suggestion,
        }
    })
}

/// Kinds with a template file in `dir`, sorted.
pub fn available_kinds(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut kinds: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_EXT))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    kinds.sort();
    kinds
}

/// Suggest a similar kind for typos.
pub fn suggest_kind(input: &str, kinds: &[String]) -> Option<String> {
    let input_lower = input.to_lowercase();
    kinds
        .iter()
        .filter(|kind| levenshtein(kind, &input_lower) <= 2)
        .min_by_key(|kind| levenshtein(kind, &input_lower))
        .cloned()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if a_chars.is_empty() {
        return n;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
