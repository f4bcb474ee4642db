//! Package name of the working directory, read from its Go sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::build_constraints::{BuildTarget, ConstraintError};

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("failed to read directory '{}': {source}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no Go files in '{}': use -p/--package <NAME>", dir.display())]
    NoSources { dir: PathBuf },

    #[error("{source} in '{}'", path.display())]
    BadConstraint {
        path: PathBuf,
        #[source]
        source: ConstraintError,
    },

    #[error("no package clause in '{}'", path.display())]
    MissingClause { path: PathBuf },

    #[error(
        "found packages {first} ({}) and {second} ({}) in '{}'",
        first_path.display(),
        second_path.display(),
        dir.display()
    )]
    Conflict {
        dir: PathBuf,
        first: String,
        first_path: PathBuf,
        second: String,
        second_path: PathBuf,
    },
}

/// Package shared by the non-test `.go` files in `dir` that build for the
/// current `GOOS`/`GOARCH`.
pub fn locate_package(dir: &Path) -> Result<String, PackageError> {
    locate_package_for(dir, &BuildTarget::from_env())
}

pub fn locate_package_for(dir: &Path, target: &BuildTarget) -> Result<String, PackageError> {
    let mut found: Option<(String, PathBuf)> = None;
    for path in go_sources(dir, target)? {
        let content = fs::read_to_string(&path).map_err(|source| PackageError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let admitted = target
            .admits_source(&content)
            .map_err(|source| PackageError::BadConstraint {
                path: path.clone(),
                source,
            })?;
        if !admitted {
            tracing::trace!(
                path = %path.display(),
                goos = target.goos(),
                goarch = target.goarch(),
                "excluded by build constraint"
            );
            continue;
        }
        let Some(name) = package_clause(&content) else {
            return Err(PackageError::MissingClause { path });
        };
        tracing::trace!(path = %path.display(), package = name, "package clause");

        if let Some((first, first_path)) = &found {
            if first != name {
                return Err(PackageError::Conflict {
                    dir: dir.to_path_buf(),
                    first: first.clone(),
                    first_path: first_path.clone(),
                    second: name.to_string(),
                    second_path: path,
                });
            }
        } else {
            found = Some((name.to_string(), path));
        }
    }

    found
        .map(|(name, _)| name)
        .ok_or_else(|| PackageError::NoSources {
            dir: dir.to_path_buf(),
        })
}

/// `.go` files whose names the Go tool would build, sorted by path.
fn go_sources(dir: &Path, target: &BuildTarget) -> Result<Vec<PathBuf>, PackageError> {
    let entries = fs::read_dir(dir).map_err(|source| PackageError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| is_package_source(name) && target.admits_file_name(name))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_package_source(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

/// Name from the first `package` clause, skipping leading comments.
pub fn package_clause(source: &str) -> Option<&str> {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/")?.1;
        } else {
            break;
        }
    }

    let rest = rest.strip_prefix("package")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '/') {
        return None;
    }
    let rest = skip_inline_space(rest)?;
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty() && !name.starts_with(|c: char| c.is_ascii_digit())).then_some(name)
}

/// Whitespace and `/* */` comments between `package` and its name.
fn skip_inline_space(mut rest: &str) -> Option<&str> {
    loop {
        rest = rest.trim_start();
        match rest.strip_prefix("/*") {
            Some(after) => rest = after.split_once("*/")?.1,
            None => return Some(rest),
        }
    }
}
