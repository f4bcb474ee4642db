//! Go build constraints: which `.go` files the toolchain would compile for a
//! target, judged by file name suffixes and `//go:build` / `// +build` lines.

use std::env;

/// Operating systems Go recognizes in `_<goos>` file name suffixes.
const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Architectures Go recognizes in `_<goarch>` file name suffixes.
const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Systems satisfying the `unix` tag.
const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed build constraint `//go:build {expr}`")]
pub struct ConstraintError {
    pub expr: String,
}

/// The GOOS/GOARCH pair files are selected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    goos: String,
    goarch: String,
    cgo: bool,
}

impl BuildTarget {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            cgo: false,
        }
    }

    pub fn cgo(mut self, enabled: bool) -> Self {
        self.cgo = enabled;
        self
    }

    /// `GOOS`/`GOARCH`/`CGO_ENABLED` when set, else the host.
    pub fn from_env() -> Self {
        let goos = env::var("GOOS").unwrap_or_else(|_| host_os().to_string());
        let goarch = env::var("GOARCH").unwrap_or_else(|_| host_arch().to_string());
        let cgo = env::var("CGO_ENABLED").map_or(true, |v| v != "0");
        Self::new(goos, goarch).cgo(cgo)
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    /// File name check: `x_linux.go`, `x_arm64.go`, `x_linux_arm64_test.go`.
    /// The first `_` element never counts, so `linux.go` is unconstrained.
    pub fn admits_file_name(&self, name: &str) -> bool {
        let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let Some((_, tail)) = stem.split_once('_') else {
            return true;
        };

        let parts: Vec<&str> = tail.split('_').collect();
        let last = parts[parts.len() - 1];
        if let [.., os, arch] = parts.as_slice()
            && KNOWN_OS.contains(os)
            && KNOWN_ARCH.contains(arch)
        {
            return self.has_tag(os) && self.has_tag(arch);
        }
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return self.has_tag(last);
        }
        true
    }

    /// Header check. A `//go:build` line wins over `// +build` lines, which
    /// must all hold.
    pub fn admits_source(&self, source: &str) -> Result<bool, ConstraintError> {
        let comments = header_comments(source);

        if let Some(expr) = comments.iter().find_map(|c| go_build_expr(c)) {
            return ExprParser::new(self, expr).parse().ok_or_else(|| ConstraintError {
                expr: expr.to_string(),
            });
        }

        Ok(comments
            .iter()
            .filter_map(|c| plus_build_words(c))
            .all(|words| self.plus_build(words)))
    }

    fn has_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            "gc" => true,
            "cgo" => self.cgo,
            _ => is_release_tag(tag),
        }
    }

    /// Space-separated options, any of which may hold; each option is
    /// comma-separated terms that must all hold.
    fn plus_build(&self, words: &str) -> bool {
        let mut words = words.split_whitespace().peekable();
        if words.peek().is_none() {
            return true;
        }
        words.any(|word| word.split(',').all(|term| self.plus_build_term(term)))
    }

    fn plus_build_term(&self, term: &str) -> bool {
        let (negated, tag) = match term.strip_prefix('!') {
            Some(tag) => (true, tag),
            None => (false, term),
        };
        if !is_tag(tag) {
            return false;
        }
        self.has_tag(tag) != negated
    }
}

/// `go1.N` tags hold for every release.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn is_tag(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Text of the `//` comments before the package clause.
fn header_comments(source: &str) -> Vec<&str> {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut comments = Vec::new();
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            let (line, tail) = after.split_once('\n').unwrap_or((after, ""));
            comments.push(line.trim_end_matches('\r'));
            rest = tail;
        } else if let Some(after) = rest.strip_prefix("/*") {
            let Some((_, tail)) = after.split_once("*/") else {
                break;
            };
            rest = tail;
        } else {
            break;
        }
    }
    comments
}

fn go_build_expr(comment: &str) -> Option<&str> {
    let rest = comment.strip_prefix("go:build")?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn plus_build_words(comment: &str) -> Option<&str> {
    let rest = comment.trim_start().strip_prefix("+build")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Not,
    And,
    Or,
    Open,
    Close,
    Tag(&'a str),
}

/// Evaluates a `//go:build` expression while parsing it.
struct ExprParser<'t, 'a> {
    target: &'t BuildTarget,
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'t, 'a> ExprParser<'t, 'a> {
    fn new(target: &'t BuildTarget, source: &'a str) -> Self {
        Self {
            target,
            source,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<bool> {
        self.tokens = tokenize(self.source)?;
        let value = self.or()?;
        (self.pos == self.tokens.len()).then_some(value)
    }

    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.eat(Token::Or) {
            value |= self.and()?;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.not()?;
        while self.eat(Token::And) {
            value &= self.not()?;
        }
        Some(value)
    }

    fn not(&mut self) -> Option<bool> {
        if self.eat(Token::Not) {
            return self.not().map(|v| !v);
        }
        if self.eat(Token::Open) {
            let value = self.or()?;
            return self.eat(Token::Close).then_some(value);
        }
        match self.tokens.get(self.pos) {
            Some(&Token::Tag(tag)) => {
                self.pos += 1;
                Some(self.target.has_tag(tag))
            }
            _ => None,
        }
    }

    fn eat(&mut self, token: Token<'a>) -> bool {
        let hit = self.tokens.get(self.pos) == Some(&token);
        if hit {
            self.pos += 1;
        }
        hit
    }
}

fn tokenize(source: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        rest = rest.trim_start();
        let Some(c) = rest.chars().next() else {
            return Some(tokens);
        };
        let (token, len) = match c {
            '!' => (Token::Not, 1),
            '(' => (Token::Open, 1),
            ')' => (Token::Close, 1),
            '&' if rest.starts_with("&&") => (Token::And, 2),
            '|' if rest.starts_with("||") => (Token::Or, 2),
            _ => {
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                if len == 0 {
                    return None;
                }
                (Token::Tag(&rest[..len]), len)
            }
        };
        tokens.push(token);
        rest = &rest[len..];
    }
}

fn host_os() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}

fn host_arch() -> &'static str {
    let little = cfg!(target_endian = "little");
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "wasm32" => "wasm",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        arch => arch,
    }
}
