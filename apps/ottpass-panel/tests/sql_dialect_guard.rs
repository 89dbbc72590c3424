//! Guards against non-Postgres SQL sneaking into query literals, both in
//! this crate and in the shared db library.

use std::fs;
use std::path::{Path, PathBuf};

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

/// Pull the first string literal (plain or raw) following each
/// `sqlx::query` call site, together with its 1-based line number.
fn sql_literals(content: &str) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    let bytes = content.as_bytes();
    let mut pos = 0usize;

    while let Some(rel) = content[pos..].find("sqlx::query") {
        let call = pos + rel;
        pos = call + "sqlx::query".len();

        let Some(paren_rel) = content[call..].find('(') else {
            continue;
        };
        let mut i = call + paren_rel + 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            continue;
        }

        let line = content[..call].bytes().filter(|b| *b == b'\n').count() + 1;

        if bytes[i] == b'r' {
            let mut hashes = 0usize;
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] == b'#' {
                hashes += 1;
                j += 1;
            }
            if j >= bytes.len() || bytes[j] != b'"' {
                continue;
            }
            let body_start = j + 1;
            let closer = format!("\"{}", "#".repeat(hashes));
            if let Some(end_rel) = content[body_start..].find(&closer) {
                found.push((line, content[body_start..body_start + end_rel].to_string()));
            }
        } else if bytes[i] == b'"' {
            let body_start = i + 1;
            let mut j = body_start;
            let mut escaped = false;
            while j < bytes.len() {
                match bytes[j] {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => {
                        found.push((line, content[body_start..j].to_string()));
                        break;
                    }
                    _ => {}
                }
                j += 1;
            }
        }
    }

    found
}

fn dialect_violation(sql: &str) -> Option<&'static str> {
    if sql.contains('?') {
        return Some("'?' placeholder (use $N)");
    }
    let lower = sql.to_lowercase();
    if lower.contains("insert or ignore") {
        return Some("INSERT OR IGNORE (use ON CONFLICT)");
    }
    if lower.contains("autoincrement") {
        return Some("AUTOINCREMENT (use BIGSERIAL)");
    }
    if lower.contains("strftime(") || lower.contains("datetime(") {
        return Some("SQLite datetime function");
    }
    if sql.contains('`') {
        return Some("backtick-quoted identifier");
    }
    None
}

#[test]
fn query_literals_stay_postgres_only() {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    let roots = [
        manifest.join("src"),
        manifest.join("../../libs/ottpass-db/src"),
    ];

    let mut files = Vec::new();
    for root in &roots {
        rust_sources(root, &mut files);
    }
    assert!(!files.is_empty(), "no sources found to scan");

    let mut violations = Vec::new();
    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        for (line, sql) in sql_literals(&content) {
            if let Some(reason) = dialect_violation(&sql) {
                violations.push(format!("{}:{}: {}", file.display(), line, reason));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found non-Postgres SQL in query literals:\n{}",
        violations.join("\n")
    );
}
