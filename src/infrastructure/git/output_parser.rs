//! Translation of git's diagnostic text into [`OperationOutcome`] / [`OperationError`].
//!
//! Everything in here depends on the exact wording git prints, which varies
//! across versions and locales. The runner pins `LC_ALL=C` so the English
//! markers below apply; keep every string match inside this module.

use crate::domain::entities::{OperationError, OperationOutcome};
use crate::domain::value_objects::CloneUrl;
use crate::infrastructure::process::ExecutionResult;
use regex::Regex;
use std::sync::OnceLock;

const ALREADY_EXISTS_MARKER: &str = "already exists and is not an empty directory";
const HOST_VERIFICATION_MARKER: &str = "Host key verification failed";
const AUTH_MARKERS: &[&str] = &[
    "Permission denied (publickey",
    "Authentication failed",
    "could not read Username",
    "terminal prompts disabled",
    "Repository not found",
];
const NOTHING_TO_COMMIT_MARKERS: &[&str] = &[
    "On branch",
    "HEAD detached",
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];
const UP_TO_DATE_MARKERS: &[&str] = &["Already up to date", "Already up-to-date"];
const PUSH_NOOP_MARKER: &str = "Everything up-to-date";
const PUSH_REJECTED_MARKER: &str = "[rejected]";

fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:https?://|ssh://|git@)(?:[^@/\s]+@)?([A-Za-z0-9][A-Za-z0-9.-]*)")
            .expect("host pattern is valid")
    })
}

/// Interpret `git clone <url> <dir>`.
pub fn parse_clone(
    result: &ExecutionResult,
    url: &str,
) -> Result<OperationOutcome, OperationError> {
    if result.success {
        return Ok(OperationOutcome::Cloned);
    }
    if result.stderr.contains(ALREADY_EXISTS_MARKER) {
        return Ok(OperationOutcome::AlreadyExists);
    }
    Err(normalize_failure(result, Some(url)))
}

/// Interpret `git status --porcelain -b`.
pub fn parse_status(result: &ExecutionResult) -> Result<OperationOutcome, OperationError> {
    if !result.success {
        return Err(normalize_failure(result, None));
    }

    let mut branch = String::from("HEAD");
    let mut changes = Vec::new();

    for line in result.stdout.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            branch = parse_branch_header(header);
        } else if !line.trim().is_empty() {
            changes.push(line.trim_end().to_string());
        }
    }

    Ok(OperationOutcome::Status { branch, changes })
}

fn parse_branch_header(header: &str) -> String {
    let header = header
        .strip_prefix("No commits yet on ")
        .or_else(|| header.strip_prefix("Initial commit on "))
        .unwrap_or(header);

    // "HEAD (no branch)" and "main...origin/main [ahead 1]"
    let local = header.split("...").next().unwrap_or(header);
    local
        .split_whitespace()
        .next()
        .unwrap_or("HEAD")
        .to_string()
}

/// Interpret the `git add -A` half of a commit. `None` means staging succeeded.
pub fn check_staging(result: &ExecutionResult) -> Option<OperationError> {
    if result.success {
        return None;
    }
    Some(OperationError::StagingFailed {
        exit_code: result.exit_code,
        message: first_meaningful_line(result)
            .unwrap_or_else(|| "git add produced no output".to_string()),
    })
}

/// Interpret `git commit -m <message>`.
pub fn parse_commit(result: &ExecutionResult) -> Result<OperationOutcome, OperationError> {
    let summary = result
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    if NOTHING_TO_COMMIT_MARKERS
        .iter()
        .any(|marker| summary.starts_with(marker))
    {
        return Ok(OperationOutcome::NothingToCommit);
    }
    if result.success {
        return Ok(OperationOutcome::Committed {
            summary: summary.to_string(),
        });
    }
    Err(normalize_failure(result, None))
}

/// Interpret `git pull`.
pub fn parse_pull(
    result: &ExecutionResult,
    remote_url: Option<&str>,
) -> Result<OperationOutcome, OperationError> {
    if result.success
        && UP_TO_DATE_MARKERS
            .iter()
            .any(|marker| result.stdout.contains(marker))
    {
        return Ok(OperationOutcome::UpToDate);
    }
    if result.success {
        return Ok(OperationOutcome::Pulled);
    }
    Err(normalize_failure(result, remote_url))
}

/// Interpret `git push`.
pub fn parse_push(
    result: &ExecutionResult,
    remote_url: Option<&str>,
) -> Result<OperationOutcome, OperationError> {
    if result.stderr.contains(PUSH_NOOP_MARKER) || result.stdout.contains(PUSH_NOOP_MARKER) {
        return Ok(OperationOutcome::NoOp);
    }

    if result.success {
        let summary = result
            .stderr
            .lines()
            .chain(result.stdout.lines())
            .find(|line| line.contains("->"))
            .map(collapse_whitespace)
            .unwrap_or_else(|| "pushed".to_string());
        return Ok(OperationOutcome::Pushed { summary });
    }

    if result.stderr.contains(PUSH_REJECTED_MARKER) {
        return Err(OperationError::Failed {
            message: "Push rejected because the remote has work you do not have locally. Pull first"
                .to_string(),
        });
    }
    Err(normalize_failure(result, remote_url))
}

/// Interpret `git diff`, rooting every path under `repo_name`.
pub fn parse_diff(
    result: &ExecutionResult,
    repo_name: &str,
) -> Result<OperationOutcome, OperationError> {
    if !result.success {
        return Err(normalize_failure(result, None));
    }
    Ok(OperationOutcome::Diff {
        patch: reroot_diff(&result.stdout, repo_name),
    })
}

/// Rewrite `a/`, `b/` path prefixes of a unified git diff to `a/<repo>/`, `b/<repo>/`.
///
/// Only file headers are touched; hunk bodies pass through unchanged even
/// when a removed line happens to look like a header.
pub fn reroot_diff(patch: &str, repo_name: &str) -> String {
    let mut out = String::with_capacity(patch.len() + patch.len() / 8);
    let mut in_header = false;

    for line in patch.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };

        if let Some(rest) = body.strip_prefix("diff --git ") {
            in_header = true;
            out.push_str("diff --git ");
            out.push_str(&reroot_git_header_paths(rest, repo_name));
        } else if in_header && body.starts_with("@@") {
            in_header = false;
            out.push_str(body);
        } else if in_header {
            out.push_str(&reroot_header_line(body, repo_name));
        } else {
            out.push_str(body);
        }
        out.push_str(newline);
    }

    out
}

fn reroot_git_header_paths(paths: &str, repo_name: &str) -> String {
    let Some((old, new)) = split_header_paths(paths) else {
        return paths.to_string();
    };
    match (reroot_path(old, "a/", repo_name), reroot_path(new, "b/", repo_name)) {
        (Some(old), Some(new)) => format!("{old} {new}"),
        _ => paths.to_string(),
    }
}

/// Split `<old> <new>` of a `diff --git` header, either side possibly C-quoted.
fn split_header_paths(paths: &str) -> Option<(&str, &str)> {
    if paths.starts_with('"') {
        let end = closing_quote(paths)?;
        let new = paths[end + 1..].strip_prefix(' ')?;
        return Some((&paths[..=end], new));
    }
    let split = paths.find(" \"b/").or_else(|| paths.find(" b/"))?;
    Some((&paths[..split], &paths[split + 1..]))
}

/// Byte index of the quote closing the string opened at index 0
fn closing_quote(quoted: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in quoted.char_indices().skip(1) {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(index),
            _ => {}
        }
    }
    None
}

/// Insert `<repo>/` after `prefix`, inside the quotes when git quoted the path
fn reroot_path(path: &str, prefix: &str, repo_name: &str) -> Option<String> {
    if let Some(rest) = path.strip_prefix('"').and_then(|p| p.strip_prefix(prefix)) {
        return Some(format!("\"{prefix}{repo_name}/{rest}"));
    }
    path.strip_prefix(prefix)
        .map(|rest| format!("{prefix}{repo_name}/{rest}"))
}

fn reroot_header_line(line: &str, repo_name: &str) -> String {
    for (marker, prefix) in [("--- ", "a/"), ("+++ ", "b/")] {
        if let Some(path) = line.strip_prefix(marker) {
            return match reroot_path(path, prefix, repo_name) {
                Some(path) => format!("{marker}{path}"),
                None => line.to_string(),
            };
        }
    }
    for marker in ["rename from ", "rename to ", "copy from ", "copy to "] {
        if let Some(path) = line.strip_prefix(marker) {
            return match path.strip_prefix('"') {
                Some(rest) => format!("{marker}\"{repo_name}/{rest}"),
                None => format!("{marker}{repo_name}/{path}"),
            };
        }
    }
    line.to_string()
}

/// Rewrite a failed invocation into a short, actionable error.
pub fn normalize_failure(result: &ExecutionResult, remote_url: Option<&str>) -> OperationError {
    let text = format!("{}\n{}", result.stderr, result.stdout);

    if text.contains(HOST_VERIFICATION_MARKER) {
        return OperationError::HostVerification {
            host: detect_host(&text, remote_url),
        };
    }
    if AUTH_MARKERS.iter().any(|marker| text.contains(marker)) {
        return OperationError::Auth {
            host: detect_host(&text, remote_url),
        };
    }

    OperationError::Failed {
        message: first_meaningful_line(result)
            .unwrap_or_else(|| format!("git exited with code {}", result.exit_code)),
    }
}

fn detect_host(text: &str, remote_url: Option<&str>) -> String {
    remote_url
        .and_then(|url| CloneUrl::new(url).ok())
        .map(|url| url.host().to_string())
        .or_else(|| {
            host_pattern()
                .captures(text)
                .map(|captures| captures[1].trim_end_matches('.').to_string())
        })
        .unwrap_or_else(|| "the remote host".to_string())
}

fn first_meaningful_line(result: &ExecutionResult) -> Option<String> {
    result
        .stderr
        .lines()
        .chain(result.stdout.lines())
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("hint:"))
        .map(|line| {
            line.strip_prefix("fatal: ")
                .or_else(|| line.strip_prefix("error: "))
                .unwrap_or(line)
                .to_string()
        })
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ok(stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult::new(0, stdout.to_string(), stderr.to_string(), 1)
    }

    fn failed(code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult::new(code, stdout.to_string(), stderr.to_string(), 1)
    }

    #[test]
    fn test_clone_success() {
        let result = ok("", "Cloning into 'h5p-text'...\n");
        assert_eq!(
            parse_clone(&result, "git@github.com:h5p/h5p-text.git"),
            Ok(OperationOutcome::Cloned)
        );
    }

    #[test]
    fn test_clone_already_exists() {
        let result = failed(
            128,
            "",
            "fatal: destination path 'h5p-text' already exists and is not an empty directory.\n",
        );
        assert_eq!(
            parse_clone(&result, "git@github.com:h5p/h5p-text.git"),
            Ok(OperationOutcome::AlreadyExists)
        );
    }

    #[test]
    fn test_clone_host_verification_uses_url_host() {
        let result = failed(
            128,
            "",
            "Host key verification failed.\nfatal: Could not read from remote repository.\n",
        );
        assert_eq!(
            parse_clone(&result, "git@gitlab.example.org:libs/h5p-text.git"),
            Err(OperationError::HostVerification {
                host: "gitlab.example.org".to_string()
            })
        );
    }

    #[test]
    fn test_auth_failure_detects_host_from_text() {
        let result = failed(
            128,
            "",
            "git@github.com: Permission denied (publickey).\nfatal: Could not read from remote repository.\n",
        );
        assert_eq!(
            normalize_failure(&result, None),
            OperationError::Auth {
                host: "github.com".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_failure_keeps_first_line_without_prefix() {
        let result = failed(
            1,
            "",
            "hint: something\nfatal: not a git repository (or any of the parent directories): .git\n",
        );
        assert_eq!(
            normalize_failure(&result, None),
            OperationError::Failed {
                message: "not a git repository (or any of the parent directories): .git"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_silent_failure_reports_exit_code() {
        let result = failed(3, "", "");
        assert_eq!(
            normalize_failure(&result, None),
            OperationError::Failed {
                message: "git exited with code 3".to_string()
            }
        );
    }

    #[test]
    fn test_status_with_changes() {
        let result = ok(
            "## main...origin/main [ahead 1]\n M library.json\n?? scripts/new.js\n",
            "",
        );
        assert_eq!(
            parse_status(&result),
            Ok(OperationOutcome::Status {
                branch: "main".to_string(),
                changes: vec![" M library.json".to_string(), "?? scripts/new.js".to_string()],
            })
        );
    }

    #[test]
    fn test_status_clean() {
        let result = ok("## develop\n", "");
        assert_eq!(
            parse_status(&result),
            Ok(OperationOutcome::Status {
                branch: "develop".to_string(),
                changes: vec![],
            })
        );
    }

    #[test]
    fn test_status_branch_headers() {
        assert_eq!(parse_branch_header("No commits yet on main"), "main");
        assert_eq!(parse_branch_header("HEAD (no branch)"), "HEAD");
        assert_eq!(parse_branch_header("feature/x...origin/feature/x [behind 2]"), "feature/x");
    }

    #[test]
    fn test_staging_failure_reports_exit_code() {
        let result = failed(128, "", "fatal: Unable to create '.git/index.lock': File exists.\n");
        assert_eq!(
            check_staging(&result),
            Some(OperationError::StagingFailed {
                exit_code: 128,
                message: "Unable to create '.git/index.lock': File exists.".to_string(),
            })
        );
        assert_eq!(check_staging(&ok("", "")), None);
    }

    #[test]
    fn test_commit_success() {
        let result = ok(
            "[main 1a2b3c4] Bump patch version\n 1 file changed, 1 insertion(+), 1 deletion(-)\n",
            "",
        );
        assert_eq!(
            parse_commit(&result),
            Ok(OperationOutcome::Committed {
                summary: "[main 1a2b3c4] Bump patch version".to_string()
            })
        );
    }

    #[test]
    fn test_commit_nothing_to_commit() {
        let result = failed(
            1,
            "On branch main\nYour branch is up to date with 'origin/main'.\n\nnothing to commit, working tree clean\n",
            "",
        );
        assert_eq!(parse_commit(&result), Ok(OperationOutcome::NothingToCommit));
    }

    #[test]
    fn test_pull_updated() {
        let result = ok(
            "Updating 1a2b3c4..5d6e7f8\nFast-forward\n library.json | 2 +-\n",
            "From github.com:h5p/h5p-text\n   1a2b3c4..5d6e7f8  main       -> origin/main\n",
        );
        assert_eq!(parse_pull(&result, None), Ok(OperationOutcome::Pulled));
    }

    #[test]
    fn test_pull_up_to_date() {
        let result = ok("Already up to date.\n", "");
        assert_eq!(parse_pull(&result, None), Ok(OperationOutcome::UpToDate));
    }

    #[test]
    fn test_pull_auth_failure() {
        let result = failed(
            1,
            "",
            "Host key verification failed.\nfatal: Could not read from remote repository.\n",
        );
        assert_eq!(
            parse_pull(&result, Some("git@github.com:h5p/h5p-text.git")),
            Err(OperationError::HostVerification {
                host: "github.com".to_string()
            })
        );
    }

    #[test]
    fn test_pull_merge_conflict_is_failure() {
        let result = failed(
            1,
            "Auto-merging library.json\nCONFLICT (content): Merge conflict in library.json\n",
            "From github.com:h5p/h5p-text\nerror: could not apply 1a2b3c4\n",
        );
        assert!(parse_pull(&result, None).is_err());
    }

    #[test]
    fn test_push_noop() {
        let result = ok("", "Everything up-to-date\n");
        assert_eq!(parse_push(&result, None), Ok(OperationOutcome::NoOp));
    }

    #[test]
    fn test_push_summary_is_single_normalized_line() {
        let result = ok(
            "",
            "To github.com:h5p/h5p-text.git\n   1a2b3c4..5d6e7f8  main -> main\n",
        );
        assert_eq!(
            parse_push(&result, None),
            Ok(OperationOutcome::Pushed {
                summary: "1a2b3c4..5d6e7f8 main -> main".to_string()
            })
        );
    }

    #[test]
    fn test_push_rejected() {
        let result = failed(
            1,
            "",
            "To github.com:h5p/h5p-text.git\n ! [rejected]        main -> main (fetch first)\nerror: failed to push some refs\n",
        );
        assert!(matches!(
            parse_push(&result, None),
            Err(OperationError::Failed { .. })
        ));
    }

    #[test]
    fn test_reroot_diff() {
        let patch = "\
diff --git a/library.json b/library.json
index 1111111..2222222 100644
--- a/library.json
+++ b/library.json
@@ -1,3 +1,3 @@
--- a/not-a-header
-  \"patchVersion\": 1
+  \"patchVersion\": 2
diff --git a/new.js b/new.js
new file mode 100644
--- /dev/null
+++ b/new.js
@@ -0,0 +1 @@
+x
";
        let expected = "\
diff --git a/h5p-text/library.json b/h5p-text/library.json
index 1111111..2222222 100644
--- a/h5p-text/library.json
+++ b/h5p-text/library.json
@@ -1,3 +1,3 @@
--- a/not-a-header
-  \"patchVersion\": 1
+  \"patchVersion\": 2
diff --git a/h5p-text/new.js b/h5p-text/new.js
new file mode 100644
--- /dev/null
+++ b/h5p-text/new.js
@@ -0,0 +1 @@
+x
";
        assert_eq!(reroot_diff(patch, "h5p-text"), expected);
    }

    #[test]
    fn test_reroot_diff_renames() {
        let patch = "diff --git a/old.js b/new.js\nsimilarity index 100%\nrename from old.js\nrename to new.js\n";
        let rerooted = reroot_diff(patch, "lib");
        assert!(rerooted.contains("diff --git a/lib/old.js b/lib/new.js\n"));
        assert!(rerooted.contains("rename from lib/old.js\n"));
        assert!(rerooted.contains("rename to lib/new.js\n"));
    }

    #[test]
    fn test_reroot_diff_quoted_paths() {
        let patch = "\
diff --git \"a/caf\\303\\251.txt\" \"b/caf\\303\\251.txt\"
index 1111111..2222222 100644
--- \"a/caf\\303\\251.txt\"
+++ \"b/caf\\303\\251.txt\"
@@ -1 +1 @@
-old
+new
";
        let expected = "\
diff --git \"a/lib/caf\\303\\251.txt\" \"b/lib/caf\\303\\251.txt\"
index 1111111..2222222 100644
--- \"a/lib/caf\\303\\251.txt\"
+++ \"b/lib/caf\\303\\251.txt\"
@@ -1 +1 @@
-old
+new
";
        assert_eq!(reroot_diff(patch, "lib"), expected);
    }

    #[test]
    fn test_reroot_diff_quoted_path_with_escaped_quote_and_space() {
        let patch = "diff --git \"a/say \\\"hi\\\".txt\" b/plain.txt\n";
        assert_eq!(
            reroot_diff(patch, "lib"),
            "diff --git \"a/lib/say \\\"hi\\\".txt\" b/lib/plain.txt\n"
        );
    }

    #[test]
    fn test_reroot_diff_quoted_renames() {
        let patch = "\
diff --git a/old.js \"b/tab\\tname.js\"
similarity index 100%
rename from old.js
rename to \"tab\\tname.js\"
";
        let rerooted = reroot_diff(patch, "lib");
        assert!(rerooted.contains("diff --git a/lib/old.js \"b/lib/tab\\tname.js\"\n"));
        assert!(rerooted.contains("rename from lib/old.js\n"));
        assert!(rerooted.contains("rename to \"lib/tab\\tname.js\"\n"));
    }

    #[test]
    fn test_empty_diff() {
        assert_eq!(
            parse_diff(&ok("", ""), "lib"),
            Ok(OperationOutcome::Diff {
                patch: String::new()
            })
        );
    }
}
