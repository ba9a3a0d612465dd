use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// CloneUrl関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum CloneUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

fn scp_like_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[^@/]+@)?([^:/]+):(.+)$").expect("scp-like url pattern is valid")
    })
}

/// クローン元URLの値オブジェクト
///
/// `https://host/org/repo.git`、`ssh://git@host/org/repo.git`、
/// `git@host:org/repo.git` の形式を受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CloneUrl {
    /// 元のURL文字列
    url: String,

    /// ホスト名
    host: String,

    /// リポジトリパス（組織/リポジトリ名）
    repo_path: String,
}

impl CloneUrl {
    /// 新しいCloneUrlインスタンスを作成
    pub fn new(url: &str) -> Result<Self, CloneUrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(CloneUrlError::InvalidFormat(url.to_string()));
        }

        // scp形式（git@host:org/repo.git）は url クレートでは解析できない
        if !trimmed.contains("://") {
            if let Some(captures) = scp_like_pattern().captures(trimmed) {
                return Ok(Self {
                    url: trimmed.to_string(),
                    host: captures[1].to_string(),
                    repo_path: captures[2].trim_matches('/').to_string(),
                });
            }
            return Err(CloneUrlError::InvalidFormat(url.to_string()));
        }

        let parsed =
            Url::parse(trimmed).map_err(|_| CloneUrlError::InvalidFormat(url.to_string()))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CloneUrlError::MissingHost(url.to_string()))?;

        Ok(Self {
            url: trimmed.to_string(),
            host: host.to_string(),
            repo_path: parsed.path().trim_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn repo_path(&self) -> &str {
        &self.repo_path
    }

    /// `.git` を除いたリポジトリ名（クローン先ディレクトリ名）
    pub fn repo_name(&self) -> Option<&str> {
        let last = self.repo_path.rsplit('/').next()?;
        let name = last.strip_suffix(".git").unwrap_or(last);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl fmt::Display for CloneUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl TryFrom<&str> for CloneUrl {
    type Error = CloneUrlError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        Self::new(url)
    }
}
