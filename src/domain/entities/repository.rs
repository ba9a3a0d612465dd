use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// バージョン管理メタデータの置き場所（ディレクトリ直下）
pub const VCS_METADATA_DIR: &str = ".git";

/// ワークスペース内のチェックアウト済みディレクトリ
///
/// スキャンのたびに新しく生成され、キャッシュされない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// ディレクトリ名
    pub name: String,

    /// ディレクトリの絶対パスまたはワークスペース相対パス
    pub path: PathBuf,
}

impl RepositoryRecord {
    /// パスの末尾をnameとして作成
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// リポジトリ直下の `library.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionFile {
    pub machine_name: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub patch_version: u32,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl VersionFile {
    /// `major.minor.patch` 形式のバージョン文字列
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version
        )
    }
}
