use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// このクライアントが対応しているレジストリのAPIバージョン
pub const REGISTRY_API_VERSION: u32 = 1;

/// レジストリに登録されたライブラリの記述子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDescriptor {
    /// 一意なライブラリ名（例: H5P.Foo）
    pub machine_name: String,

    /// メジャーバージョン
    pub major_version: u32,

    /// マイナーバージョン
    pub minor_version: u32,

    /// パッチバージョン
    pub patch_version: u32,

    /// クローン元のURL
    pub repository: String,

    /// 依存ライブラリ名（順序付き、空の場合あり）
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl LibraryDescriptor {
    /// 新しいLibraryDescriptorを作成
    pub fn new(machine_name: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            machine_name: machine_name.into(),
            major_version: 1,
            minor_version: 0,
            patch_version: 0,
            repository: repository.into(),
            dependencies: Vec::new(),
        }
    }

    /// バージョンを設定
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self.patch_version = patch;
        self
    }

    /// 依存ライブラリを設定
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// `major.minor.patch` 形式のバージョン文字列
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version
        )
    }
}

/// リモートのライブラリカタログ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    /// カタログのAPIバージョン
    pub api_version: u32,

    /// machineName → 記述子
    pub libraries: HashMap<String, LibraryDescriptor>,
}

impl Registry {
    /// 記述子のリストからRegistryを作成
    pub fn new(api_version: u32, libraries: impl IntoIterator<Item = LibraryDescriptor>) -> Self {
        Self {
            api_version,
            libraries: libraries
                .into_iter()
                .map(|library| (library.machine_name.clone(), library))
                .collect(),
        }
    }

    /// 名前でライブラリを検索
    pub fn get(&self, machine_name: &str) -> Option<&LibraryDescriptor> {
        self.libraries.get(machine_name)
    }

    /// 名前順にソートされたライブラリ一覧
    pub fn sorted(&self) -> Vec<&LibraryDescriptor> {
        let mut libraries: Vec<_> = self.libraries.values().collect();
        libraries.sort_by(|a, b| a.machine_name.cmp(&b.machine_name));
        libraries
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// 1回の依存解決で得られた重複のないライブラリ集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    libraries: BTreeMap<String, LibraryDescriptor>,
}

impl Collection {
    /// 空のCollectionを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 未登録の場合のみ追加する。追加した場合はtrue
    pub fn insert(&mut self, library: LibraryDescriptor) -> bool {
        if self.libraries.contains_key(&library.machine_name) {
            return false;
        }
        self.libraries
            .insert(library.machine_name.clone(), library);
        true
    }

    pub fn contains(&self, machine_name: &str) -> bool {
        self.libraries.contains_key(machine_name)
    }

    pub fn get(&self, machine_name: &str) -> Option<&LibraryDescriptor> {
        self.libraries.get(machine_name)
    }

    /// 名前順のライブラリ名
    pub fn names(&self) -> Vec<&str> {
        self.libraries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryDescriptor> {
        self.libraries.values()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl IntoIterator for Collection {
    type Item = LibraryDescriptor;
    type IntoIter = std::collections::btree_map::IntoValues<String, LibraryDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.libraries.into_values()
    }
}
