use crate::domain::entities::{Collection, Registry, REGISTRY_API_VERSION};
use crate::infrastructure::registry::{ensure_compatible, RegistryError, RegistrySource};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 依存解決エラーの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveErrorKind {
    /// レジストリに存在しないライブラリ
    UnknownLibrary,
}

/// 1つの依存ブランチで発生したエラー
///
/// `chain` は要求されたルートから失敗したライブラリまでの経路。
/// 兄弟ブランチの解決には影響しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub chain: Vec<String>,
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    fn unknown_library(chain: Vec<String>) -> Self {
        Self {
            chain,
            kind: ResolveErrorKind::UnknownLibrary,
        }
    }

    /// 失敗したライブラリ名（経路の末尾）
    pub fn library(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ResolveErrorKind::UnknownLibrary if self.chain.len() > 1 => write!(
                f,
                "Library '{}' is not in the registry (required by {})",
                self.library(),
                self.chain.join(" -> ")
            ),
            ResolveErrorKind::UnknownLibrary => {
                write!(f, "Library '{}' is not in the registry", self.library())
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// 1回の依存解決の結果
///
/// 解決できたライブラリと、ブランチごとのエラーを両方保持する。
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub collection: Collection,
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    /// エラーなしで解決できたか
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 1回の解決リクエストの間だけ共有されるコンテキスト
struct ResolutionContext {
    registry: Arc<Registry>,
    collection: Mutex<Collection>,
}

impl ResolutionContext {
    fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            collection: Mutex::new(Collection::new()),
        }
    }

    /// 未登録なら追加して、展開すべき依存リストを返す
    ///
    /// 確認と追加は同じロックの中で行う。
    fn claim(&self, name: &str) -> Claim {
        let Some(descriptor) = self.registry.get(name) else {
            return Claim::Unknown;
        };

        let mut collection = self
            .collection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if collection.insert(descriptor.clone()) {
            Claim::Expand(descriptor.dependencies.clone())
        } else {
            Claim::Seen
        }
    }

    fn into_collection(self) -> Collection {
        self.collection
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

enum Claim {
    Unknown,
    Seen,
    Expand(Vec<String>),
}

/// レジストリから推移的な依存関係を解決するサービス
pub struct DependencyResolver {
    source: Arc<dyn RegistrySource>,
    expected_api_version: u32,
}

impl DependencyResolver {
    /// 新しいDependencyResolverを作成
    pub fn new(source: Arc<dyn RegistrySource>) -> Self {
        Self {
            source,
            expected_api_version: REGISTRY_API_VERSION,
        }
    }

    /// 期待するAPIバージョンを変更
    pub fn with_api_version(mut self, expected_api_version: u32) -> Self {
        self.expected_api_version = expected_api_version;
        self
    }

    /// 要求されたライブラリとその依存関係をすべて解決
    ///
    /// レジストリの取得エラーは即座に返す。存在しないライブラリは
    /// そのブランチのエラーとして `Resolution::errors` に集められ、
    /// 他のブランチの解決は続行される。
    pub async fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Resolution, RegistryError> {
        let registry = self.source.fetch().await?;
        ensure_compatible(&registry, self.expected_api_version)?;

        let context = ResolutionContext::new(registry);

        let roots = names
            .iter()
            .map(|name| visit(&context, vec![name.as_ref().to_string()]));
        let errors: Vec<ResolveError> = join_all(roots).await.into_iter().flatten().collect();

        let collection = context.into_collection();
        info!(
            "Resolved {} libraries ({} errors)",
            collection.len(),
            errors.len()
        );

        Ok(Resolution { collection, errors })
    }
}

/// `path` の末尾のライブラリを訪問し、子孫で発生したエラーを返す
fn visit<'a>(context: &'a ResolutionContext, path: Vec<String>) -> BoxFuture<'a, Vec<ResolveError>> {
    async move {
        let name = match path.last() {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => return Vec::new(),
        };

        let dependencies = match context.claim(name) {
            Claim::Unknown => return vec![ResolveError::unknown_library(path)],
            Claim::Seen => return Vec::new(),
            Claim::Expand(dependencies) => dependencies,
        };
        debug!("Resolved {}", path.join(" -> "));

        let children = dependencies.into_iter().map(|dependency| {
            let mut child_path = path.clone();
            child_path.push(dependency);
            visit(context, child_path)
        });

        // 子の完了順に関係なく依存リストの順で結合する
        join_all(children).await.into_iter().flatten().collect()
    }
    .boxed()
}
