use crate::common::error::LibwsError;

/// libws全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use libws::common::result::LibwsResult;
/// use libws::common::error::LibwsError;
///
/// fn check_message(message: &str) -> LibwsResult<&str> {
///     if message.is_empty() {
///         return Err(LibwsError::validation_error("message", "must not be empty"));
///     }
///     Ok(message)
/// }
///
/// assert!(check_message("").is_err());
/// ```
pub type LibwsResult<T> = Result<T, LibwsError>;

/// Resultのエラー変換ヘルパー
pub trait ResultExt<T> {
    /// I/Oエラーをファイルシステムエラーとして変換
    ///
    /// # Examples
    ///
    /// ```
    /// use libws::common::result::{LibwsResult, ResultExt};
    ///
    /// let result: Result<String, std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let converted: LibwsResult<String> = result.with_filesystem_error("read failed", None);
    /// assert!(converted.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> LibwsResult<T>;
}

impl<T> ResultExt<T> for Result<T, std::io::Error> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> LibwsResult<T> {
        self.map_err(|e| LibwsError::filesystem_error_with_source(message, path, e))
    }
}
