use std::collections::VecDeque;

/// 呼び出し側が1件ずつ取り出す作業キュー
///
/// キュー自身は操作を実行しない。呼び出し側は `next()` で1件取り出し、
/// 実行・進捗表示を行ってから次を要求する。`None` が空の合図で、
/// エラーではない。途中でやめたい場合は単に `next()` を呼ばなければよい。
#[derive(Debug, Clone)]
pub struct BatchQueue<T> {
    pending: VecDeque<T>,
    total: usize,
}

impl<T> Default for BatchQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            total: 0,
        }
    }
}

impl<T> BatchQueue<T> {
    /// 空のキューを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 内容を置き換える。前回の残りは破棄される
    pub fn init(&mut self, items: impl IntoIterator<Item = T>) {
        self.pending = items.into_iter().collect();
        self.total = self.pending.len();
    }

    /// 先頭を取り出す。空ならNone
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    /// 次に取り出される項目（取り出さない）
    pub fn peek(&self) -> Option<&T> {
        self.pending.front()
    }

    /// 残りの件数
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 直近の `init` で投入された件数
    pub fn total(&self) -> usize {
        self.total
    }

    /// 取り出し済みの件数
    pub fn processed(&self) -> usize {
        self.total - self.pending.len()
    }
}

impl<T> Iterator for BatchQueue<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}
