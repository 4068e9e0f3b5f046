//! メッセージ ID の採番
//!
//! 壁時計のミリ秒だけでは同一ミリ秒内のバースト送信で ID が衝突するため、
//! `max(now, last + 1)` を CAS ループで取る単調シーケンスを使う。
//! 採番は追記時に行い、リクエスト到着順の揺らぎに影響されない。

use std::sync::atomic::{AtomicI64, Ordering};

use super::value_object::MessageId;

/// 権威スコープの単調メッセージ ID ジェネレータ
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: AtomicI64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Issue the next id: at least `now_millis`, strictly greater than the
    /// previously issued id.
    pub fn next(&self, now_millis: i64) -> MessageId {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return MessageId::new(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}
