//! 値オブジェクト定義
//!
//! ワイヤ境界から受け取った文字列は、共有状態に触れる前にここで検証して
//! ドメインモデルへ変換します。

use serde::{Deserialize, Serialize};

use super::error::ValueError;

/// 接続識別子
///
/// サーバ権威が接続確立時（push）または join アクション時（pull）に払い出す
/// 不透明な識別子。表示名とは独立で、ロースター上の一意キーになる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    /// Generate a fresh server-assigned identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 表示名
///
/// クライアントが join 時に申告する名前。認証されず、一意性も保証されない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Reserved author name for server-generated system messages
    pub fn system() -> Self {
        Self("system".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ルーム名
///
/// メッセージログとプレゼンスロースターの分割単位。未指定の場合は
/// グローバルルームに割り当てられる（pull トランスポートは常にこちら）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomName(String);

pub const GLOBAL_ROOM: &str = "global";

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyRoomName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The implicit room used when a client does not name one
    pub fn global() -> Self {
        Self(GLOBAL_ROOM.to_string())
    }

    /// Parse an optional client-supplied room, falling back to the global room
    pub fn from_optional(value: Option<String>) -> Result<Self, ValueError> {
        match value {
            Some(v) if !v.trim().is_empty() => Self::new(v),
            _ => Ok(Self::global()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メッセージ本文
///
/// 前後の空白を除去した上で空文字を拒否する。空白のみの送信はメッセージを
/// 生成しない（仕様上はサイレントに拒否される）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyMessageText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// メッセージ識別子
///
/// 権威内の単調増加シーケンスが採番する。タイムスタンプ由来だが、
/// 同一ミリ秒内の連続送信でも厳密に増加する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Cursor meaning "no messages seen yet"
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Unix タイムスタンプ（UTC、ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Elapsed milliseconds from `earlier` to `self`
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty() {
        // テスト項目: 空の接続 ID は拒否される
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueError::EmptyConnectionId));
    }

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: generate() が毎回異なる ID を払い出す
        // given (前提条件):

        // when (操作):
        let id1 = ConnectionId::generate();
        let id2 = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_display_name_is_trimmed() {
        // テスト項目: 表示名の前後の空白が除去される
        // given (前提条件):
        let value = "  alice  ".to_string();

        // when (操作):
        let name = DisplayName::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_display_name_rejects_whitespace_only() {
        // テスト項目: 空白のみの表示名は拒否される
        // given (前提条件):
        let value = " \t ".to_string();

        // when (操作):
        let result = DisplayName::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueError::EmptyDisplayName));
    }

    #[test]
    fn test_room_name_from_optional_defaults_to_global() {
        // テスト項目: ルーム未指定の場合はグローバルルームになる
        // given (前提条件):

        // when (操作):
        let none = RoomName::from_optional(None).unwrap();
        let empty = RoomName::from_optional(Some("  ".to_string())).unwrap();
        let named = RoomName::from_optional(Some("general".to_string())).unwrap();

        // then (期待する結果):
        assert_eq!(none, RoomName::global());
        assert_eq!(empty, RoomName::global());
        assert_eq!(named.as_str(), "general");
    }

    #[test]
    fn test_message_text_trims_and_rejects_empty() {
        // テスト項目: 本文は trim され、空白のみは拒否される
        // given (前提条件):

        // when (操作):
        let ok = MessageText::new("  hi  ".to_string()).unwrap();
        let empty = MessageText::new("".to_string());
        let whitespace = MessageText::new("   ".to_string());

        // then (期待する結果):
        assert_eq!(ok.as_str(), "hi");
        assert_eq!(empty, Err(ValueError::EmptyMessageText));
        assert_eq!(whitespace, Err(ValueError::EmptyMessageText));
    }

    #[test]
    fn test_message_id_ordering() {
        // テスト項目: メッセージ ID は数値として順序比較できる
        // given (前提条件):
        let older = MessageId::new(100);
        let newer = MessageId::new(101);

        // when (操作):
        // then (期待する結果):
        assert!(newer > older);
        assert!(older > MessageId::zero());
    }

    #[test]
    fn test_timestamp_millis_since() {
        // テスト項目: 2 つのタイムスタンプの差分（ミリ秒）を計算できる
        // given (前提条件):
        let earlier = Timestamp::new(1_000);
        let later = Timestamp::new(121_000);

        // when (操作):
        let elapsed = later.millis_since(earlier);

        // then (期待する結果):
        assert_eq!(elapsed, 120_000);
    }
}
