//! 토큰 폐기 목록 모델.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 폐기된 세션 토큰 레코드.
///
/// 한 번 기록되면 수정/삭제되지 않습니다. 토큰이 자연 만료된 이후의 정리는
/// 외부 프로세스(또는 Redis TTL)에 맡깁니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct RevokedToken {
    /// 저장 키 ([`RevocationKeyMode`]에 따라 원본 토큰 또는 SHA-256 hex)
    pub token: String,
    /// 폐기 시각 (Unix timestamp, 초)
    pub revoked_at: i64,
}

/// `Raw` 모드에서 원본 그대로 저장하는 토큰의 최대 길이 (바이트).
///
/// 이보다 긴 값은 SHA-256 키로 저장합니다. PostgreSQL btree 인덱스 항목 크기 제한
/// (약 2.7KB) 아래로 유지해야 합니다.
pub const MAX_RAW_KEY_LEN: usize = 1024;

/// 폐기 목록에 저장할 키 형식.
///
/// `Raw`는 토큰 문자열을 그대로 저장합니다 ([`MAX_RAW_KEY_LEN`] 초과 시 다이제스트). 저장소에 bearer 자격증명이 평문으로
/// 남는 약점이 있어, 운영에서는 `Sha256`을 권장합니다. 두 모드는 섞어 쓸 수 없으므로
/// 전환 시 기존 폐기 목록은 무효가 됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationKeyMode {
    /// 원본 토큰 문자열
    #[default]
    Raw,
    /// 토큰의 SHA-256 hex 다이제스트
    Sha256,
}

impl RevocationKeyMode {
    /// 토큰에서 저장 키 생성.
    pub fn derive(&self, token: &str) -> String {
        match self {
            RevocationKeyMode::Raw if token.len() <= MAX_RAW_KEY_LEN => token.to_string(),
            RevocationKeyMode::Raw | RevocationKeyMode::Sha256 => sha256_hex(token),
        }
    }
}

fn sha256_hex(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl RevokedToken {
    /// 새 폐기 레코드.
    pub fn new(mode: RevocationKeyMode, token: &str, revoked_at: i64) -> Self {
        Self {
            token: mode.derive(token),
            revoked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_is_token() {
        assert_eq!(RevocationKeyMode::Raw.derive("abc.def.ghi"), "abc.def.ghi");
    }

    #[test]
    fn test_raw_key_bounded_for_oversized_token() {
        let at_limit = "a".repeat(MAX_RAW_KEY_LEN);
        assert_eq!(RevocationKeyMode::Raw.derive(&at_limit), at_limit);

        let oversized = "b".repeat(64 * 1024);
        let key = RevocationKeyMode::Raw.derive(&oversized);
        assert_eq!(key.len(), 64);
        assert_eq!(key, RevocationKeyMode::Sha256.derive(&oversized));
        assert_eq!(RevokedToken::new(RevocationKeyMode::Raw, &oversized, 0).token, key);
    }

    #[test]
    fn test_sha256_key_is_stable_digest() {
        let key = RevocationKeyMode::Sha256.derive("abc.def.ghi");
        assert_eq!(key.len(), 64);
        assert_eq!(key, RevocationKeyMode::Sha256.derive("abc.def.ghi"));
        assert_ne!(key, RevocationKeyMode::Sha256.derive("abc.def.ghj"));
        assert!(!key.contains("abc"));
    }

    #[test]
    fn test_key_mode_serde() {
        let mode: RevocationKeyMode = serde_json::from_str(r#""sha256""#).unwrap();
        assert_eq!(mode, RevocationKeyMode::Sha256);
        assert_eq!(serde_json::to_string(&RevocationKeyMode::Raw).unwrap(), r#""raw""#);
    }
}
