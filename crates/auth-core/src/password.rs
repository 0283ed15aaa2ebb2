//! 비밀번호 해싱.
//!
//! Argon2id 기반 단방향 해싱 및 검증. 작업 계수(메모리, 반복, 병렬도)는
//! [`PasswordConfig`]로 조정하며, 검증은 해시 문자열에 기록된 파라미터를 사용하므로
//! 작업 계수를 올려도 기존 해시는 계속 검증됩니다.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher as _,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordConfig;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("잘못된 작업 계수: {0}")]
    InvalidParams(String),
}

/// Argon2id 비밀번호 해셔.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// 설정된 작업 계수로 해셔 생성.
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// 비밀번호 해싱.
    ///
    /// 솔트는 OS 난수로 매번 새로 생성되므로 같은 비밀번호도 해시가 다릅니다.
    ///
    /// # Returns
    ///
    /// PHC 형식의 해시 문자열 (솔트 포함)
    ///
    /// ```rust,ignore
    /// let hash = hasher.hash("my_secure_password")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 불일치는 에러가 아니라 `Ok(false)`입니다. 에러는 저장된 해시 자체가
    /// 파싱 불가능한 경우(저장소 손상)에만 반환됩니다. 비교는 상수 시간입니다.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(_) => Err(PasswordError::InvalidHashFormat),
        }
    }
}

/// 비밀번호 강도 검증.
///
/// `password.enforce_strength`가 켜져 있을 때만 가입 시 적용됩니다.
///
/// # 요구사항
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("비밀번호에 최소 1개의 숫자가 포함되어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("비밀번호에 최소 1개의 영문자가 포함되어야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 테스트용 저비용 파라미터
    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
            enforce_strength: false,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = PasswordHasher::new(&PasswordConfig::default()).unwrap();
        let password = "TestPassword123!";
        let hash = hasher.hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));

        assert!(hasher.verify(&hash, password).unwrap());
        assert!(!hasher.verify(&hash, "WrongPassword123!").unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("Password1").unwrap();
        let hash2 = hasher.hash("Password1").unwrap();

        // 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);

        assert!(hasher.verify(&hash1, "Password1").unwrap());
        assert!(hasher.verify(&hash2, "Password1").unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = fast_hasher().verify("not-a-valid-hash", "password");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_hash_from_other_work_factor_still_verifies() {
        let old = fast_hasher().hash("rotate-me-1").unwrap();
        let stronger = PasswordHasher::new(&PasswordConfig {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
            enforce_strength: false,
        })
        .unwrap();

        assert!(stronger.verify(&old, "rotate-me-1").unwrap());
    }

    #[test]
    fn test_invalid_params() {
        let result = PasswordHasher::new(&PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
            enforce_strength: false,
        });
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = fast_hasher();
        let password = "한글패스워드123";
        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(&hash, password).unwrap());
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Password1").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());

        assert!(validate_password_strength("Pass1").is_err());
        assert!(validate_password_strength("Password").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_verify_matches_only_original(
            password in "\\PC{1,32}",
            other in "\\PC{1,32}",
        ) {
            let hasher = fast_hasher();
            let hash = hasher.hash(&password).unwrap();

            prop_assert!(hasher.verify(&hash, &password).unwrap());
            if other != password {
                prop_assert!(!hasher.verify(&hash, &other).unwrap());
            }
        }
    }
}
