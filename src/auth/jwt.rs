use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims issued by the identity service. Unknown fields are ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] jsonwebtoken::errors::Error),
    #[error("refresh tokens cannot be used for API calls")]
    NotAccessToken,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    if claims.token_type != TokenType::Access {
        return Err(TokenError::NotAccessToken);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(token_type: TokenType, secret: &str) -> String {
        let claims = Claims {
            user_id: 7,
            sub: "hr.lead".to_string(),
            role: 2,
            exp: 4_102_444_800, // 2100-01-01
            token_type,
            employee_id: Some(70),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encodable claims")
    }

    #[test]
    fn accepts_access_tokens() {
        let claims = verify_token(&token(TokenType::Access, "s3cret"), "s3cret").expect("valid");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.employee_id, Some(70));
    }

    #[test]
    fn rejects_refresh_tokens_and_wrong_secret() {
        assert!(matches!(
            verify_token(&token(TokenType::Refresh, "s3cret"), "s3cret"),
            Err(TokenError::NotAccessToken)
        ));
        assert!(matches!(
            verify_token(&token(TokenType::Access, "s3cret"), "other"),
            Err(TokenError::Decode(_))
        ));
    }
}
