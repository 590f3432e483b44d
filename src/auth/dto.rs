use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub jwt: String,
}

/// Validated credentials pulled out of a request body.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Both fields must be present and non-empty; the email is normalized,
    /// the password is taken verbatim.
    pub fn from_fields(email: Option<String>, senha: Option<String>) -> Option<Self> {
        let email = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())?;
        let password = senha.filter(|p| !p.is_empty())?;
        Some(Self { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::from_fields(None, Some("x".into())).is_none());
        assert!(Credentials::from_fields(Some("a@b.com".into()), None).is_none());
        assert!(Credentials::from_fields(Some("   ".into()), Some("x".into())).is_none());
        assert!(Credentials::from_fields(Some("a@b.com".into()), Some("".into())).is_none());
    }

    #[test]
    fn whitespace_password_counts_as_present() {
        let c = Credentials::from_fields(Some("a@b.com".into()), Some("   ".into())).unwrap();
        assert_eq!(c.password, "   ");
    }

    #[test]
    fn credentials_normalize_email_but_not_password() {
        let c = Credentials::from_fields(Some("  A@B.com ".into()), Some(" Senha ".into())).unwrap();
        assert_eq!(c.email, "a@b.com");
        assert_eq!(c.password, " Senha ");
    }

    #[test]
    fn register_request_accepts_missing_name() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.com","senha":"x"}"#).unwrap();
        assert!(req.nome.is_none());
        assert_eq!(req.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn token_response_shape() {
        let json = serde_json::to_value(TokenResponse { jwt: "t".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "jwt": "t" }));
    }
}
