//! Middleware de autenticación JWT
//!
//! Verificación de bearer tokens y gate de roles. La emisión de tokens y
//! el alta de cuentas viven en otro servicio; acá solo se decodifica y se
//! inyecta el usuario autenticado en las extensions de la request.
//!
//! Dos roles gruesos: `admin` (despacho) y `driver` (auto-servicio del
//! chofer). En los endpoints de chofer, `sub` es el id del chofer.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{state::AppState, utils::errors::AppError};

/// Rol del usuario autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Driver => "driver",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "admin" => Ok(UserRole::Admin),
            "driver" => Ok(UserRole::Driver),
            _ => Err(AppError::Unauthorized(format!("Rol desconocido: {}", value))),
        }
    }
}

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let claims = verify_token(auth_header, &state.config.jwt_secret)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;
    let role = UserRole::parse(&claims.role)?;

    // Inyectar usuario autenticado en las extensions
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, role });

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de despacho
pub async fn require_admin(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Se requieren permisos de despacho".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Middleware para los endpoints de auto-servicio del chofer
pub async fn require_driver(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role != UserRole::Driver {
        return Err(AppError::Forbidden(
            "Endpoint exclusivo para choferes".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Generar JWT token para un usuario
pub fn generate_token(user_id: Uuid, role: UserRole, secret: &str) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::hours(12);

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Error generando JWT: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());

    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, UserRole::Driver, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(UserRole::parse(&claims.role).unwrap(), UserRole::Driver);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = generate_token(Uuid::new_v4(), UserRole::Admin, "secret-a").unwrap();
        assert!(verify_token(&token, "secret-b").is_err());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(UserRole::parse("superuser").is_err());
        assert_eq!(UserRole::parse("admin").unwrap(), UserRole::Admin);
    }
}
