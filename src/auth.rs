use std::ops::Deref;

use actix_web::{body, dev, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use chrono::{Duration, Local};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entity::{sea_orm_active_enums::RoleType, user}, error::message_response};

/// Issues and checks the bearer tokens handed out on login.
///
/// The token carries the whole user row (minus the password hash), so
/// extracting the caller never touches the database.
pub struct Authority {
    jwt_key: (EncodingKey, DecodingKey),
    ttl: Duration,
}

impl Authority {
    pub fn new(jwt_key: &[u8], ttl: Duration) -> Self {
        Self {
            jwt_key: (EncodingKey::from_secret(jwt_key), DecodingKey::from_secret(jwt_key)),
            ttl,
        }
    }
    
    pub fn issue_for(&self, user: &user::Model) -> Result<String, AuthError> {
        let claims = Claims {
            exp: (Local::now() + self.ttl).timestamp(),
            data: user
        };

        Ok(encode(&Header::default(), &claims, &self.jwt_key.0)?)
    }
    
    pub fn authorize(&self, token: impl AsRef<str>) -> Result<user::Model, AuthError> {
        let payload = decode::<Claims<user::Model>>(token.as_ref(), &self.jwt_key.1, &Validation::default())?;
        
        Ok(payload.claims.data)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims<T> {
    exp: i64,
    data: T,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    AuthorityError(#[from] jsonwebtoken::errors::Error),

    #[error("unauthorized")]
    MissingToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("admin access required")]
    AdminOnly,
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        message_response(self.status_code(), self.to_string())
    }
    
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthorityError(_) => StatusCode::FORBIDDEN,
            AuthError::MissingToken | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AdminOnly => StatusCode::FORBIDDEN,
        }
    }
}

impl FromRequest for user::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        
        Box::pin(async move {
            // Basically grabs the value after space ( ) from `Authorization` header
            // Example: Bearer sometoken
            //                 ^ grabs this value
            let Some(Ok(Some((_, token)))) = req.headers()
                .get("Authorization")
                .map(|v|
                    v.to_str()
                        .map(|str| str.split_once(" "))
                )
            else {
                return Err(AuthError::MissingToken.into())
            };
            
            let authority = req.app_data::<web::Data<Authority>>().expect("Authority must be attached");
            let user = authority.authorize(token.trim())?;
            
            Ok(user)
        })
    }
}

pub struct Admin(pub user::Model);

impl Deref for Admin {
    type Target = user::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Admin {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        
        Box::pin(async move {
            let user = user::Model::from_request(&req, &mut dev::Payload::None).await?;
            
            if user.role != RoleType::Admin {
                return Err(AuthError::AdminOnly.into())
            }
    
            Ok(Self(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, get, test, web, App, Responder};
    use uuid::Uuid;

    use super::*;

    fn user(role: RoleType) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "ramesh".to_string(),
            password: Vec::new(),
            role,
        }
    }
    
    #[actix_web::test]
    async fn test_authority() {
        let authority = Authority::new(b"secret", Duration::hours(1));
        
        let user = user(RoleType::Supervisor);
        let token = authority.issue_for(&user).unwrap();

        let authorized_user = authority.authorize(token).expect("Unable to authorize user from token");
        assert_eq!(user, authorized_user);
    }

    #[actix_web::test]
    async fn test_expired_token() {
        let authority = Authority::new(b"secret", Duration::hours(-2));

        let token = authority.issue_for(&user(RoleType::Admin)).unwrap();
        assert!(authority.authorize(token).is_err());
    }

    #[actix_web::test]
    async fn test_password_hash_stays_out_of_token() {
        let authority = Authority::new(b"secret", Duration::hours(1));

        let mut user = user(RoleType::Admin);
        user.password = vec![1, 2, 3];

        let authorized_user = authority.authorize(authority.issue_for(&user).unwrap()).unwrap();
        assert!(authorized_user.password.is_empty());
    }
    
    #[actix_web::test]
    async fn test_extractor() {
        let secret = b"secret";
        
        #[get("/")]
        async fn test_handler(user: user::Model) -> impl Responder {
            user.id.to_string()
        }
        
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret, Duration::hours(1))))
                .service(test_handler)
        ).await;
        
        {
            let forbidden_req = test::TestRequest::default()
                .uri("/")
                .insert_header(("Authorization", "Bearer wrong"))
                .to_request();
            
            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let unauthorized_req = test::TestRequest::default()
                .uri("/")
                .to_request();
            
            let response = test::call_service(&app, unauthorized_req).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = response.into_body().try_into_bytes().unwrap();
            assert_eq!(&body[..], br#"{"message":"unauthorized"}"#);
        }

        {
            let user = user(RoleType::Supervisor);
            let token = Authority::new(secret, Duration::hours(1)).issue_for(&user).unwrap();
    
            let authorized_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request();
            
            let response = test::call_service(&app, authorized_req).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.into_body().try_into_bytes().unwrap(), user.id.to_string().as_bytes());
        }
    }
    
    #[actix_web::test]
    async fn test_admin_extractor() {
        let secret = b"secret";
        
        #[get("/")]
        async fn test_handler(user: Admin) -> impl Responder {
            assert_eq!(user.role, RoleType::Admin);
            
            ""
        }
        
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret, Duration::hours(1))))
                .service(test_handler)
        ).await;
        
        {
            let token = Authority::new(secret, Duration::hours(1)).issue_for(&user(RoleType::Admin)).unwrap();

            let success_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request();
            
            let response = test::call_service(&app, success_req).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        {
            let token = Authority::new(secret, Duration::hours(1)).issue_for(&user(RoleType::Supervisor)).unwrap();

            let forbidden_req = test::TestRequest::default()
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request();
            
            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }
}
