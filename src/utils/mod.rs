// taskboard-service/src/utils/mod.rs
use crate::models::{Claims, Identity, ServiceError};
use actix_web::{HttpMessage, HttpRequest};

pub mod blob_storage;
pub mod document_store;

// Identity is always set by `IdentityResolver`; a request that skipped it is anonymous
pub fn get_identity_from_request(req: &HttpRequest) -> Identity {
    req.extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or(Identity::Anonymous)
}

// JWT utility functions. Tokens are issued by the external identity provider;
// this service only validates them.
pub mod jwt {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthenticated)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthenticated);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Middleware resolving the caller's identity. Requests without a valid token are
// let through as anonymous so read paths can degrade to empty results.
pub mod auth_middleware {
    use super::*;
    use crate::services::user_service;
    use crate::state::AppState;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::header;
    use actix_web::{web, Error};
    use futures::future::{ok, Ready};
    use log::{debug, warn};
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;

    pub struct IdentityResolver {
        secret: Rc<String>,
    }

    impl IdentityResolver {
        pub fn new(secret: impl Into<String>) -> Self {
            Self {
                secret: Rc::new(secret.into()),
            }
        }
    }

    impl<S, B> Transform<S, ServiceRequest> for IdentityResolver
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Transform = IdentityResolverMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(IdentityResolverMiddleware {
                service,
                secret: self.secret.clone(),
            })
        }
    }

    pub struct IdentityResolverMiddleware<S> {
        service: S,
        secret: Rc<String>,
    }

    impl<S> IdentityResolverMiddleware<S> {
        fn resolve_claims(&self, req: &ServiceRequest) -> Option<Claims> {
            let auth_header = req.headers().get(header::AUTHORIZATION)?;
            let auth_str = auth_header.to_str().ok()?;
            let token = jwt::extract_token_from_header(auth_str).ok()?;

            match jwt::decode_token(&token, &self.secret) {
                Ok(claims) => Some(claims),
                Err(_) => {
                    warn!("Rejected bearer token on {}", req.path());
                    None
                }
            }
        }
    }

    impl<S, B> Service<ServiceRequest> for IdentityResolverMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let identity = match self.resolve_claims(&req) {
                Some(claims) => {
                    if let Some(state) = req.app_data::<web::Data<AppState>>() {
                        // Profile refresh failures must not fail the request itself
                        if let Err(e) = user_service::record_profile(&state.store, &claims) {
                            warn!("Failed to record profile for {}: {}", claims.sub, e);
                        }
                    }
                    let identity = Identity::User(claims.sub.clone());
                    req.extensions_mut().insert(claims);
                    identity
                }
                None => Identity::Anonymous,
            };

            debug!("Resolved {:?} for {}", identity, req.path());
            req.extensions_mut().insert(identity);

            let fut = self.service.call(req);
            Box::pin(async move { fut.await })
        }
    }
}
