use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::AUTH_HEADER;
use crate::directory::UserDirectory;
use crate::error::AppError;

/// Guards every route except signup, login, and the health check.
///
/// Per request: extract the token from the `x-auth` header, resolve it to a
/// user through the directory (signature check, then stored-list membership),
/// and insert a [`CurrentUser`] into request extensions for downstream
/// handlers. Any step failing short-circuits to a 401. The resolved identity
/// lives only for the duration of the request.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the service handle is moved into the resolution future.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        // Skip authentication for signup, login, and the health check
        let path = req.path();
        if path == "/health" || path == "/users" || path == "/users/login" {
            return Box::pin(async move { service.call(req).await });
        }

        let token = req
            .headers()
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let directory = req.app_data::<web::Data<UserDirectory>>().cloned();

        Box::pin(async move {
            let token = match token {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthorized("Missing token".into()).into());
                }
            };

            let directory = match directory {
                Some(directory) => directory,
                None => {
                    // Only reachable if the app was assembled without a directory.
                    return Err(
                        AppError::InternalServerError("User directory not configured".into())
                            .into(),
                    );
                }
            };

            let user = directory.find_by_token(&token).await.map_err(Error::from)?;

            req.extensions_mut().insert(CurrentUser { user, token });
            service.call(req).await
        })
    }
}
