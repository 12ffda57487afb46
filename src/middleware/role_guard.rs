/// Role Guard Middleware
///
/// Rejects callers whose token role differs from the one a route requires.
/// Reads the `Identity` placed by `AccessGuard`, so it must sit inside it:
///
/// ```ignore
/// web::resource("/admin")
///     .wrap(RoleGuard::new(Role::Admin))
///     .wrap(AccessGuard::new(codec))
/// ```
///
/// actix runs the last `.wrap()` first.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::auth::{Identity, Role};
use crate::error::AppError;

pub struct RoleGuard {
    required: Role,
}

impl RoleGuard {
    pub fn new(required: Role) -> Self {
        Self { required }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let identity = req.extensions().get::<Identity>().copied();

        match identity {
            Some(identity) if identity.role == self.required => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Some(identity) => {
                tracing::warn!(
                    user_id = identity.user_id,
                    role = %identity.role,
                    required = %self.required,
                    "Role check failed"
                );
                let error = AppError::Forbidden(format!(
                    "Permission denied: {} role required!",
                    self.required
                ));
                Box::pin(ready(Err(Error::from(error))))
            }
            None => {
                // Mounted without an AccessGuard in front of it; fail closed.
                tracing::error!(path = %req.path(), "RoleGuard reached without a verified identity");
                let error = AppError::Internal("RoleGuard requires AccessGuard".to_string());
                Box::pin(ready(Err(Error::from(error))))
            }
        }
    }
}
