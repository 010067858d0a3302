use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::dev::Payload;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Identity resolved from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::AuthError("Missing access token".to_string())),
        )
    }
}

struct PublicRoute {
    method: Option<Method>,
    prefix: &'static str,
}

impl PublicRoute {
    const fn any(prefix: &'static str) -> Self {
        Self {
            method: None,
            prefix,
        }
    }

    fn get(prefix: &'static str) -> Self {
        Self {
            method: Some(Method::GET),
            prefix,
        }
    }

    fn post(prefix: &'static str) -> Self {
        Self {
            method: Some(Method::POST),
            prefix,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && path.starts_with(self.prefix)
    }
}

/// Routes reachable without a token. A valid token on them still attaches the identity.
struct PublicPaths {
    routes: Vec<PublicRoute>,
    // These need auth even though a public prefix covers them
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            routes: vec![
                PublicRoute::any("/swagger-ui"),
                PublicRoute::any("/api-docs/"),
                PublicRoute::post("/api/v1/auth/signup"),
                PublicRoute::post("/api/v1/auth/login"),
                PublicRoute::post("/api/v1/auth/refresh"),
                PublicRoute::get("/api/v1/workers"),
                PublicRoute::get("/api/v1/locations"),
                PublicRoute::get("/api/v1/service-categories"),
                PublicRoute::get("/api/v1/qr/"),
                PublicRoute::get("/api/v1/memorials/"),
                PublicRoute::post("/api/v1/payments/checkout"),
                PublicRoute::post("/api/v1/contact"),
            ],
            excluded_paths: vec!["/api/v1/workers/me", "/api/v1/memorials/mine"],
        }
    }

    fn is_public_path(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        self.routes.iter().any(|route| route.matches(method, path))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight never carries credentials
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let is_public = self.public_paths.is_public_path(req.method(), req.path());

        let verified = bearer_token(&req).map(|token| self.jwt_service.verify_access_token(token));

        match verified {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(AuthUser {
                    user_id: claims.sub,
                    email: claims.email,
                });
                Box::pin(self.service.call(req))
            }
            // Guests may present a stale token on public routes
            _ if is_public => Box::pin(self.service.call(req)),
            Some(Err(_)) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    async fn whoami(user: Option<AuthUser>) -> HttpResponse {
        match user {
            Some(u) => HttpResponse::Ok().body(u.user_id),
            None => HttpResponse::Ok().body("guest"),
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("middleware-secret", 60, 120)
    }

    #[test]
    fn test_public_path_rules() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path(&Method::GET, "/api/v1/workers"));
        assert!(paths.is_public_path(&Method::GET, "/api/v1/workers/abc"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/workers/me"));
        assert!(!paths.is_public_path(&Method::POST, "/api/v1/workers/abc/reviews"));
        assert!(paths.is_public_path(&Method::POST, "/api/v1/payments/checkout"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/admin/dashboard"));
        assert!(!paths.is_public_path(&Method::GET, "/api/v1/memorials/mine"));
        assert!(paths.is_public_path(&Method::GET, "/swagger-ui/index.html"));
    }

    #[actix_web::test]
    async fn test_private_route_without_token_is_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/cart", web::get().to(whoami)),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/api/v1/cart").to_request();
        let res = actix_test::try_call_service(&app, req).await;
        let err = res.err().expect("missing token must fail");
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_public_route_attaches_identity_when_present() {
        let jwt = jwt();
        let token = jwt.generate_access_token("user-42", "u@example.com").unwrap();
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .route("/api/v1/qr/{code}", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/qr/MEM-1")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "user-42");

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/qr/MEM-1")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "guest");
    }
}
