// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/v1")
                // Product pages
                .route("/products/{slug}", web::get().to(handlers::get_product_page))
                .route(
                    "/products/{slug}/metadata",
                    web::get().to(handlers::get_product_metadata),
                )
                .route(
                    "/products/{slug}/gallery",
                    web::get().to(handlers::get_product_gallery),
                )
                .route("/static-params", web::get().to(handlers::get_static_params))
                // Storefront content
                .route("/brands", web::get().to(handlers::list_brands))
                .route(
                    "/homepage-categories",
                    web::get().to(handlers::list_homepage_categories),
                )
                .route(
                    "/homepage-categories/{id}",
                    web::get().to(handlers::get_homepage_category),
                )
                .route("/blogs/{slug}", web::get().to(handlers::get_blog)),
        );
}
