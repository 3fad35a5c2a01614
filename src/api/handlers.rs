// HTTP request handlers for API endpoints

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse, Result};
use catalog_client::{Catalog, StoreError};

use crate::api::models::*;
use crate::gallery::GalleryState;
use crate::metadata;
use crate::page::{PageAggregator, PageOutcome};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub pages: PageAggregator,
    /// Host of the store API, reported by the health check.
    pub store: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, pages: PageAggregator, store: impl Into<String>) -> Self {
        Self {
            catalog,
            pages,
            store: store.into(),
            started_at: Instant::now(),
        }
    }
}

fn not_found(what: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(format!("{what} not found")))
}

/// Entity lookups: typed absence is a 404, anything else is the store's fault.
fn entity_response<T: serde::Serialize>(
    what: &str,
    key: &str,
    result: Result<T, StoreError>,
) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(ApiResponse::success(value)),
        Err(err) if err.is_not_found() => not_found(format!("{what} {key}")),
        Err(err) => {
            tracing::error!(what, key, error = %err, "api: store lookup failed");
            HttpResponse::BadGateway().json(ApiResponse::<()>::error("store unavailable"))
        }
    }
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        store: state.store.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Full product page, with delivery info when a pincode is supplied.
pub async fn get_product_page(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();

    let page = match state.pages.load(&slug).await {
        PageOutcome::Ready(bundle) => *bundle,
        PageOutcome::NotFound => return Ok(not_found(format!("product {slug}"))),
    };

    let delivery = query
        .pincode
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .and_then(|pin| page.delivery_for(pin));

    Ok(HttpResponse::Ok().json(ApiResponse::success(PageResponse { page, delivery })))
}

/// Page metadata; always renderable, falls back to not-found metadata.
pub async fn get_product_metadata(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let meta = metadata::for_slug(state.catalog.as_ref(), &slug).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(meta)))
}

/// Gallery view for the page's variant after applying the requested selections.
pub async fn get_product_gallery(
    path: web::Path<String>,
    query: web::Query<GalleryQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();

    let Some(page) = state.pages.load(&slug).await.bundle() else {
        return Ok(not_found(format!("product {slug}")));
    };

    let mut gallery = GalleryState::new(page.variant.images);
    if let Some(tab) = query.tab.as_deref() {
        if !gallery.select_tab(tab) {
            tracing::debug!(slug = %slug, tab, "api: ignoring unknown gallery tab");
        }
    }
    if let Some(index) = query.index {
        if !gallery.select_index(index) {
            tracing::debug!(slug = %slug, index, "api: ignoring out-of-range gallery index");
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(gallery.view())))
}

/// Slugs to pre-render.
pub async fn get_static_params(state: web::Data<AppState>) -> Result<HttpResponse> {
    let slugs = state.pages.static_params().await;
    tracing::info!(count = slugs.len(), "Static params requested");
    Ok(HttpResponse::Ok().json(ApiResponse::success(slugs)))
}

pub async fn list_brands(state: web::Data<AppState>) -> Result<HttpResponse> {
    let brands = state.catalog.brands().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "api: brands unavailable");
        Vec::new()
    });
    Ok(HttpResponse::Ok().json(ApiResponse::success(brands)))
}

pub async fn list_homepage_categories(state: web::Data<AppState>) -> Result<HttpResponse> {
    let categories = state
        .catalog
        .homepage_categories()
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "api: homepage categories unavailable");
            Vec::new()
        });
    Ok(HttpResponse::Ok().json(ApiResponse::success(categories)))
}

pub async fn get_homepage_category(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let result = state.catalog.homepage_category(&id).await;
    Ok(entity_response("homepage category", &id, result))
}

pub async fn get_blog(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let result = state.catalog.blog_by_slug(&slug).await;
    Ok(entity_response("blog", &slug, result))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use catalog_client::{LocationGroup, MediaKind};
    use serde_json::Value;

    use super::*;
    use crate::api::routes::configure_routes;
    use crate::page::fixtures::{detail, http_error, listing, media, product, FakeCatalog};
    use crate::page::PageSettings;

    fn state(fake: FakeCatalog) -> web::Data<AppState> {
        let catalog: Arc<dyn Catalog> = Arc::new(fake);
        let pages = PageAggregator::new(catalog.clone(), PageSettings::default());
        web::Data::new(AppState::new(catalog, pages, "shop.example.com"))
    }

    fn found(slug: &str) -> FakeCatalog {
        FakeCatalog::new(Ok(detail(product("p1", Some("c1"), &[slug]), slug)))
    }

    async fn get(fake: FakeCatalog, uri: &str) -> (StatusCode, Value) {
        let app =
            test::init_service(App::new().app_data(state(fake)).configure(configure_routes)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_store() {
        let (status, body) = get(found("red-shoe"), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["store"], "shop.example.com");
        assert!(body["meta"]["request_id"].is_string());
    }

    #[actix_web::test]
    async fn product_page_includes_delivery_for_served_pincode() {
        let fake = found("red-shoe")
            .with_category(Ok(listing(vec![product("p2", Some("c1"), &["blue-shoe"])])))
            .with_groups(Ok(vec![LocationGroup {
                id: "g1".into(),
                name: Some("Metro".into()),
                pin_codes: vec!["560001".into()],
                estimated_delivery: Some(2),
                is_cod_available: true,
            }]));

        let (status, body) = get(fake, "/api/v1/products/red-shoe?pincode=560001").await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["variant"]["slug"], "red-shoe");
        assert_eq!(data["related"][0]["id"], "p2");
        assert_eq!(data["delivery"]["location"], "560001");
        assert_eq!(data["delivery"]["estimatedDelivery"], 2);
    }

    #[actix_web::test]
    async fn unknown_product_is_404() {
        let fake = FakeCatalog::new(Err(StoreError::not_found("product:nope")));
        let (status, body) = get(fake, "/api/v1/products/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn metadata_is_always_200() {
        let (status, body) = get(
            FakeCatalog::new(Err(http_error(500))),
            "/api/v1/products/red-shoe/metadata",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], metadata::NOT_FOUND_TITLE);

        let (_, body) = get(found("red-shoe"), "/api/v1/products/red-shoe/metadata").await;
        assert_eq!(body["data"]["title"], "Buy Item red-shoe");
        assert_eq!(body["data"]["openGraph"]["type"], "website");
    }

    #[actix_web::test]
    async fn gallery_applies_selections_independently() {
        let mut p = product("p1", None, &["clip"]);
        p.variants[0].images = vec![
            media("img1", MediaKind::Image),
            media("img2", MediaKind::Image),
            media("video1", MediaKind::Video),
        ];
        let fake = FakeCatalog::new(Ok(detail(p, "clip")));

        let (status, body) = get(fake, "/api/v1/products/clip/gallery?index=2&tab=missing").await;
        assert_eq!(status, StatusCode::OK);
        let view = &body["data"];
        assert_eq!(view["mode"], "media");
        assert_eq!(view["activeIndex"], 2);
        assert_eq!(view["activeTab"], "img1");
        assert_eq!(view["slides"][0]["loading"], "eager");
        assert_eq!(view["slides"][2]["kind"], "VIDEO");
    }

    #[actix_web::test]
    async fn gallery_without_media_is_placeholder() {
        let mut p = product("p1", None, &["bare"]);
        p.variants[0].images.clear();
        let fake = FakeCatalog::new(Ok(detail(p, "bare")));
        let (_, body) = get(fake, "/api/v1/products/bare/gallery").await;
        assert_eq!(body["data"]["mode"], "placeholder");
        assert_eq!(body["data"]["src"], metadata::PLACEHOLDER_IMAGE);
    }

    #[actix_web::test]
    async fn blogs_and_categories_map_absence_to_404() {
        let (status, body) = get(found("x"), "/api/v1/blogs/launch").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Launch");

        let (status, _) = get(found("x"), "/api/v1/blogs/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(found("x"), "/api/v1/homepage-categories/c9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn brand_listing_is_passed_through() {
        let (status, body) = get(found("x"), "/api/v1/brands").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "Acme");
    }
}
