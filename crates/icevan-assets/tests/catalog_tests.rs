//! Catalog read-model tests

use icevan_assets::prelude::*;
use icevan_assets::HeroSlide;
use icevan_test_utils::PublicDirFixture;
use pretty_assertions::assert_eq;

fn catalog(fixture: &PublicDirFixture) -> Catalog {
    Catalog::new(fixture.store())
}

#[tokio::test]
async fn application_gallery_uses_first_asset_as_thumb() {
    let fixture = PublicDirFixture::new();
    fixture.seed(
        "images/aplicacoes/van-master",
        &["02-lateral.jpg", "01-capa.webp", "03-interior.png"],
    );

    let gallery = catalog(&fixture).application_gallery("van-master").await.unwrap();

    assert_eq!(gallery.slug, "van-master");
    assert_eq!(
        gallery.thumb.as_deref(),
        Some("/images/aplicacoes/van-master/01-capa.webp")
    );
    assert_eq!(gallery.images.len(), 3);
    assert_eq!(gallery.images[2], "/images/aplicacoes/van-master/03-interior.png");
}

#[tokio::test]
async fn empty_application_has_no_thumb() {
    let fixture = PublicDirFixture::new();
    let gallery = catalog(&fixture).application_gallery("fiorinos").await.unwrap();
    assert_eq!(gallery.thumb, None);
    assert!(gallery.images.is_empty());
}

#[tokio::test]
async fn unknown_application_is_rejected() {
    let fixture = PublicDirFixture::new();
    let err = catalog(&fixture).application_gallery("kombi").await.unwrap_err();
    assert!(matches!(err, AssetError::UnknownApplication(_)));
}

#[tokio::test]
async fn company_images_in_store_order() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/empresa", &["02-equipe.jpg", "01-fachada.jpg", "leia.txt"]);

    let images = catalog(&fixture).company_images().await.unwrap();

    assert_eq!(
        images,
        vec![
            "/images/empresa/01-fachada.jpg".to_string(),
            "/images/empresa/02-equipe.jpg".to_string(),
        ]
    );
}

#[tokio::test]
async fn hero_slides_sorted_by_numeric_prefix() {
    let fixture = PublicDirFixture::new();
    fixture.seed(
        "images/hero",
        &["100-ultimo.jpg", "9-nono.jpg", "banner.jpg", "02-segundo.jpg"],
    );

    let slides = catalog(&fixture).hero_slides().await.unwrap();

    let order: Vec<(&str, u32)> = slides
        .iter()
        .map(|s: &HeroSlide| (s.filename.as_str(), s.sort_order))
        .collect();
    assert_eq!(
        order,
        vec![
            ("02-segundo.jpg", 2),
            ("9-nono.jpg", 9),
            ("100-ultimo.jpg", 100),
            ("banner.jpg", 999),
        ]
    );
}

#[tokio::test]
async fn logos_resolve_from_folder_with_fallbacks() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/logo", &["logo.png", "favicon.ico"]);

    let logos = catalog(&fixture).logos().await;

    assert_eq!(logos.principal, "/images/logo/logo.png");
    assert_eq!(logos.branca, "/images/logo/logo-white.svg");
    assert_eq!(logos.favicon, "/images/logo/favicon.ico");
}

#[tokio::test]
async fn logos_without_folder_use_fallbacks() {
    let fixture = PublicDirFixture::new();
    let logos = catalog(&fixture).logos().await;
    assert_eq!(logos.principal, "/images/logo/logo.svg");
}
