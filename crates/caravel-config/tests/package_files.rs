//! Loading package and application resource files from disk.

use std::fs;
use std::path::Path;

use caravel_config::{resource_file, ConfigError, ConfigLoader, RouteLoader};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "packages/blog/res/config.toml",
        r#"
        "BlogPackage.title" = "Blog"
        "Unrelated.key" = "dropped"
        "#,
    );
    write(
        root,
        "packages/blog/res/routes.toml",
        r#"
        [home]
        path = "/"
        handler = "Index::index"

        [post]
        path = "/post/{slug}"
        method = "GET|HEAD"
        handler = "Post::show"
        view.layout = "main"
        "#,
    );
    write(
        root,
        "packages/shop/res/routes.json",
        r#"{"cart": {"path": "/cart", "handler": "Cart::show"}}"#,
    );
    write(
        root,
        "app/res/config.toml",
        r#"
        "BlogPackage.title" = "My Blog"
        "ini.set" = { "display_errors" = "0" }
        "#,
    );
    dir
}

#[test]
fn package_config_is_scoped_and_app_overrides_win() {
    let dir = fixture();
    let root = dir.path();

    let mut loader = ConfigLoader::new();
    let blog = resource_file(&root.join("packages/blog"), "config").unwrap();
    assert!(loader.merge_file(&blog, Some("BlogPackage")).unwrap());
    let shop = root.join("packages/shop/res/config.toml");
    assert!(!loader.merge_file(&shop, Some("ShopPackage")).unwrap());
    let app = resource_file(&root.join("app"), "config").unwrap();
    loader.merge_file(&app, None).unwrap();

    let config = loader.load();
    assert_eq!(config.get_str("BlogPackage.title"), Some("My Blog"));
    assert!(config.get("Unrelated.key").is_none());
    assert_eq!(
        config.ini_settings().unwrap().get("display_errors").unwrap(),
        "0"
    );
}

#[test]
fn routes_from_toml_and_json_packages() {
    let dir = fixture();
    let root = dir.path();

    let mut loader = RouteLoader::new();
    let blog = resource_file(&root.join("packages/blog"), "routes").unwrap();
    loader.merge_package_file(&blog, "BlogPackage").unwrap();
    let shop = resource_file(&root.join("packages/shop"), "routes").unwrap();
    loader.merge_package_file(&shop, "ShopPackage").unwrap();

    let table = loader.build();
    assert_eq!(table.names().collect::<Vec<_>>(), vec!["home", "post", "cart"]);

    let post = table.get("post").unwrap();
    assert_eq!(post.package_name(), Some("BlogPackage"));
    assert_eq!(post.layout_name(), Some("main"));
    assert!(post.methods().contains("head"));
    assert_eq!(table.get("cart").unwrap().package_name(), Some("ShopPackage"));
}

#[test]
fn override_file_without_packages_is_rejected_whole() {
    let dir = fixture();
    let root = dir.path();
    write(
        root,
        "app/res/routes.toml",
        r#"
        [home]
        path = "/start"
        handler = "Index::index"
        package = "BlogPackage"

        [rogue]
        path = "/rogue"
        handler = "Rogue::run"
        "#,
    );

    let mut loader = RouteLoader::new();
    loader
        .merge_package_file(&root.join("packages/blog/res/routes.toml"), "BlogPackage")
        .unwrap();
    let err = loader
        .merge_override_file(&root.join("app/res/routes.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::RouteMissingPackage { ref route, .. } if route == "rogue"));

    let table = loader.build();
    assert_eq!(table.get("home").unwrap().path(), "/");
    assert!(table.get("rogue").is_none());
}

#[test]
fn override_file_replaces_package_routes() {
    let dir = fixture();
    let root = dir.path();
    write(
        root,
        "app/res/routes.json",
        r#"{"home": {"path": "/start", "handler": "Index::index", "package": "BlogPackage"}}"#,
    );

    let mut loader = RouteLoader::new();
    loader
        .merge_package_file(&root.join("packages/blog/res/routes.toml"), "BlogPackage")
        .unwrap();
    assert!(loader
        .merge_override_file(&root.join("app/res/routes.json"))
        .unwrap());
    assert!(!loader
        .merge_override_file(&root.join("app/res/missing.toml"))
        .unwrap());

    let table = loader.build();
    assert_eq!(table.get("home").unwrap().path(), "/start");
}
