//! End-to-end flow tests against an in-process mock of the cafeteria
//! server: inventory snapshot, quantity updates, order submission and the
//! order log, with CSRF enforcement on mutating routes.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use ezfood_core::{ItemId, Price};
use ezfood_shop::availability::ProductCard;
use ezfood_shop::config::ShopConfig;
use ezfood_shop::{ShopApp, ShopError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StockItem {
    id: i64,
    name: String,
    quantity: u32,
}

#[derive(Default)]
struct MockInner {
    items: Vec<StockItem>,
    orders: Vec<Value>,
    history: Vec<Value>,
    missing_csrf: u32,
}

#[derive(Clone, Default)]
struct Mock {
    inner: Arc<Mutex<MockInner>>,
}

impl Mock {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().expect("mock lock")
    }

    fn set_quantity(&self, name: &str, quantity: u32) {
        let mut inner = self.lock();
        for item in &mut inner.items {
            if item.name == name {
                item.quantity = quantity;
            }
        }
    }

    fn quantity(&self, name: &str) -> Option<u32> {
        self.lock()
            .items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.quantity)
    }
}

async fn public_items(State(mock): State<Mock>) -> Json<Value> {
    let items = mock.lock().items.clone();
    Json(json!({ "items": items }))
}

async fn update_item(
    State(mock): State<Mock>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(update): Json<StockItem>,
) -> (StatusCode, Json<Value>) {
    if !headers.contains_key("X-CSRFToken") {
        mock.lock().missing_csrf += 1;
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "CSRF"})));
    }

    let mut inner = mock.lock();
    let Some(item) = inner.items.iter_mut().find(|item| item.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"})));
    };
    item.quantity = update.quantity;
    let body = serde_json::to_value(&*item).expect("item json");
    (StatusCode::OK, Json(body))
}

async fn save_order(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(order): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !headers.contains_key("X-CSRFToken") {
        mock.lock().missing_csrf += 1;
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "CSRF"})));
    }
    mock.lock().orders.push(order.clone());
    (StatusCode::CREATED, Json(order))
}

async fn order_history(State(mock): State<Mock>) -> Json<Value> {
    Json(Value::Array(mock.lock().history.clone()))
}

async fn spawn_mock(items: Vec<StockItem>) -> (Mock, String) {
    let mock = Mock::default();
    mock.lock().items = items;

    let router = Router::new()
        .route("/dashboard/api/public-items/", get(public_items))
        .route("/dashboard/api/items/{id}/update/", put(update_item))
        .route("/shop/api/save-order/", post(save_order))
        .route("/shop/api/get-order-history/", get(order_history))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock");
    });

    (mock, format!("http://{addr}/"))
}

fn unique_data_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!("ezfood_it_{tag}_{}_{nanos}", std::process::id()));
    dir
}

fn test_config(base_url: &str, data_dir: PathBuf, cooldown: Duration) -> ShopConfig {
    ShopConfig {
        api_base_url: base_url.parse().expect("base url"),
        session_cookie: None,
        csrf_token: Some(SecretString::from("test-csrf-token".to_string())),
        data_dir,
        request_timeout: Duration::from_secs(5),
        checkout_cooldown: cooldown,
    }
}

async fn new_app(base_url: &str, tag: &str, cooldown: Duration) -> ShopApp {
    let config = test_config(base_url, unique_data_dir(tag), cooldown);
    let mut app = ShopApp::new(&config).expect("app");
    app.bootstrap().await;
    app
}

fn card(id: Option<i64>, label: &str, units: i64) -> ProductCard {
    ProductCard {
        item_id: id.map(ItemId::new),
        label: label.to_string(),
        price: Price::from_units(units),
        image: String::new(),
    }
}

#[tokio::test]
async fn checkout_places_order_and_reconciles_inventory() {
    let (mock, base_url) = spawn_mock(vec![
        StockItem {
            id: 1,
            name: "samosa".to_string(),
            quantity: 5,
        },
        StockItem {
            id: 2,
            name: "juice".to_string(),
            quantity: 2,
        },
    ])
    .await;
    let data_dir = unique_data_dir("checkout");
    let config = test_config(&base_url, data_dir.clone(), Duration::ZERO);
    let mut app = ShopApp::new(&config).expect("app");
    app.bootstrap().await;

    let samosa = card(None, "Samosa", 20);
    let juice = card(None, "Juice", 50);
    app.add_to_cart(&samosa).await.expect("add samosa");
    app.increment("Samosa").await.expect("second samosa");
    app.add_to_cart(&juice).await.expect("add juice");

    let receipt = app.checkout("STU-042").await.expect("checkout");

    assert!(receipt.order_id.as_str().starts_with("CMS-"));
    assert_eq!(receipt.unit_count, 3);
    assert_eq!(receipt.total, Price::from_units(90));
    assert!(app.cart().is_empty());

    // The server saw exactly one order, carrying the student id and lines.
    let orders = mock.lock().orders.clone();
    assert_eq!(orders.len(), 1);
    let order = orders.first().expect("order");
    assert_eq!(order["student_id"], json!("STU-042"));
    assert_eq!(order["order_id"], json!(receipt.order_id.as_str()));
    assert_eq!(
        order["items"].as_array().map(std::vec::Vec::len),
        Some(2)
    );

    // Quantities were pushed as previous minus ordered.
    assert_eq!(mock.quantity("samosa"), Some(3));
    assert_eq!(mock.quantity("juice"), Some(1));
    assert_eq!(mock.lock().missing_csrf, 0);

    // The order tops the local history.
    assert_eq!(
        app.history().first().map(|o| o.order_id.as_str()),
        Some(receipt.order_id.as_str())
    );

    // The emptied cart and the new history entry reached disk.
    let cart_file = std::fs::read_to_string(data_dir.join("cart.json")).expect("cart file");
    let persisted_cart: Vec<serde_json::Value> =
        serde_json::from_str(&cart_file).expect("cart json");
    assert!(persisted_cart.is_empty());
    let history_file =
        std::fs::read_to_string(data_dir.join("order_history.json")).expect("history file");
    assert!(history_file.contains(receipt.order_id.as_str()));
}

#[tokio::test]
async fn stock_conflict_aborts_and_preserves_cart() {
    let (mock, base_url) = spawn_mock(vec![StockItem {
        id: 1,
        name: "cake".to_string(),
        quantity: 2,
    }])
    .await;
    let mut app = new_app(&base_url, "conflict", Duration::ZERO).await;

    let cake = card(None, "Cake 🍰", 60);
    app.add_to_cart(&cake).await.expect("add cake");
    app.increment("Cake 🍰").await.expect("second cake");

    // Someone else buys the stock before checkout revalidates.
    mock.set_quantity("cake", 1);

    let err = app.checkout("STU-042").await.expect_err("conflict");
    match err {
        ShopError::StockConflict { names } => assert_eq!(names, vec!["Cake 🍰".to_string()]),
        other => panic!("expected stock conflict, got {other}"),
    }

    // Nothing was submitted or cleared.
    assert!(mock.lock().orders.is_empty());
    assert_eq!(app.cart().unit_count(), 2);
    assert_eq!(mock.quantity("cake"), Some(1));
}

#[tokio::test]
async fn blank_student_id_and_empty_cart_are_rejected() {
    let (mock, base_url) = spawn_mock(vec![StockItem {
        id: 1,
        name: "samosa".to_string(),
        quantity: 5,
    }])
    .await;
    let mut app = new_app(&base_url, "validation", Duration::ZERO).await;

    let err = app.checkout("STU-042").await.expect_err("empty cart");
    assert!(matches!(err, ShopError::Validation(_)));
    assert_eq!(err.notice(), "Your cart is empty!");

    app.add_to_cart(&card(None, "Samosa", 20))
        .await
        .expect("add");
    let err = app.checkout("   ").await.expect_err("blank id");
    assert!(matches!(err, ShopError::Validation(_)));

    assert!(mock.lock().orders.is_empty());
    assert_eq!(app.cart().unit_count(), 1);
}

#[tokio::test]
async fn rapid_repeat_checkout_is_rejected() {
    let (mock, base_url) = spawn_mock(vec![StockItem {
        id: 1,
        name: "samosa".to_string(),
        quantity: 10,
    }])
    .await;
    let mut app = new_app(&base_url, "repeat", Duration::from_secs(60)).await;

    app.add_to_cart(&card(None, "Samosa", 20))
        .await
        .expect("add");
    app.checkout("STU-042").await.expect("first checkout");

    app.add_to_cart(&card(None, "Samosa", 20))
        .await
        .expect("add again");
    let err = app.checkout("STU-042").await.expect_err("second attempt");
    assert!(matches!(err, ShopError::CheckoutInProgress));

    // Only the first order reached the server.
    assert_eq!(mock.lock().orders.len(), 1);
}

#[tokio::test]
async fn server_order_log_replaces_local_history() {
    let (mock, base_url) = spawn_mock(vec![]).await;
    mock.lock().history = vec![
        json!({
            "orderId": "CMS-111111",
            "studentId": "STU-001",
            "date": 1_700_000_000_000_i64,
            "items": [{"name": "Samosa", "price": 20.0, "image": "", "quantity": 1}]
        }),
        json!({
            "orderId": "CMS-222222",
            "studentId": "STU-001",
            "date": 1_700_000_100_000_i64,
            "items": []
        }),
    ];

    let data_dir = unique_data_dir("history");
    std::fs::create_dir_all(&data_dir).expect("data dir");
    std::fs::write(
        data_dir.join("order_history.json"),
        r#"[{"orderId":"CMS-000000","studentId":"STU-001","date":1000,"items":[]}]"#,
    )
    .expect("seed local history");

    let config = test_config(&base_url, data_dir.clone(), Duration::ZERO);
    let mut app = ShopApp::new(&config).expect("app");
    app.bootstrap().await;

    // The server log wins, newest first, and is re-persisted.
    let ids: Vec<&str> = app.history().iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["CMS-222222", "CMS-111111"]);

    let persisted = std::fs::read_to_string(data_dir.join("order_history.json")).expect("file");
    assert!(persisted.contains("CMS-222222"));
    assert!(!persisted.contains("CMS-000000"));
}

#[tokio::test]
async fn id_added_lines_increment_and_check_out() {
    let (mock, base_url) = spawn_mock(vec![StockItem {
        id: 9,
        name: "thali".to_string(),
        quantity: 4,
    }])
    .await;
    let mut app = new_app(&base_url, "id_lines", Duration::ZERO).await;

    // The label never fuzzy-resolves to "thali"; the embedded id carries
    // the line through increment, revalidation and reconciliation.
    let combo = card(Some(9), "Special Combo", 80);
    app.add_to_cart(&combo).await.expect("add combo");
    app.increment("Special Combo").await.expect("increment");

    let receipt = app.checkout("STU-042").await.expect("checkout");
    assert_eq!(receipt.unit_count, 2);
    assert_eq!(mock.quantity("thali"), Some(2));
    assert_eq!(mock.lock().orders.len(), 1);
}

#[tokio::test]
async fn validation_rejections_do_not_arm_the_cooldown() {
    let (mock, base_url) = spawn_mock(vec![StockItem {
        id: 1,
        name: "samosa".to_string(),
        quantity: 5,
    }])
    .await;
    let mut app = new_app(&base_url, "cooldown", Duration::from_secs(60)).await;

    let err = app.checkout("STU-042").await.expect_err("empty cart");
    assert!(matches!(err, ShopError::Validation(_)));

    // The rejection above must not block the real attempt that follows.
    app.add_to_cart(&card(None, "Samosa", 20))
        .await
        .expect("add");
    app.checkout("STU-042").await.expect("checkout");
    assert_eq!(mock.lock().orders.len(), 1);
}

#[tokio::test]
async fn decorated_labels_resolve_to_inventory_records() {
    let (mock, base_url) = spawn_mock(vec![
        StockItem {
            id: 7,
            name: "cake".to_string(),
            quantity: 4,
        },
        StockItem {
            id: 8,
            name: "masala dosa".to_string(),
            quantity: 3,
        },
    ])
    .await;
    let mut app = new_app(&base_url, "labels", Duration::ZERO).await;

    // Emoji-decorated and partial labels both land on the right records.
    app.add_to_cart(&card(None, "Cake 🍰", 60)).await.expect("cake");
    app.add_to_cart(&card(None, "Dosa", 40)).await.expect("dosa");

    app.checkout("STU-042").await.expect("checkout");

    assert_eq!(mock.quantity("cake"), Some(3));
    assert_eq!(mock.quantity("masala dosa"), Some(2));
}
