use agro_client::{AgrofixClient, ClientConfig};
use agro_core::{
    submit_checkout, AdminApi, BuyerInfo, CartStore, Decimal, NewProduct, OrderStatus, Product,
    ProductId, StoreError, StorefrontApi, UnitType,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AgrofixClient {
    AgrofixClient::new(ClientConfig::new(server.uri())).unwrap()
}

fn admin_client_for(server: &MockServer) -> AgrofixClient {
    let config = ClientConfig::new(server.uri()).with_admin("admin", "s3cret");
    AgrofixClient::new(config).unwrap()
}

fn tomato() -> Product {
    Product::new(1, "Tomato", Decimal::new(10, 0), UnitType::Kg).with_stock(Decimal::new(50, 0))
}

fn buyer() -> BuyerInfo {
    BuyerInfo::new("A", "555", "X", "Cash on Delivery")
}

#[tokio::test]
async fn list_products_parses_and_rejects_invalid_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "id": 1,
                    "name": "Tomato",
                    "price_per_kg": "40.00",
                    "stock_kg": 120,
                    "min_order_kg": "0.5",
                    "unit_type": "kg",
                    "availability": true
                },
                {
                    "id": 2,
                    "name": "Broken",
                    "price_per_kg": -3,
                    "stock_kg": 10,
                    "min_order_kg": 1
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let products = client_for(&server).list_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId(1));
    assert_eq!(products[0].price_per_unit, Decimal::new(40, 0));
    assert_eq!(products[0].min_order_quantity, Decimal::new(5, 1));
}

#[tokio::test]
async fn checkout_posts_payload_and_clears_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(json!({
            "buyer_name": "A",
            "buyer_contact": "555",
            "delivery_address": "X",
            "payment_method": "cash_on_delivery",
            "items": [{ "id": 1, "quantity": 3.0, "price_per_kg": 10.0 }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Order placed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut cart = CartStore::new();
    cart.add_item(&tomato(), Decimal::new(3, 0));

    let receipt = submit_checkout(&client, &mut cart, &buyer()).await.unwrap();

    assert_eq!(receipt.message.as_deref(), Some("Order placed"));
    assert!(cart.is_empty());
}

#[tokio::test]
async fn rejected_order_keeps_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "success": false, "message": "Invalid phone" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut cart = CartStore::new();
    cart.add_item(&tomato(), Decimal::new(2, 0));

    let err = submit_checkout(&client, &mut cart, &buyer()).await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to place order: Invalid phone");
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Decimal::new(20, 0));
}

#[tokio::test]
async fn server_error_keeps_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut cart = CartStore::new();
    cart.add_item(&tomato(), Decimal::new(2, 0));

    let err = submit_checkout(&client, &mut cart, &buyer()).await.unwrap_err();

    assert!(matches!(err, StoreError::Api { status: 502, .. }));
    assert!(err.is_retryable());
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn orders_for_phone_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/orders"))
        .and(query_param("phone", "9876543210"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [{
                "id": 7,
                "buyer_name": "Asha",
                "buyer_contact": "9876543210",
                "delivery_address": "12 Market Road",
                "payment_method": "upi",
                "status": "pending",
                "total_amount": "80.00",
                "created_at": "2024-04-10T12:34:56.000Z",
                "cart_summary": []
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orders = client_for(&server)
        .orders_for_phone("9876543210")
        .await
        .unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn orders_for_phone_without_orders_key_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let orders = client_for(&server).orders_for_phone("1").await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn order_listings_skip_malformed_records() {
    let server = MockServer::start().await;
    let orders = json!({
        "orders": [
            {
                "id": 1, "buyer_name": "Asha", "buyer_contact": "9876543210",
                "delivery_address": "12 Market Road", "payment_method": "upi",
                "status": "confirmed", "total_amount": 40,
                "cart_summary": [{
                    "product_name": "Tomato", "quantity": 1, "unit_type": null,
                    "price_per_kg": 40, "total_price": 40
                }]
            },
            {
                "id": 2, "buyer_name": "Ravi", "buyer_contact": "9000000000",
                "delivery_address": "Sector 4", "payment_method": "cash_on_delivery",
                "total_amount": "lots"
            },
            {
                "id": 3, "buyer_name": "Meena", "buyer_contact": "9123456789",
                "delivery_address": "Lake View", "payment_method": "card",
                "total_amount": 90,
                "cart_summary": [{
                    "product_name": "Eggs", "quantity": 6, "unit_type": "dozen",
                    "price_per_kg": 15, "total_price": 90
                }]
            },
            "not an order"
        ]
    });
    Mock::given(method("GET"))
        .and(path("/api/user/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders))
        .expect(1)
        .mount(&server)
        .await;

    let mine = client_for(&server).orders_for_phone("555").await.unwrap();
    let ids: Vec<i64> = mine.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(mine[0].cart_summary[0].unit_type, None);
    assert_eq!(mine[1].cart_summary[0].unit_type, None);

    let all = admin_client_for(&server).list_all_orders().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn admin_calls_send_credential_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/orders"))
        .and(header("username", "admin"))
        .and(header("password", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orders": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/orders/42/status"))
        .and(header("username", "admin"))
        .and(body_json(json!({ "status": "delivered" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/9"))
        .and(header("password", "s3cret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = admin_client_for(&server);
    assert!(client.list_all_orders().await.unwrap().is_empty());
    client
        .update_order_status(42, &OrderStatus::Delivered)
        .await
        .unwrap();
    client.delete_product(ProductId(9)).await.unwrap();
}

#[tokio::test]
async fn add_product_posts_new_product() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(header("username", "admin"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let product: NewProduct = serde_json::from_value(json!({
        "name": "Spinach",
        "price_per_kg": 30,
        "stock_kg": 15,
        "min_order_kg": 1,
        "unit_type": "bunch"
    }))
    .unwrap();

    admin_client_for(&server).add_product(&product).await.unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let sent = request.body_json::<serde_json::Value>().unwrap();
    assert_eq!(sent["name"], "Spinach");
    assert_eq!(sent["unit_type"], "bunch");
    assert_eq!(sent["price_per_kg"], json!(30.0));
}

#[tokio::test]
async fn not_found_maps_to_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
        )
        .mount(&server)
        .await;

    let err = admin_client_for(&server)
        .delete_product(ProductId(404))
        .await
        .unwrap_err();

    match err {
        StoreError::NotFound(message) => assert_eq!(message, "Product not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}
