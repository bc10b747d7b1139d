//! End-to-end flows against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`sf-cli migrate`)
//! - A seeded catalog with at least one product (`sf-cli seed catalog <file>`)
//! - The storefront running (`cargo run -p shopfront-storefront`)
//!
//! Run with: `cargo test -p shopfront-integration-tests -- --ignored`
//!
//! Login and register are rate limited per client address, so the auth
//! helpers wait and retry on `429 Too Many Requests`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, redirect::Policy};

use shopfront_integration_tests::storefront_base_url;

/// A client that keeps cookies but doesn't follow redirects.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A username that won't collide between runs.
fn unique_username() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("it_{nanos}")
}

/// POST credentials to an auth endpoint, waiting out the rate limiter.
async fn post_credentials(client: &Client, url: &str, username: &str) -> Response {
    for _ in 0..10 {
        let resp = client
            .post(url)
            .form(&[("username", username), ("password", "correct horse battery")])
            .send()
            .await
            .expect("Failed to send credentials");
        if resp.status() != StatusCode::TOO_MANY_REQUESTS {
            return resp;
        }
        tokio::time::sleep(Duration::from_secs(6)).await;
    }
    panic!("auth endpoint stayed rate limited: {url}");
}

async fn register_and_login(client: &Client, base_url: &str, username: &str) {
    let resp = post_credentials(client, &format!("{base_url}/auth/register"), username).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/auth/login");

    let resp = post_credentials(
        client,
        &format!("{base_url}/auth/login?next=%2Fcart"),
        username,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/cart");
}

/// A logged-in client for a fresh account.
async fn logged_in_client(base_url: &str) -> Client {
    let client = client();
    register_and_login(&client, base_url, &unique_username()).await;
    client
}

/// The ID that follows `prefix` in the first matching link or form action.
fn id_after(body: &str, prefix: &str) -> Option<String> {
    body.split(prefix)
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .map(str::to_string)
}

/// The first product offered on the home page.
async fn first_product_id(client: &Client, base_url: &str) -> String {
    let body = client
        .get(base_url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    id_after(&body, "/cart/add/").expect("home page lists at least one product")
}

async fn get_page(client: &Client, url: String) -> String {
    let resp = client.get(url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.text().await.unwrap()
}

async fn post(client: &Client, url: String) -> Response {
    client.post(url).send().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_register_login_and_fill_cart() {
    let client = client();
    let base_url = storefront_base_url();
    register_and_login(&client, &base_url, &unique_username()).await;

    let home = client.get(&base_url).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    let body = home.text().await.unwrap();
    assert!(body.contains("Welcome back"));

    // First product link on the home page
    let product_id = body
        .split("/cart/add/")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("home page lists at least one product")
        .to_string();

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart/add/{product_id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let cart = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Incremented quantity for"));
    assert!(cart.contains(r#"name="quantity" value="2""#));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_bad_password_rerenders_login() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("username", "nobody_here"), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Invalid username or password.")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_logout_ends_session() {
    let client = client();
    let base_url = storefront_base_url();
    register_and_login(&client, &base_url, &unique_username()).await;

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/auth/login?next=%2Fcart");
}

// ============================================================================
// Cart quantities
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_decrease_stops_at_one() {
    let base_url = storefront_base_url();
    let client = logged_in_client(&base_url).await;
    let product_id = first_product_id(&client, &base_url).await;

    post(&client, format!("{base_url}/cart/add/{product_id}")).await;
    let cart = get_page(&client, format!("{base_url}/cart")).await;
    let entry_id = id_after(&cart, "/cart/remove/").unwrap();

    for _ in 0..2 {
        let resp = post(&client, format!("{base_url}/cart/decrease/{entry_id}")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/cart");
    }

    let cart = get_page(&client, format!("{base_url}/cart")).await;
    assert_eq!(id_after(&cart, "/cart/remove/").as_deref(), Some(entry_id.as_str()));
    assert!(cart.contains(r#"name="quantity" value="1""#));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_update_to_zero_removes_line() {
    let base_url = storefront_base_url();
    let client = logged_in_client(&base_url).await;
    let product_id = first_product_id(&client, &base_url).await;

    post(&client, format!("{base_url}/cart/add/{product_id}")).await;
    let cart = get_page(&client, format!("{base_url}/cart")).await;
    let entry_id = id_after(&cart, "/cart/update/").unwrap();

    let resp = client
        .post(format!("{base_url}/cart/update/{entry_id}"))
        .form(&[("quantity", "5")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cart = get_page(&client, format!("{base_url}/cart")).await;
    assert!(cart.contains(r#"name="quantity" value="5""#));

    client
        .post(format!("{base_url}/cart/update/{entry_id}"))
        .form(&[("quantity", "0")])
        .send()
        .await
        .unwrap();

    let cart = get_page(&client, format!("{base_url}/cart")).await;
    assert!(cart.contains("flash-warning"));
    assert!(cart.contains("Item removed from cart because quantity was set to 0."));
    assert!(cart.contains("Your cart is empty."));
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_other_users_entries_are_not_found() {
    let base_url = storefront_base_url();
    let alice = logged_in_client(&base_url).await;
    let bob = logged_in_client(&base_url).await;
    let product_id = first_product_id(&alice, &base_url).await;

    post(&alice, format!("{base_url}/cart/add/{product_id}")).await;
    post(&alice, format!("{base_url}/wishlist/add/{product_id}")).await;
    let cart_entry = id_after(
        &get_page(&alice, format!("{base_url}/cart")).await,
        "/cart/remove/",
    )
    .unwrap();
    let wishlist_entry = id_after(
        &get_page(&alice, format!("{base_url}/wishlist")).await,
        "/wishlist/remove/",
    )
    .unwrap();

    for url in [
        format!("{base_url}/cart/remove/{cart_entry}"),
        format!("{base_url}/cart/increase/{cart_entry}"),
        format!("{base_url}/cart/decrease/{cart_entry}"),
        format!("{base_url}/wishlist/remove/{wishlist_entry}"),
    ] {
        let resp = post(&bob, url.clone()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{url}");
    }

    let resp = bob
        .post(format!("{base_url}/cart/update/{cart_entry}"))
        .form(&[("quantity", "0")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Alice's entries are untouched
    let cart = get_page(&alice, format!("{base_url}/cart")).await;
    assert!(cart.contains(r#"name="quantity" value="1""#));
    let wishlist = get_page(&alice, format!("{base_url}/wishlist")).await;
    assert_eq!(
        id_after(&wishlist, "/wishlist/remove/").as_deref(),
        Some(wishlist_entry.as_str())
    );
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_wishlist_add_twice_keeps_one_entry() {
    let base_url = storefront_base_url();
    let client = logged_in_client(&base_url).await;
    let product_id = first_product_id(&client, &base_url).await;

    post(&client, format!("{base_url}/wishlist/add/{product_id}")).await;
    let wishlist = get_page(&client, format!("{base_url}/wishlist")).await;
    assert!(wishlist.contains("to wishlist."));

    let resp = post(&client, format!("{base_url}/wishlist/add/{product_id}")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let wishlist = get_page(&client, format!("{base_url}/wishlist")).await;
    assert!(wishlist.contains("is already in your wishlist."));
    assert_eq!(wishlist.matches("/wishlist/remove/").count(), 1);
}

// ============================================================================
// Login gate
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_add_while_logged_out_returns_to_product_after_login() {
    let base_url = storefront_base_url();
    let client = client();
    let product_id = first_product_id(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/cart/add/{product_id}"))
        .header("referer", format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let login = resp.headers()["location"].to_str().unwrap().to_string();
    assert_eq!(
        login,
        format!("/auth/login?next=%2Fproducts%2F{product_id}")
    );

    let username = unique_username();
    let resp = post_credentials(&client, &format!("{base_url}/auth/register"), &username).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = post_credentials(&client, &format!("{base_url}{login}"), &username).await;
    let next = resp.headers()["location"].to_str().unwrap().to_string();
    assert_eq!(next, format!("/products/{product_id}"));

    get_page(&client, format!("{base_url}{next}")).await;
}
