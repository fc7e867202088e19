//! Integration tests for the storefront fixture catalog.
//!
//! Loads `fixtures/catalog/storefront.yml` and drives the cart, wishlist,
//! search, order and persistence paths end to end.

use std::path::PathBuf;

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use souq::{
    cart::{Cart, CartEvent, CartSnapshot},
    catalog::{Catalog, FixtureCatalog},
    orders::{Order, OrderHistory, OrderStatus, ShippingAddress},
    pricing::PricingPolicy,
    products::{Product, related_products},
    receipt::Receipt,
    search::{self, SearchRequest, SortKey, paginate},
    storage::{CART_KEY, LocalStorage, WISHLIST_KEY},
    wishlist::{Wishlist, WishlistSnapshot},
};

async fn storefront() -> Catalog {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures");

    Catalog::load(&FixtureCatalog::from_set(base, "storefront"), USD).await
}

fn ids<'p, 'a: 'p>(products: impl IntoIterator<Item = &'p Product<'a>>) -> Vec<&'p str> {
    products.into_iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn fixture_catalog_loads() {
    let catalog = storefront().await;

    assert_eq!(catalog.products().len(), 7);
    assert_eq!(catalog.categories().len(), 4);
    assert_eq!(catalog.brands().len(), 3);
    assert!(
        catalog
            .product("kettle")
            .is_some_and(|kettle| kettle.discount.is_none())
    );
}

#[tokio::test]
async fn adding_more_than_stock_stores_stock() -> TestResult {
    let catalog = storefront().await;
    let mut cart = Cart::new(catalog.currency());

    for product in catalog.products().iter().filter(|p| p.in_stock()) {
        cart.add(product, product.stock + 5, None);

        assert_eq!(
            cart.get(&product.id, None).map(|entry| entry.quantity()),
            Some(product.stock)
        );
    }

    let speaker = catalog.product("speaker").ok_or("speaker missing")?;

    assert_eq!(cart.add(speaker, 1, None), None);
    assert!(cart.get("speaker", None).is_none());

    Ok(())
}

#[tokio::test]
async fn repeated_adds_merge_per_variant() -> TestResult {
    let catalog = storefront().await;
    let headphones = catalog.product("headphones").ok_or("headphones missing")?;
    let mut cart = Cart::new(catalog.currency());

    cart.add(headphones, 2, Some("black"));
    cart.add(headphones, 1, Some("black"));
    cart.add(headphones, 1, Some("white"));

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.get("headphones", Some("black")).map(|e| e.quantity()), Some(3));

    // Only 4 in stock, already 3 of the black variant.
    cart.add(headphones, 3, Some("black"));

    assert_eq!(cart.get("headphones", Some("black")).map(|e| e.quantity()), Some(4));

    Ok(())
}

#[tokio::test]
async fn removing_unknown_entry_is_a_no_op() -> TestResult {
    let catalog = storefront().await;
    let cable = catalog.product("usb-cable").ok_or("cable missing")?;
    let mut cart = Cart::new(catalog.currency());
    cart.add(cable, 1, None);

    assert_eq!(cart.remove("does-not-exist", None), None);
    assert_eq!(cart.remove("usb-cable", Some("red")), None);
    assert_eq!(cart.len(), 1);

    assert_eq!(
        cart.remove("usb-cable", None),
        Some(CartEvent::Removed {
            product_id: "usb-cable".to_string(),
            variant: None,
        })
    );
    assert!(cart.is_empty());

    Ok(())
}

#[tokio::test]
async fn totals_follow_pricing_policy() -> TestResult {
    let catalog = storefront().await;
    let policy = PricingPolicy::default();
    let mut cart = Cart::new(catalog.currency());

    // 59.99 at 20% off is 47.99 (47.992 rounded); two cables are 10.00.
    cart.add(catalog.product("headphones").ok_or("missing")?, 1, None);
    cart.add(catalog.product("usb-cable").ok_or("missing")?, 2, None);

    let subtotal = cart.subtotal()?;
    let summary = policy.summarize(subtotal)?;

    assert_eq!(subtotal, Money::from_minor(57_99, USD));
    assert!(summary.free_shipping());
    assert_eq!(summary.tax, Money::from_minor(4_06, USD));
    assert_eq!(summary.total, Money::from_minor(62_05, USD));

    Ok(())
}

#[tokio::test]
async fn search_sorts_are_stable() {
    let catalog = storefront().await;

    let by_price = search::sort(catalog.products().iter().collect(), SortKey::PriceLow);
    let prices: Vec<i64> = by_price.iter().map(|p| p.price.to_minor_units()).collect();

    assert!(prices.windows(2).all(|pair| pair.first() <= pair.get(1)));

    let newest = search::sort(catalog.products().iter().collect(), SortKey::Newest);

    assert_eq!(
        ids(newest),
        vec![
            "headphones",
            "blender",
            "phone-a54",
            "phone-case",
            "speaker",
            "kettle",
            "usb-cable",
        ]
    );
}

#[tokio::test]
async fn search_request_combines_query_category_and_sort() {
    let catalog = storefront().await;

    let request = SearchRequest {
        query: "هاتف".to_string(),
        category: "phones".to_string(),
        sort: SortKey::PriceLow,
    };

    assert_eq!(ids(request.run(catalog.products())), vec!["phone-case", "phone-a54"]);

    let everything = SearchRequest::default().run(catalog.products());
    let page = paginate(&everything, 2, 5);

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_next());
}

#[tokio::test]
async fn home_sections_pick_flagged_products() -> TestResult {
    let catalog = storefront().await;
    let products = catalog.products();

    assert_eq!(ids(search::featured(products)), vec!["phone-a54"]);
    assert_eq!(ids(search::best_sellers(products)), vec!["phone-a54", "kettle"]);
    assert_eq!(ids(search::offers(products)), vec!["phone-a54", "headphones", "blender"]);
    assert_eq!(
        ids(search::latest(products, 2)),
        vec!["usb-cable", "blender"]
    );

    let phone = catalog.product("phone-a54").ok_or("phone missing")?;

    assert_eq!(ids(related_products(phone, products, 4)), vec!["phone-case"]);

    Ok(())
}

#[tokio::test]
async fn wishlist_add_is_idempotent() -> TestResult {
    let catalog = storefront().await;
    let blender = catalog.product("blender").ok_or("blender missing")?;
    let mut wishlist = Wishlist::new();

    assert!(wishlist.add(blender).is_some());
    assert!(wishlist.add(blender).is_none());
    assert_eq!(wishlist.len(), 1);

    wishlist.toggle(blender);

    assert!(wishlist.is_empty());

    Ok(())
}

#[tokio::test]
async fn cart_and_wishlist_survive_a_restart() -> TestResult {
    let catalog = storefront().await;
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());

    let mut cart = Cart::new(catalog.currency());
    cart.add(catalog.product("blender").ok_or("missing")?, 2, Some("red"));
    cart.add(catalog.product("kettle").ok_or("missing")?, 1, None);

    let mut wishlist = Wishlist::new();
    wishlist.add(catalog.product("phone-a54").ok_or("missing")?);

    storage.save(CART_KEY, &cart.snapshot())?;
    storage.save(WISHLIST_KEY, &wishlist.snapshot())?;

    let saved_cart: CartSnapshot = storage.load(CART_KEY)?.ok_or("cart not saved")?;
    let saved_wishlist: WishlistSnapshot = storage.load(WISHLIST_KEY)?.ok_or("wishlist not saved")?;

    let restored_cart = Cart::restore(&saved_cart, &catalog);
    let restored_wishlist = Wishlist::restore(&saved_wishlist, &catalog);

    assert_eq!(restored_cart.snapshot(), cart.snapshot());
    assert_eq!(restored_cart.subtotal()?, cart.subtotal()?);
    assert!(restored_wishlist.contains("phone-a54"));

    Ok(())
}

#[tokio::test]
async fn checkout_records_order_history() -> TestResult {
    let catalog = storefront().await;
    let dir = tempfile::tempdir()?;
    let storage = LocalStorage::new(dir.path());
    let policy = PricingPolicy::default();

    let mut cart = Cart::new(catalog.currency());
    cart.add(catalog.product("phone-case").ok_or("missing")?, 1, Some("clear"));

    let mut receipt = Vec::new();
    Receipt::from_cart(&cart, &policy)?.write_to(&mut receipt)?;

    assert!(String::from_utf8(receipt)?.contains("غطاء هاتف شفاف"));

    let order = Order::place(
        &cart,
        ShippingAddress {
            name: "زينب".to_string(),
            address: "شارع فلسطين".to_string(),
            city: "بغداد".to_string(),
            phone: "07801234567".to_string(),
        },
        &policy,
        "2026-06-01T09:30:00Z".parse()?,
    )?;

    // 9.99 + 5.00 shipping + 0.70 tax
    assert_eq!(order.total.to_string(), "15.69");
    assert_eq!(order.status, OrderStatus::Pending);

    OrderHistory::append(&storage, order)?;
    cart.clear();

    let reloaded = OrderHistory::try_load(&storage)?;

    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.orders().first().map(Order::item_count), Some(1));
    assert!(cart.is_empty());

    Ok(())
}
