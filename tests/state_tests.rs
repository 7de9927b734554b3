mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::FakeBilling;
use justpaypaddle::resources::*;
use justpaypaddle::state::{self, Change, Lifecycle, StateStore};
use justpaypaddle::{Context, Error, Provider};

const PRODUCT: &str = "paddle_product.pro";
const PRICE: &str = "paddle_price.monthly";

fn setup() -> (Arc<FakeBilling>, Provider, StateStore) {
    justpaypaddle::logger::setup_logger();
    let fake = Arc::new(FakeBilling::new());
    (fake.clone(), Provider::with_api(fake), StateStore::new())
}

fn pro_plan(name: &str) -> ProductModel {
    ProductModel {
        name: name.into(),
        tax_category: "saas".into(),
        ..ProductModel::default()
    }
}

fn monthly(currency: &str) -> PriceModel {
    PriceModel {
        product_id: "pro_01".into(),
        description: "Monthly".into(),
        unit_price: UnitPriceModel {
            amount: "2900".into(),
            currency_code: currency.into(),
        },
        ..PriceModel::default()
    }
}

#[tokio::test]
async fn test_apply_create_update_noop_delete() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let products = provider.products();

    let change = state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap();
    assert_eq!(change, Change::Created);
    assert_eq!(store.lifecycle(PRODUCT).await, Lifecycle::Present);

    let change = state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap();
    assert_eq!(change, Change::NoOp);

    let change = state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro+")))
        .await
        .unwrap();
    assert_eq!(change, Change::Updated);
    let recorded: ProductModel = store.record(PRODUCT).await.unwrap().unwrap();
    assert_eq!(recorded.name, "Pro+");

    let change = state::apply(&products, &store, &ctx, PRODUCT, None)
        .await
        .unwrap();
    assert_eq!(change, Change::Deleted);
    assert_eq!(store.lifecycle(PRODUCT).await, Lifecycle::Absent);
    assert_eq!(
        fake.calls(),
        vec!["create product", "update product", "update product"]
    );
}

#[tokio::test]
async fn test_apply_replaces_on_immutable_change() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let prices = provider.prices();

    state::apply(&prices, &store, &ctx, PRICE, Some(monthly("USD")))
        .await
        .unwrap();
    let first: PriceModel = store.record(PRICE).await.unwrap().unwrap();

    let change = state::apply(&prices, &store, &ctx, PRICE, Some(monthly("EUR")))
        .await
        .unwrap();
    assert_eq!(change, Change::Replaced);

    let second: PriceModel = store.record(PRICE).await.unwrap().unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.unit_price.currency_code, "EUR");
    // the old price was archived, not patched in place
    assert_eq!(
        fake.bodies("update price"),
        vec![serde_json::json!({"status": "archived"})]
    );
}

#[tokio::test]
async fn test_validation_failure_leaves_state_untouched() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();

    let err = state::apply(
        &provider.prices(),
        &store,
        &ctx,
        PRICE,
        Some(monthly("usd")),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.lifecycle(PRICE).await, Lifecycle::Absent);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_failed_create_leaves_address_absent() {
    let (_fake, provider, store) = setup();
    let (ctx, handle) = Context::cancellable();
    handle.cancel();

    let err = state::apply(&provider.products(), &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Cancelled));
    assert!(err.to_string().starts_with("create product failed for name 'Pro'"));
    assert_eq!(store.lifecycle(PRODUCT).await, Lifecycle::Absent);
}

#[tokio::test]
async fn test_failed_read_back_taints_price() {
    let (fake, provider, store) = setup();
    fake.omit_price_quantity();
    fake.fail_price_reads();
    let ctx = Context::background();

    let err = state::apply(&provider.prices(), &store, &ctx, PRICE, Some(monthly("USD")))
        .await
        .unwrap_err();

    match &err {
        Error::Incomplete { id, .. } => assert!(id.starts_with("pri_")),
        other => panic!("expected incomplete create, got {other}"),
    }
    assert_eq!(store.lifecycle(PRICE).await, Lifecycle::Tainted);
    let recorded: PriceModel = store.record(PRICE).await.unwrap().unwrap();
    assert!(recorded.id.is_some());
}

#[tokio::test]
async fn test_taint_forces_replacement() {
    let (_fake, provider, store) = setup();
    let ctx = Context::background();
    let products = provider.products();

    state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap();
    store.taint(PRODUCT).await.unwrap();

    let change = state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap();
    assert_eq!(change, Change::Replaced);
    assert_eq!(store.lifecycle(PRODUCT).await, Lifecycle::Present);
}

#[tokio::test]
async fn test_refresh_drops_vanished_record() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let products = provider.products();

    state::apply(&products, &store, &ctx, PRODUCT, Some(pro_plan("Pro")))
        .await
        .unwrap();
    assert!(state::refresh(&products, &store, &ctx, PRODUCT).await.unwrap());

    let recorded: ProductModel = store.record(PRODUCT).await.unwrap().unwrap();
    fake.forget("product", recorded.id.as_deref().unwrap());

    assert!(!state::refresh(&products, &store, &ctx, PRODUCT).await.unwrap());
    assert_eq!(store.lifecycle(PRODUCT).await, Lifecycle::Absent);
}

#[tokio::test]
async fn test_failed_refresh_keeps_prior_state() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let prices = provider.prices();

    state::apply(&prices, &store, &ctx, PRICE, Some(monthly("USD")))
        .await
        .unwrap();
    let before = store.get(PRICE).await;
    fake.fail_price_reads();

    let err = state::refresh(&prices, &store, &ctx, PRICE).await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 500, .. }));
    assert!(err.to_string().starts_with("read price failed for ID pri_"));
    assert_eq!(store.get(PRICE).await, before);
    assert_eq!(store.lifecycle(PRICE).await, Lifecycle::Present);
}

#[tokio::test]
async fn test_empty_price_overrides_stay_stable_across_refresh() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let prices = provider.prices();
    let mut desired = monthly("USD");
    desired.unit_price_overrides = Some(vec![]);

    let change = state::apply(&prices, &store, &ctx, PRICE, Some(desired.clone()))
        .await
        .unwrap();
    assert_eq!(change, Change::Created);

    for _ in 0..2 {
        assert!(state::refresh(&prices, &store, &ctx, PRICE).await.unwrap());
        let change = state::apply(&prices, &store, &ctx, PRICE, Some(desired.clone()))
            .await
            .unwrap();
        assert_eq!(change, Change::NoOp);
    }
    assert_eq!(fake.calls(), vec!["create price", "get price", "get price"]);
}

#[tokio::test]
async fn test_empty_discount_restriction_stays_stable_across_refresh() {
    let (fake, provider, store) = setup();
    let ctx = Context::background();
    let discounts = provider.discounts();
    let address = "paddle_discount.launch";
    let desired = DiscountModel {
        description: "Launch week".into(),
        discount_type: "percentage".into(),
        amount: "20".into(),
        restrict_to: Some(vec![]),
        ..DiscountModel::default()
    };

    state::apply(&discounts, &store, &ctx, address, Some(desired.clone()))
        .await
        .unwrap();
    let recorded: DiscountModel = store.record(address).await.unwrap().unwrap();
    // the API reports an empty restriction as null
    fake.set_field(
        "discount",
        recorded.id.as_deref().unwrap(),
        "restrict_to",
        serde_json::Value::Null,
    );

    assert!(state::refresh(&discounts, &store, &ctx, address).await.unwrap());
    let refreshed: DiscountModel = store.record(address).await.unwrap().unwrap();
    assert_eq!(refreshed.restrict_to, None);

    let change = state::apply(&discounts, &store, &ctx, address, Some(desired))
        .await
        .unwrap();
    assert_eq!(change, Change::NoOp);
    assert!(fake.bodies("update discount").is_empty());
}

#[tokio::test]
async fn test_import_then_apply_is_noop() {
    let (_fake, provider, store) = setup();
    let ctx = Context::background();
    let customers = provider.customers();
    let created = customers
        .create(
            &ctx,
            CustomerModel {
                email: "ops@example.com".into(),
                ..CustomerModel::default()
            },
        )
        .await
        .unwrap();
    let id = created.id.unwrap();

    let imported = state::import(&customers, &store, &ctx, "paddle_customer.ops", &id)
        .await
        .unwrap();
    assert_eq!(imported.email, "ops@example.com");

    let desired = CustomerModel {
        email: "ops@example.com".into(),
        ..CustomerModel::default()
    };
    let change = state::apply(&customers, &store, &ctx, "paddle_customer.ops", Some(desired))
        .await
        .unwrap();
    assert_eq!(change, Change::NoOp);

    let missing = state::import(&customers, &store, &ctx, "paddle_customer.gone", "ctm_99")
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
}
