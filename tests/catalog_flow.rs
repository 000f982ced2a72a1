mod common;

use warehouse_api::{
    dto::{
        categories::CategoryRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        sales::CreateSaleRequest,
    },
    error::AppError,
    routes::params::{DirectoryQuery, ProductQuery},
    services::{
        category_service, customer_service, product_service, sale_service, supplier_service,
    },
};

use common::{
    acting_admin, create_customer, create_product, create_supplier, directory_request,
    setup_state, stock_of, unique,
};

const DESCRIPTION: &str = "Long enough description for a catalog entry in tests.";

#[tokio::test]
async fn category_lifecycle_and_guards() -> anyhow::Result<()> {
    let Some((state, _mailer)) = setup_state().await? else {
        return Ok(());
    };
    let admin = acting_admin();
    let name = unique("Tools");

    let category = category_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: name.clone(),
            description: DESCRIPTION.into(),
        },
    )
    .await?
    .data
    .expect("category");

    let duplicate = category_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: name.clone(),
            description: DESCRIPTION.into(),
        },
    )
    .await
    .expect_err("duplicate name");
    assert!(matches!(duplicate, AppError::Conflict(_)));

    let unchanged = category_service::update_category(
        &state,
        &admin,
        category.id,
        CategoryRequest {
            name,
            description: DESCRIPTION.into(),
        },
    )
    .await
    .expect_err("no changes");
    assert!(matches!(unchanged, AppError::Conflict(_)));

    let supplier_id = create_supplier(&state, &admin).await?;
    let product = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: unique("Saw"),
            description: DESCRIPTION.into(),
            price: 900,
            quantity: 3,
            category_id: category.id,
            supplier_id,
        },
    )
    .await?
    .data
    .expect("product");

    let detail = category_service::get_category(&state, category.id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.products.len(), 1);
    assert_eq!(detail.products[0].id, product.id);

    let in_use = category_service::delete_category(&state, &admin, category.id)
        .await
        .expect_err("category has products");
    assert!(matches!(in_use, AppError::Conflict(_)));

    product_service::delete_product(&state, &admin, product.id).await?;
    category_service::delete_category(&state, &admin, category.id).await?;
    let gone = category_service::get_category(&state, category.id)
        .await
        .expect_err("deleted");
    assert!(matches!(gone, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn product_create_list_update_and_delete_guards() -> anyhow::Result<()> {
    let Some((state, _mailer)) = setup_state().await? else {
        return Ok(());
    };
    let admin = acting_admin();
    let product_id = create_product(&state, &admin, 700, 5).await?;
    let product = product_service::get_product(&state, product_id)
        .await?
        .data
        .expect("product");

    let unknown_supplier = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: unique("Drill"),
            description: DESCRIPTION.into(),
            price: 100,
            quantity: 1,
            category_id: product.category_id,
            supplier_id: uuid::Uuid::new_v4(),
        },
    )
    .await
    .expect_err("unknown supplier");
    assert!(matches!(unknown_supplier, AppError::NotFound(_)));

    let listed = product_service::list_products(
        &state,
        ProductQuery {
            category_id: Some(product.category_id),
            price_min: Some(700),
            price_max: Some(700),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category_name, product.category_name);
    assert_eq!(listed[0].supplier_name, "Test Supplier");

    let same = UpdateProductRequest {
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        category_id: product.category_id,
        supplier_id: product.supplier_id,
    };
    let unchanged = product_service::update_product(&state, &admin, product_id, same)
        .await
        .expect_err("no changes");
    assert!(matches!(unchanged, AppError::Conflict(_)));

    let repriced = product_service::update_product(
        &state,
        &admin,
        product_id,
        UpdateProductRequest {
            name: product.name.clone(),
            description: product.description.clone(),
            price: 800,
            category_id: product.category_id,
            supplier_id: product.supplier_id,
        },
    )
    .await?
    .data
    .expect("updated");
    assert_eq!(repriced.price, 800);
    assert_eq!(repriced.quantity, 5);

    let customer_id = create_customer(&state, &admin).await?;
    sale_service::create_sale(
        &state,
        &admin,
        CreateSaleRequest {
            customer_id,
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let sold = product_service::delete_product(&state, &admin, product_id)
        .await
        .expect_err("product has sales");
    assert!(matches!(sold, AppError::Conflict(_)));

    let supplied = supplier_service::delete_supplier(&state, &admin, product.supplier_id)
        .await
        .expect_err("supplier has products");
    assert!(matches!(supplied, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn supplier_update_rejects_no_change_and_taken_phone() -> anyhow::Result<()> {
    let Some((state, _mailer)) = setup_state().await? else {
        return Ok(());
    };
    let admin = acting_admin();
    let request = directory_request("Dock Supplies");
    let supplier = supplier_service::create_supplier(&state, &admin, request.clone())
        .await?
        .data
        .expect("supplier");

    let unchanged = supplier_service::update_supplier(&state, &admin, supplier.id, request.clone())
        .await
        .expect_err("no changes");
    assert!(matches!(unchanged, AppError::Conflict(_)));

    let customer = directory_request("Phone Clash");
    customer_service::create_customer(&state, &admin, customer.clone()).await?;
    let mut clash = request.clone();
    clash.phone_number = customer.phone_number;
    let taken = supplier_service::update_supplier(&state, &admin, supplier.id, clash)
        .await
        .expect_err("phone taken");
    assert!(matches!(taken, AppError::Conflict(ref m) if m == "This phone number is already in use."));

    let mut moved = request;
    moved.city = "Leeds".into();
    let updated = supplier_service::update_supplier(&state, &admin, supplier.id, moved)
        .await?
        .data
        .expect("updated");
    assert_eq!(updated.address().map(|a| a.city.as_str()), Some("Leeds"));

    supplier_service::delete_supplier(&state, &admin, supplier.id).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_customer_restores_undelivered_stock() -> anyhow::Result<()> {
    let Some((state, _mailer)) = setup_state().await? else {
        return Ok(());
    };
    let admin = acting_admin();
    let product_id = create_product(&state, &admin, 4, 20).await?;
    let customer_id = create_customer(&state, &admin).await?;

    let mut orders = Vec::new();
    for quantity in [3, 5] {
        let created = sale_service::create_sale(
            &state,
            &admin,
            CreateSaleRequest {
                customer_id,
                product_id,
                quantity,
            },
        )
        .await?;
        orders.push(created.data.expect("created").order_id);
    }
    sale_service::toggle_status(&state, &admin, orders[1]).await?;
    assert_eq!(stock_of(&state, product_id).await?, 12);

    let detail = customer_service::get_customer(&state, customer_id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.total_orders, 2);

    customer_service::delete_customer(&state, &admin, customer_id).await?;
    // The placed order of 3 comes back; the delivered 5 stays sold.
    assert_eq!(stock_of(&state, product_id).await?, 15);

    let gone = sale_service::get_sale(&state, orders[0])
        .await
        .expect_err("order removed with customer");
    assert!(matches!(gone, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn most_sold_to_ranks_by_order_count() -> anyhow::Result<()> {
    let Some((state, _mailer)) = setup_state().await? else {
        return Ok(());
    };
    let admin = acting_admin();
    let product_id = create_product(&state, &admin, 1, 100).await?;
    let occasional = create_customer(&state, &admin).await?;
    let regular = create_customer(&state, &admin).await?;

    for (customer_id, orders) in [(occasional, 1), (regular, 3)] {
        for _ in 0..orders {
            sale_service::create_sale(
                &state,
                &admin,
                CreateSaleRequest {
                    customer_id,
                    product_id,
                    quantity: 1,
                },
            )
            .await?;
        }
    }

    // Walk every page so earlier runs sharing the database do not matter.
    // A concurrent deletion can shift a page boundary, so retry a missed walk.
    let mut ranked = Vec::new();
    for _ in 0..3 {
        ranked = ranked_customer_ids(&state).await?;
        if ranked.contains(&regular) && ranked.contains(&occasional) {
            break;
        }
    }

    let position = |id| ranked.iter().position(|c| *c == id).expect("listed");
    assert!(position(regular) < position(occasional));

    Ok(())
}

async fn ranked_customer_ids(
    state: &warehouse_api::state::AppState,
) -> anyhow::Result<Vec<uuid::Uuid>> {
    let mut ranked = Vec::new();
    let mut offset = 0;
    loop {
        let page = customer_service::list_customers(
            state,
            DirectoryQuery {
                most_sold_to: Some(true),
                limit: Some(100),
                off_set: Some(offset),
            },
        )
        .await?;
        let count = page.meta.expect("meta").count;
        ranked.extend(page.data.expect("customers").into_iter().map(|c| c.id));
        offset += 100;
        if offset >= count {
            return Ok(ranked);
        }
    }
}
