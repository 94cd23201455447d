use chrono::{Days, NaiveDate, Timelike};
use refill_shop_api::{
    config::DEFAULT_TIMEZONE,
    db::{create_orm_conn, run_migrations},
    domain::{
        ledger::Reconciliation,
        orders::{self, OrderLine},
        time_slots,
    },
    dto::{
        auth::RegisterRequest,
        cart::{AddToCartRequest, CartCheckoutRequest, SelectSlotRequest},
        containers::ContainerRequest,
        membership::UpdateMembershipRequest,
        orders::{ContainerInfo, CreateOrderRequest, UpdateOrderStatusRequest},
        products::CreateProductRequest,
        reviews::CreateReviewRequest,
        stock_requests::CreateStockRequest,
    },
    entity::{AuditLogs, audit_logs, container_storage, order_items},
    error::AppError,
    middleware::auth::AuthUser,
    models::{RequestSource, StaffStatusCheck, UserRole},
    routes::params::OrderListQuery,
    services::{
        auth_service, cart_service, container_service, membership_service, order_service,
        product_service, review_service, stock_request_service,
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    Statement,
};
use uuid::Uuid;

// Integration flow: register -> cart -> checkout -> group -> reconcile containers -> cancel.
#[tokio::test]
async fn checkout_reconcile_and_cancel_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let Some((delivery_date, slot_id)) = bookable_target(&state) else {
        eprintln!("Skipping test: no bookable slot left today or tomorrow.");
        return Ok(());
    };

    seed_code(&state, "T-1001", "customer").await?;
    seed_code(&state, "T-STAFF", "staff").await?;

    let customer = register(&state, "customer@example.com", "T-1001").await?;
    let staff = register(&state, "staff@example.com", "T-STAFF").await?;
    assert_eq!(customer.role, UserRole::Customer);
    assert_eq!(staff.role, UserRole::Staff);

    // A claimed code cannot be used twice.
    let reused = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "other@example.com".into(),
            password: "password123".into(),
            verification_code: "T-1001".into(),
        },
    )
    .await;
    assert!(matches!(reused, Err(AppError::Conflict(_))));

    // Catalog is staff-managed.
    let denied = product_service::create_product(&state, &customer, rice_request()).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    product_service::create_product(&state, &staff, rice_request()).await?;

    // Cart: 2 batches at 3000 each.
    let view = cart_service::add_item(
        &state,
        &customer,
        AddToCartRequest {
            product_id: "GR-RI-001".into(),
            quantity: 2,
        },
    )
    .await?
    .data
    .expect("cart view");
    assert_eq!(view.total_price, 6000);

    let empty_slot = cart_service::checkout(&state, &customer, CartCheckoutRequest::default()).await;
    assert!(matches!(empty_slot, Err(AppError::BadRequest(_))));

    cart_service::select_slot(
        &state,
        &customer,
        SelectSlotRequest {
            slot_id: Some(slot_id.clone()),
            date: Some(delivery_date),
        },
    )
    .await?;

    let created = cart_service::checkout(
        &state,
        &customer,
        CartCheckoutRequest {
            container_info: Some(ContainerInfo {
                container_count: 3,
                needs_washing: true,
            }),
        },
    )
    .await?
    .data
    .expect("order created");
    assert_eq!(created.total_price, 6000);
    let key = created.delivery_slot_key.clone();
    assert_eq!(key, format!("{}_{slot_id}", delivery_date.format("%Y-%m-%d")));

    let cart_after = cart_service::get_cart(&state, &customer)
        .await?
        .data
        .expect("cart view");
    assert!(cart_after.lines.is_empty());
    assert!(cart_after.selection.is_none());

    // One order per customer per delivery date.
    let second = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            items: vec![OrderLine {
                product_id: "GR-RI-001".into(),
                quantity: 1,
            }],
            delivery_date,
            delivery_slot_id: slot_id.clone(),
            container_info: None,
        },
    )
    .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let groups = order_service::list_order_groups(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("groups");
    assert_eq!(groups.user_role, UserRole::Customer);
    assert_eq!(groups.groups.len(), 1);
    assert_eq!(groups.groups[0].total_price, 6000);
    assert!(groups.groups[0].can_cancel);

    let staff_groups = order_service::list_order_groups(&state, &staff, OrderListQuery::default())
        .await?
        .data
        .expect("groups");
    assert!(staff_groups.groups.iter().all(|g| !g.can_cancel));

    // Per-row status update by staff.
    let row_id = groups.groups[0].items[0].id;
    let updated = order_service::update_order_status(
        &state,
        &staff,
        row_id,
        UpdateOrderStatusRequest {
            staff_status_check: StaffStatusCheck::Fulfilled,
        },
    )
    .await?
    .data
    .expect("order item");
    assert_eq!(updated.staff_status_check, StaffStatusCheck::Fulfilled);

    let missing_row = order_service::update_order_status(
        &state,
        &staff,
        Uuid::new_v4(),
        UpdateOrderStatusRequest {
            staff_status_check: StaffStatusCheck::Cancelled,
        },
    )
    .await;
    assert!(matches!(missing_row, Err(AppError::NotFound)));

    // Containers: request row is pending until staff counts it.
    let todo = container_service::get_staff_todo_data(&state, &staff)
        .await?
        .data
        .expect("todo data");
    assert_eq!(todo.summary.pending_count, 1);
    assert_eq!(todo.summary.total_requested, 3);
    let request_row = todo.container_items[0].id;

    let balance = container_service::get_balance(&state, &customer)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.balance, 0);

    let reconciled = container_service::reconcile(
        &state,
        &staff,
        request_row,
        Reconciliation {
            incoming_count: Some(3),
            outgoing_count: Some(1),
            staff_comment: Some("one returned washed".into()),
        },
    )
    .await?
    .data
    .expect("reconciliation");
    assert_eq!(reconciled.item.actual_container_count, Some(3));
    let sibling = reconciled.outgoing_container_id.expect("outgoing row created");

    // Re-reconciling updates the same sibling instead of adding another.
    let again = container_service::reconcile(
        &state,
        &staff,
        request_row,
        Reconciliation {
            outgoing_count: Some(2),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("reconciliation");
    assert_eq!(again.outgoing_container_id, Some(sibling));

    let balance = container_service::get_balance(&state, &customer)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.balance, 1);

    let all = container_service::get_all_balances(&state, &staff)
        .await?
        .data
        .expect("all balances");
    assert_eq!(all.total_balance, 1);

    let missing = container_service::reconcile(
        &state,
        &staff,
        Uuid::new_v4(),
        Reconciliation {
            incoming_count: Some(1),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Reviews: one per delivery.
    let review = CreateReviewRequest {
        delivery_slot_key: key.clone(),
        rating: 5,
        content: "Fresh and on time".into(),
    };
    review_service::create_review(&state, &customer, review).await?;
    let duplicate = review_service::create_review(
        &state,
        &customer,
        CreateReviewRequest {
            delivery_slot_key: key.clone(),
            rating: 4,
            content: "Second thoughts".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Cancellation is customer-only and removes every row of the checkout.
    let staff_cancel = order_service::cancel_order(&state, &staff, &key).await;
    assert!(matches!(staff_cancel, Err(AppError::Forbidden)));

    let cancelled = order_service::cancel_order(&state, &customer, &key)
        .await?
        .data
        .expect("cancel response");
    assert_eq!(cancelled.deleted_count, 1);

    let groups = order_service::list_order_groups(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("groups");
    assert!(groups.groups.is_empty());

    let not_found = order_service::cancel_order(&state, &customer, &key).await;
    assert!(matches!(not_found, Err(AppError::NotFound)));

    // Reconciled ledger rows survive cancellation.
    let balance = container_service::get_balance(&state, &customer)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.balance, 1);

    let cancel_entries = AuditLogs::find()
        .filter(audit_logs::Column::Action.eq("order_cancel"))
        .count(&state.orm)
        .await?;
    assert_eq!(cancel_entries, 1);

    concurrent_checkouts_keep_one_order_per_date(&state, delivery_date, &slot_id).await?;
    cancelling_one_group_leaves_the_others(&state, &staff, delivery_date, &slot_id).await?;
    let refill_customer =
        refill_tickets_and_new_customer_calls(&state, &staff, delivery_date, &slot_id).await?;
    stock_requests_reach_staff(&state, &staff, &refill_customer).await?;

    Ok(())
}

async fn concurrent_checkouts_keep_one_order_per_date(
    state: &AppState,
    delivery_date: NaiveDate,
    slot_id: &str,
) -> anyhow::Result<()> {
    seed_code(state, "T-1003", "customer").await?;
    let customer = register(state, "racer@example.com", "T-1003").await?;

    let request = || CreateOrderRequest {
        items: vec![OrderLine {
            product_id: "GR-RI-001".into(),
            quantity: 1,
        }],
        delivery_date,
        delivery_slot_id: slot_id.to_string(),
        container_info: None,
    };
    let (first, second) = tokio::join!(
        order_service::create_order(state, &customer, request()),
        order_service::create_order(state, &customer, request()),
    );

    assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        matches!(first, Err(AppError::Conflict(_))) || matches!(second, Err(AppError::Conflict(_)))
    );

    let rows = order_service::list_orders(state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(rows.orders.len(), 1);
    Ok(())
}

async fn cancelling_one_group_leaves_the_others(
    state: &AppState,
    staff: &AuthUser,
    delivery_date: NaiveDate,
    slot_id: &str,
) -> anyhow::Result<()> {
    seed_code(state, "T-1002", "customer").await?;
    let customer = register(state, "second@example.com", "T-1002").await?;
    product_service::create_product(state, staff, oats_request()).await?;

    let placed = order_service::create_order(
        state,
        &customer,
        CreateOrderRequest {
            items: vec![
                OrderLine {
                    product_id: "GR-RI-001".into(),
                    quantity: 1,
                },
                OrderLine {
                    product_id: "GR-OA-001".into(),
                    quantity: 2,
                },
            ],
            delivery_date,
            delivery_slot_id: slot_id.to_string(),
            container_info: Some(ContainerInfo {
                container_count: 2,
                needs_washing: false,
            }),
        },
    )
    .await?
    .data
    .expect("order created");
    assert_eq!(placed.total_price, 3000 + 2 * 4500);

    let other_date = delivery_date
        .checked_add_days(Days::new(2))
        .expect("valid date");
    let other_key = seed_order_group(state, staff, &customer, other_date).await?;

    let cancelled = order_service::cancel_order(state, &customer, &placed.delivery_slot_key)
        .await?
        .data
        .expect("cancel response");
    assert_eq!(cancelled.deleted_count, 2);

    let remaining = order_service::list_orders(state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(remaining.orders.len(), 1);
    assert_eq!(remaining.orders[0].delivery_slot_key, other_key);

    let todo = container_service::get_staff_todo_data(state, staff)
        .await?
        .data
        .expect("todo data");
    let requests: Vec<_> = todo
        .container_items
        .iter()
        .filter(|item| item.orderer_code == customer.orderer_code)
        .collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].delivery_slot_key, other_key);
    Ok(())
}

async fn refill_tickets_and_new_customer_calls(
    state: &AppState,
    staff: &AuthUser,
    delivery_date: NaiveDate,
    slot_id: &str,
) -> anyhow::Result<AuthUser> {
    seed_code(state, "T-1004", "customer").await?;
    let customer = register(state, "refill@example.com", "T-1004").await?;
    let request = |container_count| ContainerRequest {
        delivery_date,
        delivery_slot_id: slot_id.to_string(),
        container_count,
        needs_washing: true,
    };

    let membership = membership_service::get_membership(state, &customer)
        .await?
        .data
        .expect("membership");
    assert_eq!(membership.refill_tickets, 0);
    let no_ticket = membership_service::use_refill_ticket(state, &customer, request(2)).await;
    assert!(matches!(no_ticket, Err(AppError::BadRequest(_))));

    let self_grant = membership_service::update_membership(
        state,
        &customer,
        &customer.orderer_code,
        UpdateMembershipRequest {
            refill_tickets: Some(5),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(self_grant, Err(AppError::Forbidden)));

    let unknown = membership_service::update_membership(
        state,
        staff,
        "NO-SUCH-CODE",
        UpdateMembershipRequest::default(),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    let granted = membership_service::update_membership(
        state,
        staff,
        &customer.orderer_code,
        UpdateMembershipRequest {
            delivery_fee: Some(3000),
            refill_tickets: Some(1),
        },
    )
    .await?
    .data
    .expect("membership");
    assert_eq!(granted.refill_tickets, 1);

    let used = membership_service::use_refill_ticket(state, &customer, request(2))
        .await?
        .data
        .expect("ticket result");
    assert_eq!(used.remaining_tickets, 0);
    assert_eq!(used.item.source, RequestSource::RefillTicket);
    assert_eq!(used.item.requested_container_count, 2);
    assert_eq!(used.item.actual_container_count, None);

    let exhausted = membership_service::use_refill_ticket(state, &customer, request(1)).await;
    assert!(matches!(exhausted, Err(AppError::BadRequest(_))));

    let membership = membership_service::get_membership(state, &customer)
        .await?
        .data
        .expect("membership");
    assert_eq!(membership.refill_tickets, 0);
    assert_eq!(membership.delivery_fee, 3000);

    let call = container_service::request_new_customer_call(state, &customer, request(5))
        .await?
        .data
        .expect("call row");
    assert_eq!(call.source, RequestSource::NewCustomerCall);
    let repeat = container_service::request_new_customer_call(state, &customer, request(5)).await;
    assert!(matches!(repeat, Err(AppError::Conflict(_))));

    container_service::reconcile(
        state,
        staff,
        call.id,
        Reconciliation {
            incoming_count: Some(5),
            ..Default::default()
        },
    )
    .await?;
    let balance = container_service::get_balance(state, &customer)
        .await?
        .data
        .expect("balance");
    assert_eq!(balance.balance, 5);

    Ok(customer)
}

async fn stock_requests_reach_staff(
    state: &AppState,
    staff: &AuthUser,
    customer: &AuthUser,
) -> anyhow::Result<()> {
    let blank = stock_request_service::create_stock_request(
        state,
        customer,
        CreateStockRequest {
            content: "   ".into(),
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    stock_request_service::create_stock_request(
        state,
        customer,
        CreateStockRequest {
            content: "  Please stock chickpeas ".into(),
        },
    )
    .await?;

    let hidden = stock_request_service::list_stock_requests(state, customer).await;
    assert!(matches!(hidden, Err(AppError::Forbidden)));

    let listed = stock_request_service::list_stock_requests(state, staff)
        .await?
        .data
        .expect("stock requests");
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].content, "Please stock chickpeas");
    assert_eq!(listed.items[0].orderer_code, customer.orderer_code);
    Ok(())
}

/// Writes a one-row order group plus its container request straight to the tables.
async fn seed_order_group(
    state: &AppState,
    staff: &AuthUser,
    customer: &AuthUser,
    order_date: NaiveDate,
) -> anyhow::Result<String> {
    let rice = product_service::get_product(state, staff, "GR-RI-001")
        .await?
        .data
        .expect("product");
    let key = orders::delivery_slot_key(order_date, "slot-15");

    order_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(Uuid::new_v4()),
        product_id: Set(rice.id.clone()),
        product: Set(serde_json::to_value(&rice)?),
        quantity: Set(1),
        item_price: Set(rice.price_per_min_order),
        total_order_price: Set(rice.price_per_min_order),
        orderer_code: Set(customer.orderer_code.clone()),
        order_date: Set(order_date),
        delivery_slot_id: Set("slot-15".into()),
        delivery_slot_label: Set("15:00 - 16:00".into()),
        delivery_start_hour: Set(15),
        delivery_end_hour: Set(16),
        delivery_slot_key: Set(key.clone()),
        staff_status_check: Set(StaffStatusCheck::Pending.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    container_storage::ActiveModel {
        id: Set(Uuid::new_v4()),
        orderer_code: Set(customer.orderer_code.clone()),
        order_date: Set(order_date),
        delivery_slot_id: Set("slot-15".into()),
        delivery_slot_label: Set("15:00 - 16:00".into()),
        delivery_start_hour: Set(15),
        delivery_end_hour: Set(16),
        delivery_slot_key: Set(key.clone()),
        requested_container_count: Set(1),
        needs_washing: Set(false),
        actual_container_count: Set(None),
        is_incoming: Set(true),
        outgoing_container_id: Set(None),
        outgoing_container_count: Set(None),
        staff_comment: Set(None),
        source: Set(RequestSource::Order.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(key)
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, stock_requests, memberships, reviews, todos, container_storage, order_items, open_hours, cart_selections, cart_items, products, users, verification_codes CASCADE",
    ))
    .await?;

    Ok(AppState::new(orm, DEFAULT_TIMEZONE))
}

/// First slot that can still be booked, trying tomorrow before today.
fn bookable_target(state: &AppState) -> Option<(NaiveDate, String)> {
    let now = state.business_now();
    let today = now.date();
    let tomorrow = today.succ_opt()?;
    if !time_slots::is_non_operating_day(tomorrow) {
        return Some((tomorrow, time_slots::slot_id(time_slots::FIRST_START_HOUR)));
    }
    if time_slots::is_non_operating_day(today) || now.hour() >= time_slots::LAST_START_HOUR {
        return None;
    }
    Some((today, time_slots::slot_id(time_slots::LAST_START_HOUR)))
}

async fn seed_code(state: &AppState, code: &str, role: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO verification_codes (code, role) VALUES ($1, $2)")
        .bind(code)
        .bind(role)
        .execute(&state.pool)
        .await?;
    Ok(())
}

async fn register(state: &AppState, email: &str, code: &str) -> anyhow::Result<AuthUser> {
    let user = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.into(),
            password: "password123".into(),
            verification_code: code.into(),
        },
    )
    .await?
    .data
    .expect("registered user");

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
        orderer_code: user.orderer_code,
    })
}

fn rice_request() -> CreateProductRequest {
    CreateProductRequest {
        id: "GR-RI-001".into(),
        name: "Brown Rice".into(),
        category1_id: "GR".into(),
        category2_id: "RI".into(),
        unit: "kg".into(),
        supplier: "Haenam Farm".into(),
        description: Some("Organic brown rice".into()),
        price_per_unit: 6000,
        order_min_quantity: 0.5,
        order_unit: "kg".into(),
        price_per_min_order: 3000,
    }
}

fn oats_request() -> CreateProductRequest {
    CreateProductRequest {
        id: "GR-OA-001".into(),
        name: "Rolled Oats".into(),
        category1_id: "GR".into(),
        category2_id: "OA".into(),
        unit: "kg".into(),
        supplier: "Green Mill".into(),
        description: None,
        price_per_unit: 9000,
        order_min_quantity: 0.5,
        order_unit: "kg".into(),
        price_per_min_order: 4500,
    }
}
