use std::sync::Arc;

use axum_family_lists_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        blames::CreateBlameRequest,
        items::{BulkCreateItemsRequest, CreateItemRequest, UpdateItemStatusRequest},
        lists::{CreateListRequest, UpdateListRequest},
    },
    entity::{
        calendars::ActiveModel as CalendarActive, families::ActiveModel as FamilyActive,
        family_members::ActiveModel as MemberActive, price_history::Entity as PriceHistoryEntries,
        products::Entity as Products, users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    push::LogPushSender,
    routes::params::Pagination,
    services::{blame_service, item_service, list_service, notification_service, product_service},
    state::AppState,
    ws::WsRegistry,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};
use uuid::Uuid;

// Integration flow: family creates a list, adds items with confirmed prices,
// and every mutation leaves its blame entry and fan-out behind.
#[tokio::test]
async fn list_item_mutations_feed_blames_prices_and_notifications() -> anyhow::Result<()> {
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

    // Seed a three-person family with one calendar.
    let ana_id = create_user(&state, "ana", "ana@example.com").await?;
    let luis_id = create_user(&state, "luis", "luis@example.com").await?;
    let marta_id = create_user(&state, "marta", "marta@example.com").await?;

    let family_id = Uuid::new_v4();
    FamilyActive {
        id: Set(family_id),
        code: Set("AB12CD34".into()),
        nombre: Set("Casa".into()),
        notas: Set(None),
        owner_id: Set(ana_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    for user_id in [ana_id, luis_id, marta_id] {
        MemberActive {
            user_id: Set(user_id),
            family_id: Set(family_id),
        }
        .insert(&state.orm)
        .await?;
    }

    let calendar_id = Uuid::new_v4();
    CalendarActive {
        id: Set(calendar_id),
        nombre: Set("Semanal".into()),
        notas: Set(None),
        family_id: Set(family_id),
        owner_id: Set(ana_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let ana = AuthUser {
        user_id: ana_id,
        is_admin: false,
    };
    let luis = AuthUser {
        user_id: luis_id,
        is_admin: false,
    };
    let marta = AuthUser {
        user_id: marta_id,
        is_admin: false,
    };

    // Create a list: one creation blame, one notification for the other member.
    let created = list_service::create_list(
        &state,
        &ana,
        CreateListRequest {
            name: "Compra semanal".into(),
            notas: None,
            comentarios: None,
            budget: Some(100.0),
            calendar_id: Some(calendar_id),
            list_for_date: None,
        },
    )
    .await?;
    let list = created.data.unwrap();
    assert_eq!(list.status, "pendiente");

    let blames = blame_service::for_list(&state, &ana, list.id).await?;
    let blames = blames.data.unwrap().items;
    assert_eq!(blames.len(), 1);
    assert!(blames[0].detalles.contains("creada"));

    let luis_inbox = notification_service::list_for_user(&state, &luis, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(luis_inbox.len(), 1, "fan-out reaches the other members");
    let marta_inbox = notification_service::list_for_user(&state, &marta, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(marta_inbox.len(), 1, "one notification per non-actor member");
    let ana_inbox = notification_service::list_for_user(&state, &ana, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items;
    assert!(ana_inbox.is_empty(), "the actor never notifies themselves");

    // An empty patch is a silent no-op: no blame, no notification.
    let noop = list_service::update_list(&state, &ana, list.id, UpdateListRequest::default()).await?;
    assert_eq!(noop.message, "No changes");
    let blames = blame_service::for_list(&state, &ana, list.id).await?.data.unwrap().items;
    assert_eq!(blames.len(), 1);
    let luis_inbox = notification_service::list_for_user(&state, &luis, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(luis_inbox.len(), 1, "a no-op update fans out nothing");

    // A real rename is recorded as a field diff.
    list_service::update_list(
        &state,
        &ana,
        list.id,
        UpdateListRequest {
            name: Some("Compra del mes".into()),
            ..Default::default()
        },
    )
    .await?;
    let blames = blame_service::for_list(&state, &ana, list.id).await?.data.unwrap().items;
    assert_eq!(blames.len(), 2);
    assert!(
        blames[0].detalles.contains("'name' changed from 'Compra semanal' to 'Compra del mes'"),
        "newest entry first, carrying the diff: {}",
        blames[0].detalles
    );

    // Back-to-back entries stay in insertion order even when their
    // timestamps collide.
    blame_service::comment_on_list(
        &state,
        &ana,
        list.id,
        CreateBlameRequest {
            detalles: "primer comentario".into(),
        },
    )
    .await?;
    blame_service::comment_on_list(
        &state,
        &ana,
        list.id,
        CreateBlameRequest {
            detalles: "segundo comentario".into(),
        },
    )
    .await?;
    let blames = blame_service::for_list(&state, &ana, list.id).await?.data.unwrap().items;
    assert_eq!(blames.len(), 4);
    assert_eq!(blames[0].detalles, "segundo comentario");
    assert_eq!(blames[1].detalles, "primer comentario");

    // Adding an item with a confirmed price seeds the product catalog and
    // writes one price-history row.
    let item = item_service::create_item(
        &state,
        &ana,
        CreateItemRequest {
            list_id: list.id,
            nombre: "Leche".into(),
            comentario: None,
            cantidad: Some(2.0),
            unit: Some("l".into()),
            precio_estimado: None,
            precio_confirmado: Some(1.25),
            category: Some("Lácteos".into()),
            brand: None,
        },
    )
    .await?
    .data
    .unwrap();
    let product_id = item.product_id.expect("item linked to a product");
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(product.family_id, family_id);
    assert_eq!(product.last_price, Some(1.25));
    let history = PriceHistoryEntries::find()
        .filter(axum_family_lists_api::entity::price_history::Column::ProductId.eq(product_id))
        .all(&state.orm)
        .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, 1.25);

    // Product resolution is case-insensitive within the family.
    let second = item_service::create_item(
        &state,
        &luis,
        CreateItemRequest {
            list_id: list.id,
            nombre: "LECHE".into(),
            comentario: None,
            cantidad: None,
            unit: None,
            precio_estimado: None,
            precio_confirmado: None,
            category: None,
            brand: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.product_id, Some(product_id), "same product, different casing");

    // The same name under a different family is a different product.
    let family2_id = Uuid::new_v4();
    FamilyActive {
        id: Set(family2_id),
        code: Set("EF56GH78".into()),
        nombre: Set("Piso".into()),
        notas: Set(None),
        owner_id: Set(marta_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    MemberActive {
        user_id: Set(marta_id),
        family_id: Set(family2_id),
    }
    .insert(&state.orm)
    .await?;
    let calendar2_id = Uuid::new_v4();
    CalendarActive {
        id: Set(calendar2_id),
        nombre: Set("Piso semanal".into()),
        notas: Set(None),
        family_id: Set(family2_id),
        owner_id: Set(marta_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    let list2 = list_service::create_list(
        &state,
        &marta,
        CreateListRequest {
            name: "Compra del piso".into(),
            notas: None,
            comentarios: None,
            budget: None,
            calendar_id: Some(calendar2_id),
            list_for_date: None,
        },
    )
    .await?
    .data
    .unwrap();
    let other_leche = item_service::create_item(
        &state,
        &marta,
        CreateItemRequest {
            list_id: list2.id,
            nombre: "Leche".into(),
            comentario: None,
            cantidad: None,
            unit: None,
            precio_estimado: None,
            precio_confirmado: None,
            category: None,
            brand: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_ne!(
        other_leche.product_id,
        Some(product_id),
        "catalogs are isolated per family"
    );

    // Bulk insert confirms prices like the single path but fans out no
    // notifications.
    let luis_before = notification_service::list_for_user(&state, &luis, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items
        .len();
    let copied = item_service::create_items_bulk(
        &state,
        &ana,
        list.id,
        BulkCreateItemsRequest {
            items: vec![CreateItemRequest {
                list_id: list.id,
                nombre: "Pan".into(),
                comentario: None,
                cantidad: Some(1.0),
                unit: None,
                precio_estimado: None,
                precio_confirmado: Some(2.4),
                category: None,
                brand: None,
            }],
        },
    )
    .await?
    .data
    .unwrap()
    .items;
    assert_eq!(copied.len(), 1);
    let pan_id = copied[0].product_id.expect("bulk item linked to a product");
    let pan = Products::find_by_id(pan_id).one(&state.orm).await?.unwrap();
    assert_eq!(pan.last_price, Some(2.4));
    let pan_history = PriceHistoryEntries::find()
        .filter(axum_family_lists_api::entity::price_history::Column::ProductId.eq(pan_id))
        .all(&state.orm)
        .await?;
    assert_eq!(pan_history.len(), 1);
    assert_eq!(pan_history[0].price, 2.4);
    let luis_after = notification_service::list_for_user(&state, &luis, Pagination::default(), false)
        .await?
        .data
        .unwrap()
        .items
        .len();
    assert_eq!(luis_after, luis_before, "bulk inserts are silent");

    // The family and per-list filter dropdowns see the accumulated catalog.
    let filters = product_service::family_filters(&state, &ana, family_id)
        .await?
        .data
        .unwrap();
    assert!(filters.categories.contains(&"Lácteos".to_string()));
    let list_filters = item_service::list_filter_options(&state, &ana, list.id)
        .await?
        .data
        .unwrap();
    assert!(list_filters.categories.contains(&"Lácteos".to_string()));

    // The home feed surfaces the family's recent lists.
    let recent = list_service::recent_lists(&state, &ana).await?.data.unwrap().items;
    assert!(recent.iter().any(|l| l.id == list.id));

    // A status outside the vocabulary is rejected before anything is
    // written.
    let rejected = item_service::update_item_status(
        &state,
        &ana,
        item.id,
        UpdateItemStatusRequest {
            status: "comprando".into(),
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    // Status transitions are always audited, even without other changes.
    item_service::update_item_status(
        &state,
        &ana,
        item.id,
        UpdateItemStatusRequest {
            status: "comprado".into(),
        },
    )
    .await?;
    let item_blames = blame_service::for_item(&state, &ana, item.id).await?.data.unwrap().items;
    assert!(
        item_blames[0].detalles.contains("Estado del producto"),
        "status change recorded: {}",
        item_blames[0].detalles
    );

    // Deleting an item reports what was removed; repeating the delete is a
    // successful no-op.
    let outcome = item_service::delete_item(&state, &ana, item.id).await?.data.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.list_name.as_deref(), Some("Compra del mes"));
    assert_eq!(outcome.family_id, Some(family_id));

    let again = item_service::delete_item(&state, &ana, item.id).await?.data.unwrap();
    assert!(!again.success);

    // List deletion is idempotent too and leaves the rest of the flow intact.
    let deleted = list_service::delete_list(&state, &ana, list.id).await?;
    assert_eq!(deleted.data.unwrap()["deleted"], true);
    let deleted = list_service::delete_list(&state, &ana, list.id).await?;
    assert_eq!(deleted.data.unwrap()["deleted"], false);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE push_subscriptions, notifications, blames, list_items, price_history, products, shopping_lists, calendars, family_members, families, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        config: AppConfig {
            database_url: database_url.to_string(),
            jwt_secret: "test-secret".into(),
            host: "127.0.0.1".into(),
            port: 0,
        },
        pool,
        orm,
        ws: WsRegistry::new(),
        push: Arc::new(LogPushSender),
    })
}

async fn create_user(state: &AppState, username: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        username: Set(username.to_string()),
        password_hash: Set("dummy".into()),
        is_admin: Set(false),
        nombre: Set(None),
        direccion: Set(None),
        telefono: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
