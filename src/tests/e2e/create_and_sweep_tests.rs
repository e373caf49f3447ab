// Create a product, then sweep its outbox entry onto the bus.

use crate::modules::products::adapters::outbound::bus_event_publisher::{
    BusProductEventPublisher, ProductTopics,
};
use crate::modules::products::adapters::outbound::in_memory_event_publisher::{
    PublishedProductEvent, RecordingProductEventPublisher,
};
use crate::modules::products::adapters::outbound::in_memory_product_repository::InMemoryProductRepository;
use crate::modules::products::core::events::{PRODUCT_CREATED, ProductCreatedEvent};
use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::use_cases::create_product::handler::CreateProductHandler;
use crate::modules::products::use_cases::process_outbox::registry::product_event_registry;
use crate::modules::products::use_cases::process_outbox::sweeper::OutboxSweeper;
use crate::shared::core::trace_context::TraceContext;
use crate::shared::infrastructure::event_bus::in_memory::InMemoryEventBus;
use crate::shared::infrastructure::outbox::{OutboxEntry, OutboxRepository};
use crate::tests::fixtures::commands::CreateProductBuilder;
use crate::tests::fixtures::products::ProductBuilder;
use rstest::{fixture, rstest};
use serde_json::Value;
use std::sync::Arc;

struct World {
    repository: Arc<InMemoryProductRepository>,
    publisher: Arc<RecordingProductEventPublisher>,
    create: CreateProductHandler<InMemoryProductRepository>,
    sweeper: OutboxSweeper<InMemoryProductRepository, RecordingProductEventPublisher>,
}

#[fixture]
fn world() -> World {
    let repository = Arc::new(InMemoryProductRepository::new());
    let publisher = Arc::new(RecordingProductEventPublisher::new());
    World {
        create: CreateProductHandler::new(repository.clone()),
        sweeper: OutboxSweeper::new(repository.clone(), publisher.clone(), product_event_registry()),
        repository,
        publisher,
    }
}

#[rstest]
#[tokio::test]
async fn create_then_sweep_publishes_the_created_event_once(world: World) {
    let dto = world
        .create
        .handle(CreateProductBuilder::new().build(), None)
        .await
        .expect("create");

    assert_eq!(dto.name, "Widget");
    assert_eq!(dto.stock_level, 0.0);
    let entries = world.repository.outbox_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event_type, PRODUCT_CREATED);
    assert_eq!(entries[0].processed_at, None);

    let report = world.sweeper.run().await.expect("sweep");

    assert_eq!(report.processed, vec![entries[0].id.clone()]);
    assert!(world.repository.outbox_entries().await[0].processed_at.is_some());
    let published = world.publisher.published().await;
    assert_eq!(published.len(), 1);
    match &published[0].0 {
        PublishedProductEvent::Created(event) => {
            assert_eq!(event.product_id, "WIDGET");
            assert_eq!(event.price, 9.99);
        }
        other => panic!("expected a created event, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn creating_the_same_product_twice_keeps_one_row_and_one_entry(world: World) {
    world
        .create
        .handle(CreateProductBuilder::new().build(), None)
        .await
        .expect("first");
    world
        .create
        .handle(CreateProductBuilder::new().name("WIDGET").build(), None)
        .await
        .expect("second");

    assert_eq!(world.repository.product_count().await, 1);
    assert_eq!(world.repository.outbox_entries().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn a_processed_entry_is_never_republished(world: World) {
    world
        .create
        .handle(CreateProductBuilder::new().build(), None)
        .await
        .expect("create");

    world.sweeper.run().await.expect("first sweep");
    let second = world.sweeper.run().await.expect("second sweep");

    assert!(second.processed.is_empty());
    assert!(world.repository.get_unprocessed_entries().await.expect("pending").is_empty());
    assert_eq!(world.publisher.published().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn one_malformed_entry_does_not_block_the_batch(world: World) {
    let first = ProductBuilder::new().name("First Product").build();
    let second = ProductBuilder::new().name("Second Product").build();
    let third = ProductBuilder::new().name("Third Product").build();

    let first_entry =
        OutboxEntry::new(PRODUCT_CREATED, &ProductCreatedEvent::from(&first), None).expect("first");
    let mut second_entry =
        OutboxEntry::new(PRODUCT_CREATED, &ProductCreatedEvent::from(&second), None).expect("second");
    second_entry.event_data = "{\"productId\":".to_string();
    let third_entry =
        OutboxEntry::new(PRODUCT_CREATED, &ProductCreatedEvent::from(&third), None).expect("third");

    for (product, entry) in [
        (&first, &first_entry),
        (&second, &second_entry),
        (&third, &third_entry),
    ] {
        world
            .repository
            .store_with_outbox_entry(product, entry)
            .await
            .expect("store");
    }

    let report = world.sweeper.run().await.expect("sweep");

    assert_eq!(report.processed, vec![first_entry.id, third_entry.id]);
    assert_eq!(report.failed, vec![second_entry.id.clone()]);
    let pending = world.repository.get_unprocessed_entries().await.expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second_entry.id);
}

#[rstest]
#[tokio::test]
async fn an_unknown_event_type_is_reported_and_skipped(world: World) {
    let product = ProductBuilder::new().build();
    let unknown = OutboxEntry::new("product.productArchived", &ProductCreatedEvent::from(&product), None)
        .expect("entry");
    world
        .repository
        .store_with_outbox_entry(&product, &unknown)
        .await
        .expect("store");

    let report = world.sweeper.run().await.expect("sweep");

    assert_eq!(report.failed, vec![unknown.id]);
    assert!(world.publisher.published().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn a_failed_outbox_insert_leaves_no_product_behind(world: World) {
    world.repository.fail_outbox_inserts(true);

    let result = world
        .create
        .handle(CreateProductBuilder::new().build(), None)
        .await;

    assert!(result.is_err());
    assert_eq!(world.repository.product_count().await, 0);
    assert!(world.repository.outbox_entries().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn the_bus_envelope_carries_the_entry_id_and_the_original_trace() {
    let repository = Arc::new(InMemoryProductRepository::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let publisher = Arc::new(BusProductEventPublisher::new(
        bus.clone(),
        "test",
        ProductTopics::default(),
    ));
    let sweeper = OutboxSweeper::new(repository.clone(), publisher, product_event_registry());
    let trace = TraceContext::from_traceparent(
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
    )
    .expect("traceparent");

    CreateProductHandler::new(repository.clone())
        .handle(CreateProductBuilder::new().build(), Some(&trace))
        .await
        .expect("create");
    let entry_id = repository.outbox_entries().await[0].id.clone();
    sweeper.run().await.expect("sweep");

    let published = bus.published.lock().await;
    assert_eq!(published.len(), 1);
    let (topic, message) = &published[0];
    assert_eq!(topic, "product-created");
    let envelope: Value = serde_json::from_str(&message.payload).expect("json");
    assert_eq!(envelope["id"], entry_id.as_str());
    assert_eq!(envelope["type"], PRODUCT_CREATED);
    assert_eq!(envelope["data"]["price"].as_f64().map(|p| p as f32), Some(9.99));
    assert_eq!(
        envelope["traceparent"],
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
    );
}
