// Update and delete flows: each committed change yields exactly one event,
// and a failed outbox insert leaves the product as it was. Stock and pricing
// updates come from other services and yield none.

use crate::modules::products::adapters::outbound::in_memory_event_publisher::{
    PublishedProductEvent, RecordingProductEventPublisher,
};
use crate::modules::products::core::ports::ProductRepository;
use crate::modules::products::use_cases::application_error::ApplicationError;
use crate::modules::products::use_cases::delete_product::command::DeleteProduct;
use crate::modules::products::use_cases::delete_product::handler::DeleteProductHandler;
use crate::modules::products::use_cases::get_product::handler::GetProductHandler;
use crate::modules::products::use_cases::list_products::handler::ListProductsHandler;
use crate::modules::products::use_cases::process_outbox::registry::product_event_registry;
use crate::modules::products::use_cases::process_outbox::sweeper::OutboxSweeper;
use crate::modules::products::core::product::ProductPrice;
use crate::modules::products::use_cases::update_pricing::command::UpdatePricing;
use crate::modules::products::use_cases::update_pricing::handler::UpdatePricingHandler;
use crate::modules::products::use_cases::update_product::handler::UpdateProductHandler;
use crate::modules::products::use_cases::update_stock_level::command::UpdateStockLevel;
use crate::modules::products::use_cases::update_stock_level::handler::UpdateStockLevelHandler;
use crate::tests::fixtures::commands::UpdateProductBuilder;
use crate::tests::fixtures::products::seeded_repository;
use rstest::rstest;
use std::sync::Arc;

fn delete_widget() -> DeleteProduct {
    DeleteProduct {
        product_id: "WIDGET".into(),
    }
}

#[rstest]
#[tokio::test]
async fn update_then_delete_publishes_every_event_in_order() {
    let repository = Arc::new(seeded_repository().await);
    let publisher = Arc::new(RecordingProductEventPublisher::new());
    let sweeper = OutboxSweeper::new(repository.clone(), publisher.clone(), product_event_registry());

    UpdateProductHandler::new(repository.clone())
        .handle(UpdateProductBuilder::new().name("Widget Pro").build(), None)
        .await
        .expect("update");
    DeleteProductHandler::new(repository.clone())
        .handle(delete_widget(), None)
        .await
        .expect("delete");
    let report = sweeper.run().await.expect("sweep");

    assert_eq!(report.processed.len(), 3);
    let kinds: Vec<&str> = publisher
        .published()
        .await
        .iter()
        .map(|(event, _)| match event {
            PublishedProductEvent::Created(_) => "created",
            PublishedProductEvent::Updated(_) => "updated",
            PublishedProductEvent::Deleted(_) => "deleted",
        })
        .collect();
    assert_eq!(kinds, vec!["created", "updated", "deleted"]);
}

#[rstest]
#[tokio::test]
async fn a_failed_outbox_insert_leaves_the_update_unapplied() {
    let repository = Arc::new(seeded_repository().await);
    repository.fail_outbox_inserts(true);

    let result = UpdateProductHandler::new(repository.clone())
        .handle(UpdateProductBuilder::new().price(15.0).build(), None)
        .await;

    assert!(matches!(result, Err(ApplicationError::Store(_))));
    let stored = GetProductHandler::new(repository.clone())
        .handle("WIDGET")
        .await
        .expect("get");
    assert_eq!(stored.price, 9.99);
    assert_eq!(repository.outbox_entries().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn a_failed_outbox_insert_leaves_the_product_in_place() {
    let repository = Arc::new(seeded_repository().await);
    repository.fail_outbox_inserts(true);

    let result = DeleteProductHandler::new(repository.clone())
        .handle(delete_widget(), None)
        .await;

    assert!(result.is_err());
    let listed = ListProductsHandler::new(repository.clone())
        .handle()
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(repository.outbox_entries().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn an_unchanged_update_publishes_nothing() {
    let repository = Arc::new(seeded_repository().await);
    let publisher = Arc::new(RecordingProductEventPublisher::new());
    let sweeper = OutboxSweeper::new(repository.clone(), publisher.clone(), product_event_registry());
    sweeper.run().await.expect("initial sweep");

    UpdateProductHandler::new(repository.clone())
        .handle(UpdateProductBuilder::new().build(), None)
        .await
        .expect("update");
    let report = sweeper.run().await.expect("sweep");

    assert!(report.processed.is_empty());
    assert_eq!(publisher.published().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn deleting_twice_reports_not_found_the_second_time() {
    let repository = Arc::new(seeded_repository().await);
    let handler = DeleteProductHandler::new(repository.clone());

    handler.handle(delete_widget(), None).await.expect("delete");
    let second = handler.handle(delete_widget(), None).await;

    assert!(matches!(second, Err(ApplicationError::NotFound(_))));
    assert!(repository.get("WIDGET").await.is_err());
}

#[rstest]
#[tokio::test]
async fn stock_and_pricing_updates_are_stored_without_events() {
    let repository = Arc::new(seeded_repository().await);
    let publisher = Arc::new(RecordingProductEventPublisher::new());
    let sweeper = OutboxSweeper::new(repository.clone(), publisher.clone(), product_event_registry());
    sweeper.run().await.expect("initial sweep");

    UpdateStockLevelHandler::new(repository.clone())
        .handle(UpdateStockLevel {
            product_id: "WIDGET".into(),
            stock_level: 12.0,
        })
        .await
        .expect("stock");
    UpdatePricingHandler::new(repository.clone())
        .handle(UpdatePricing {
            product_id: "WIDGET".into(),
            price_brackets: vec![ProductPrice {
                quantity: 10,
                price: 8.99,
            }],
        })
        .await
        .expect("pricing");
    let report = sweeper.run().await.expect("sweep");

    let stored = GetProductHandler::new(repository.clone())
        .handle("WIDGET")
        .await
        .expect("get");
    assert_eq!(stored.stock_level, 12.0);
    assert_eq!(stored.price_breakdown.len(), 1);
    assert!(report.processed.is_empty());
    assert_eq!(publisher.published().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn a_stock_update_for_a_deleted_product_reports_not_found() {
    let repository = Arc::new(seeded_repository().await);
    DeleteProductHandler::new(repository.clone())
        .handle(delete_widget(), None)
        .await
        .expect("delete");

    let result = UpdateStockLevelHandler::new(repository.clone())
        .handle(UpdateStockLevel {
            product_id: "WIDGET".into(),
            stock_level: 5.0,
        })
        .await;

    assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    assert_eq!(repository.product_count().await, 0);
}
