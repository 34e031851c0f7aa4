mod common;

use std::sync::Arc;

use common::*;
use provenance_gateway::{FaultPlan, FlakyGateway, LedgerClient};
use provenance_lifecycle::{ResolveError, RoleResolver, Verification};
use provenance_types::{parse_address, ClaimId, ProductId, RecordKind, Role, RoleSet};

#[tokio::test]
async fn holdings_follow_current_ownership() {
    let ledger = ledger();
    let first = register_at(&ledger, "SN-1", 100).await;
    let second = register_at(&ledger, "SN-2", 110).await;
    transfer_at(&ledger, SHOP, BUYER, first, 200).await;

    let service = service(&ledger);
    let shop = service.resolve_holdings(SHOP).await.unwrap();
    assert_eq!(shop.product_ids(), vec![second]);

    let buyer = service.resolve_holdings(BUYER).await.unwrap();
    assert_eq!(buyer.product_ids(), vec![first]);
    assert_eq!(buyer.products[0].details.serial_number, "SN-1");
}

#[tokio::test]
async fn holdings_never_include_products_passed_on() {
    let ledger = ledger();
    let product = register_at(&ledger, "SN-1", 100).await;
    transfer_at(&ledger, SHOP, BUYER, product, 200).await;
    transfer_at(&ledger, BUYER, SECOND_BUYER, product, 300).await;

    let service = service(&ledger);
    assert!(service.resolve_holdings(BUYER).await.unwrap().is_empty());
    assert!(service.resolve_holdings(SHOP).await.unwrap().is_empty());
    assert!(service
        .resolve_holdings(SECOND_BUYER)
        .await
        .unwrap()
        .contains(product));
}

#[tokio::test]
async fn holdings_ignore_address_case() {
    let ledger = ledger();
    let product = register_at(&ledger, "SN-1", 100).await;
    transfer_at(&ledger, SHOP, BUYER, product, 200).await;

    let checksummed = BUYER.to_checksum(None);
    let lower = checksummed.to_lowercase();
    let upper = format!("0x{}", checksummed[2..].to_uppercase());
    assert_ne!(checksummed, lower);

    let service = service(&ledger);
    for text in [checksummed.as_str(), lower.as_str(), upper.as_str()] {
        let owner = parse_address(text).unwrap();
        let holdings = service.resolve_holdings(owner).await.unwrap();
        assert_eq!(holdings.product_ids(), vec![product], "input {text}");
    }
}

#[tokio::test]
async fn holdings_stream_failure_is_total() {
    let ledger = ledger();
    register_at(&ledger, "SN-1", 100).await;

    let result = flaky_service(&ledger, FaultPlan::new().fail_stream(RecordKind::Transferred))
        .resolve_holdings(SHOP)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn holdings_skip_candidates_whose_lookup_fails() {
    let ledger = ledger();
    let first = register_at(&ledger, "SN-1", 100).await;
    let second = register_at(&ledger, "SN-2", 110).await;

    let holdings = flaky_service(&ledger, FaultPlan::new().fail_owner_lookup(first))
        .resolve_holdings(SHOP)
        .await
        .unwrap();
    assert_eq!(holdings.product_ids(), vec![second]);
}

#[tokio::test]
async fn holdings_skip_candidates_whose_details_fail() {
    let ledger = ledger();
    let first = register_at(&ledger, "SN-1", 100).await;
    let second = register_at(&ledger, "SN-2", 110).await;

    let holdings = flaky_service(&ledger, FaultPlan::new().fail_details_lookup(second))
        .resolve_holdings(SHOP)
        .await
        .unwrap();
    assert_eq!(holdings.product_ids(), vec![first]);
}

#[tokio::test]
async fn holdings_fail_when_every_candidate_lookup_fails() {
    let ledger = ledger();
    register_at(&ledger, "SN-1", 100).await;
    register_at(&ledger, "SN-2", 110).await;

    let result = flaky_service(&ledger, FaultPlan::new().fail_selector("ownerOf"))
        .resolve_holdings(SHOP)
        .await;
    assert!(matches!(result, Err(ResolveError::Gateway(_))));

    let result = flaky_service(&ledger, FaultPlan::new().fail_selector("getProductDetails"))
        .resolve_holdings(SHOP)
        .await;
    assert!(matches!(result, Err(ResolveError::Gateway(_))));
}

#[tokio::test]
async fn holdings_of_an_address_with_no_transfers_are_empty_even_when_lookups_fail() {
    let ledger = ledger();
    register_at(&ledger, "SN-1", 100).await;

    let holdings = flaky_service(&ledger, FaultPlan::new().fail_selector("ownerOf"))
        .resolve_holdings(BUYER)
        .await
        .unwrap();
    assert!(holdings.is_empty());
}

#[tokio::test]
async fn roles_reflect_grants() {
    let ledger = ledger();
    let service = service(&ledger);

    let admin = service.resolve_roles(ADMIN).await;
    assert!(admin.admin && !admin.manufacturer);
    assert!(admin.can_register_products());

    let maker = service.resolve_roles(MAKER).await;
    assert_eq!(
        maker,
        RoleSet {
            manufacturer: true,
            ..RoleSet::none()
        }
    );
    assert!(!maker.can_service());

    assert!(service.resolve_roles(BUYER).await.is_empty());

    let outcome = client(&ledger).grant_role(ADMIN, Role::ServiceCenter, BUYER).await;
    assert!(outcome.success);
    assert!(service.resolve_roles(BUYER).await.service_center);
}

#[tokio::test]
async fn one_failing_role_check_denies_everything() {
    let ledger = ledger();
    let plan = FaultPlan::new().fail_role_check(Role::Retailer.conventional_id());

    let roles = flaky_service(&ledger, plan).resolve_roles(MAKER).await;
    assert_eq!(roles, RoleSet::none());
}

#[tokio::test]
async fn failing_role_id_lookup_denies_everything() {
    let ledger = ledger();
    let plan = FaultPlan::new().fail_selector(Role::Manufacturer.constant_name());
    let roles = flaky_service(&ledger, plan)
        .resolve_roles(ADMIN)
        .await;
    assert_eq!(roles, RoleSet::none());
}

#[tokio::test]
async fn admin_role_id_needs_no_lookup() {
    let ledger = ledger();
    let gateway = Arc::new(FlakyGateway::new(Arc::clone(&ledger), FaultPlan::new()));
    let resolver = RoleResolver::new(LedgerClient::shared(Arc::clone(&gateway)));

    resolver.resolve(ADMIN).await;
    // Three role id reads plus four membership checks.
    assert_eq!(gateway.point_reads(), 7);
}

#[tokio::test]
async fn verify_by_id_and_serial() {
    let ledger = ledger();
    let product = register_at(&ledger, "SN-42", 100).await;
    transfer_at(&ledger, SHOP, BUYER, product, 200).await;

    let service = service(&ledger);
    let by_id = service.verify(&product.to_string()).await.unwrap();
    let by_serial = service.verify("SN-42").await.unwrap();
    assert_eq!(by_id, by_serial);

    let report = by_id.report().unwrap();
    assert_eq!(report.current_holder, Some(BUYER));
    assert_eq!(report.details.model, "Phone X");
    assert_eq!(report.timeline.len(), 2);
    let warranty = report.warranty.unwrap();
    assert_eq!(warranty.starts_at, 200);
    // Block times here are far in the past, so the warranty has lapsed.
    assert!(report.warranty_remaining.unwrap().expired);
}

#[tokio::test]
async fn verify_reports_absent_products() {
    let ledger = ledger();
    register_at(&ledger, "SN-1", 100).await;

    let service = service(&ledger);
    assert_eq!(service.verify("77").await.unwrap(), Verification::NotFound);
    assert_eq!(service.verify("SN-404").await.unwrap(), Verification::NotFound);
    assert!(service.verify("").await.is_err());
}

#[tokio::test]
async fn verify_keeps_existing_product_without_history() {
    let ledger = ledger();
    let product = register_at(&ledger, "SN-1", 100).await;

    let verification = flaky_service(&ledger, FaultPlan::new().fail_all_streams())
        .verify(&product.to_string())
        .await
        .unwrap();
    let report = verification.report().unwrap();
    assert!(report.timeline.is_empty());
    assert_eq!(report.current_holder, Some(SHOP));
    assert!(report.warranty.is_none());
}

#[tokio::test]
async fn product_details_point_fetch() {
    let ledger = ledger();
    let product = register_at(&ledger, "SN-1", 100).await;

    let service = service(&ledger);
    let details = service.product_details(product).await.unwrap().unwrap();
    assert_eq!(details.manufacturer, MAKER);
    assert_eq!(details.manufactured_at, 100);
    assert!(service.product_details(ProductId(5)).await.unwrap().is_none());
    assert!(service.product_details(ProductId(0)).await.unwrap().is_none());
}

#[tokio::test]
async fn claim_directory_lists_submissions() {
    let ledger = ledger();
    let first = register_at(&ledger, "SN-1", 100).await;
    let second = register_at(&ledger, "SN-2", 110).await;
    transfer_at(&ledger, SHOP, BUYER, first, 200).await;
    transfer_at(&ledger, SHOP, BUYER, second, 210).await;

    let client = client(&ledger);
    assert!(client.submit_warranty_claim(BUYER, first, "cracked").await.success);
    assert!(client.submit_warranty_claim(BUYER, second, "battery").await.success);
    assert!(client.process_warranty_claim(FIXER, ClaimId(2), false).await.success);

    let claims = service(&ledger).list_claims().await.unwrap();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].claim_id, ClaimId(1));
    assert_eq!(claims[0].issue, "cracked");
    assert!(!claims[0].processed);
    assert_eq!(claims[1].product_id, second);
    assert!(claims[1].processed && !claims[1].approved);
    assert_eq!(claims[1].model, "Phone X");
}

#[tokio::test]
async fn claim_directory_fails_when_every_lookup_fails() {
    let ledger = ledger();
    let first = register_at(&ledger, "SN-1", 100).await;
    let second = register_at(&ledger, "SN-2", 110).await;
    transfer_at(&ledger, SHOP, BUYER, first, 200).await;
    transfer_at(&ledger, SHOP, BUYER, second, 210).await;

    let client = client(&ledger);
    assert!(client.submit_warranty_claim(BUYER, first, "cracked").await.success);
    assert!(client.submit_warranty_claim(BUYER, second, "battery").await.success);

    let result = flaky_service(&ledger, FaultPlan::new().fail_selector("getWarrantyClaim"))
        .list_claims()
        .await;
    assert!(matches!(result, Err(ResolveError::Gateway(_))));

    let partial = flaky_service(&ledger, FaultPlan::new().fail_details_lookup(first))
        .list_claims()
        .await
        .unwrap();
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].product_id, second);
}

#[tokio::test]
async fn warranty_activity_follows_first_sale() {
    let ledger = ledger();
    let sold = register_at(&ledger, "SN-1", 100).await;
    let unsold = register_at(&ledger, "SN-2", 110).await;
    transfer_at(&ledger, SHOP, BUYER, sold, 200).await;

    let client = client(&ledger);
    assert!(client.is_warranty_active(sold).await.unwrap());
    assert!(!client.is_warranty_active(unsold).await.unwrap());
}

#[tokio::test]
async fn rejected_writes_report_failure() {
    let ledger = ledger();
    let client = client(&ledger);

    let outcome = client
        .register_product(BUYER, BUYER, "SN-1", "Phone", 30, 1)
        .await;
    assert!(!outcome.success);
    assert!(outcome.transaction.is_none());
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn live_watch_delivers_decoded_records() {
    let ledger = ledger();
    let client = client(&ledger);
    let mut watch = client.watch(&[RecordKind::Registered]).unwrap();

    register_at(&ledger, "SN-1", 100).await;

    let record = watch.next().await.unwrap();
    assert_eq!(record.kind(), RecordKind::Registered);
    assert_eq!(record.product_id(), ProductId(1));

    watch.unsubscribe();
    assert_eq!(ledger.subscriber_count(), 0);
}
