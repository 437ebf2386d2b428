//! End-to-end settlement flow against in-memory and file-backed databases

mod common;

use std::sync::Arc;
use std::time::Duration;

use atelier_settlement::{DbService, SettlementError};
use atelier_settlement::gateways::DisabledArchivalGateway;
use atelier_settlement::settlement::ExportFormat;
use common::*;
use shared::error::ErrorCode;
use shared::models::{
    PaymentStatus, RemittanceStatus, SettlementState, SideEffect, SideEffectStatus,
};

fn decode_sjis(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
    assert!(!had_errors);
    text.into_owned()
}

#[tokio::test]
async fn test_month_end_flow() {
    let pool = db().await;
    seed_month(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let archive = Arc::new(RecordingArchive::default());
    let svc = service(&pool, notifier.clone(), archive.clone());

    // Preview lists every active creator, nothing is written
    let preview = svc.preview(may()).await.unwrap();
    assert!(preview.failed.is_empty());
    let preview = preview.lines;
    assert_eq!(preview.len(), 3);
    let yamada = &preview[0];
    assert_eq!(yamada.creator_id, 1);
    assert_eq!(yamada.sales.total.gross_sales, 500_000);
    assert_eq!(yamada.sales.total.order_count, 2);
    assert_eq!(yamada.sales.total.item_count, 3);
    assert_eq!(yamada.computed.commission_amount, 100_000);
    assert_eq!(yamada.computed.withholding_tax, 40_840);
    assert_eq!(yamada.computed.net_payment, 359_160);
    assert_eq!(yamada.state, SettlementState::Unconfirmed);
    assert_eq!(preview[2].computed.gross_sales, 0);
    assert!(svc.ledger().payments(may(), None).await.unwrap().is_empty());

    // Bulk confirm only touches creators with sales
    let report = svc.confirm_period(may()).await.unwrap();
    assert_eq!(report.confirmed.len(), 2);
    assert!(report.failed.is_empty());
    let p1 = report.confirmed.iter().find(|p| p.creator_id == 1).unwrap().clone();
    let p2 = report.confirmed.iter().find(|p| p.creator_id == 2).unwrap().clone();
    assert_eq!(p1.status, PaymentStatus::Pending);
    assert_eq!(p2.commission_amount, 5_100);
    assert_eq!(p2.withholding_tax, 0);
    assert_eq!(p2.net_payment, 44_900);

    // Generic export carries both pending rows
    let file = svc.export(may(), ExportFormat::Generic).await.unwrap();
    assert_eq!(file.row_count, 2);
    assert_eq!(file.filename, "payment_202405.csv");
    let text = decode_sjis(&file.bytes);
    assert!(text.contains("山田太郎"));
    assert!(text.contains("359160"));
    assert!(text.contains("44900"));

    // Complete archives the notice once
    let done = svc.complete(p1.id).await.unwrap();
    assert!(done.committed);
    assert_eq!(done.record.status, PaymentStatus::Completed);
    assert!(done.record.transfer_date.is_some());
    assert_eq!(done.side_effects.len(), 1);
    assert_eq!(done.side_effects[0].effect, SideEffect::Archival);
    assert!(matches!(
        &done.side_effects[0].status,
        SideEffectStatus::Delivered { reference: Some(id) } if id == "doc-1"
    ));
    assert_eq!(
        archive.documents(),
        vec![("payment_notice_1_202405.html".to_string(), "2024-05".to_string())]
    );

    // Bank transfer file now only holds the remaining pending row
    let transfer = svc.export(may(), ExportFormat::BankTransfer).await.unwrap();
    assert_eq!(transfer.row_count, 1);
    let text = decode_sjis(&transfer.bytes);
    assert!(text.contains(",44900,ATELIER 2024年5月分,7\r\n"));
    assert!(!text.contains("359160"));

    // Notice goes out and is stamped
    let sent = svc.notify(p1.id).await.unwrap();
    assert!(sent.committed);
    assert!(sent.record.notification_sent_at.is_some());
    assert!(sent.warnings().is_empty());
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipient, "creator@example.com");
    assert!(messages[0].subject.contains("2024年5月"));
    assert!(messages[0].body.contains("359,160円"));
    assert!(messages[0].body.contains("40,840円"));
    assert!(messages[0].body.contains("振込済み"));

    // Withheld tax for the month
    let summary = svc.remittance_summary(may()).await.unwrap();
    assert_eq!(summary.total_withheld, 40_840);
    assert_eq!(summary.withheld_payment_count, 1);
    assert_eq!(summary.status, RemittanceStatus::Unpaid);
    assert_eq!(summary.due_date.to_string(), "2024-06-10");
    assert!(summary.record.is_none());

    let paid = svc.mark_remittance_paid(may()).await.unwrap();
    assert_eq!(paid.total_amount, 40_840);
    assert_eq!(paid.status, RemittanceStatus::Paid);
    assert!(paid.paid_date.is_some());
}

#[tokio::test]
async fn test_preview_skips_creator_with_bad_schedule() {
    let pool = db().await;
    seed_month(&pool).await;
    sqlx::query("UPDATE creators SET service_commission_rate = 'abc' WHERE id = 3")
        .execute(&pool)
        .await
        .unwrap();
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );

    let preview = svc.preview(may()).await.unwrap();
    let ids: Vec<i64> = preview.lines.iter().map(|l| l.creator_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(preview.lines[0].computed.net_payment, 359_160);
    assert_eq!(preview.failed.len(), 1);
    assert_eq!(preview.failed[0].creator_id, 3);
    assert_eq!(preview.failed[0].code, ErrorCode::InvalidCommissionSchedule);
    assert!(preview.failed[0].message.contains("service_commission_rate"));

    // Bulk confirm agrees: creator 3 has no sales, the others go through
    let report = svc.confirm_period(may()).await.unwrap();
    assert_eq!(report.confirmed.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirms_share_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atelier.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    seed_month(&db.pool).await;
    let svc = service(
        &db.pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.confirm(1, may()).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.committed);
        assert_eq!(result.record.net_payment, 359_160);
        ids.push(result.record.id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let rows = svc.ledger().payments(may(), None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_confirm_twice_recomputes_same_row() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );

    let first = svc.confirm(1, may()).await.unwrap();
    assert!(first.committed);
    assert_eq!(first.record.gross_sales, 500_000);

    // A late payment lands in the same month
    insert_paid_order(&pool, 200, paid_at(may(), 31), &[(10, 1, 100_000)]).await;

    let second = svc.confirm(1, may()).await.unwrap();
    assert!(second.committed);
    assert_eq!(second.record.id, first.record.id);
    assert_eq!(second.record.gross_sales, 600_000);
    assert_eq!(second.record.commission_amount, 120_000);
    assert_eq!(second.record.payment_date, first.record.payment_date);
    assert_eq!(svc.ledger().payments(may(), None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_completed_payment_is_terminal() {
    let pool = db().await;
    seed_month(&pool).await;
    let archive = Arc::new(RecordingArchive::default());
    let svc = service(&pool, Arc::new(RecordingNotifier::default()), archive.clone());

    let payment = svc.confirm(1, may()).await.unwrap().record;
    svc.complete(payment.id).await.unwrap();

    // Repeat complete: same row, no new side effects
    let again = svc.complete(payment.id).await.unwrap();
    assert!(!again.committed);
    assert!(again.side_effects.is_empty());
    assert_eq!(archive.documents().len(), 1);

    // Confirm is refused, stored amounts unchanged
    let err = svc.confirm(1, may()).await.unwrap_err();
    assert!(matches!(err, SettlementError::AlreadyCompleted { .. }));
    assert_eq!(err.code(), ErrorCode::PaymentAlreadyCompleted);

    // Bulk confirm reports it and still confirms the others
    let report = svc.confirm_period(may()).await.unwrap();
    assert_eq!(report.confirmed.len(), 1);
    assert_eq!(report.confirmed[0].creator_id, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].creator_id, 1);
    assert_eq!(report.failed[0].code, ErrorCode::PaymentAlreadyCompleted);

    let stored = svc.ledger().payment(payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Completed);
    assert_eq!(stored.gross_sales, 500_000);
}

#[tokio::test]
async fn test_notify_failure_is_soft() {
    let pool = db().await;
    seed_month(&pool).await;
    let archive = Arc::new(RecordingArchive::default());
    let svc = service(&pool, Arc::new(FailingNotifier), archive.clone());

    let payment = svc.confirm(1, may()).await.unwrap().record;
    let result = svc.notify(payment.id).await.unwrap();

    assert!(!result.committed);
    assert!(result.record.notification_sent_at.is_none());
    assert_eq!(result.side_effects.len(), 1);
    assert!(result.side_effects[0].is_failure());
    assert_eq!(result.warnings().len(), 1);
    assert!(result.warnings()[0].contains("mailbox unavailable"));
    // nothing archived for an undelivered notice
    assert!(archive.documents().is_empty());

    let stored = svc.ledger().payment(payment.id).await.unwrap();
    assert!(stored.notification_sent_at.is_none());
    assert_eq!(stored.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_slow_gateway_times_out() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(
        &pool,
        Arc::new(SlowNotifier(Duration::from_secs(30))),
        Arc::new(RecordingArchive::default()),
    );

    let payment = svc.confirm(2, may()).await.unwrap().record;
    let result = svc.notify(payment.id).await.unwrap();

    assert!(!result.committed);
    match &result.side_effects[0].status {
        SideEffectStatus::Failed { reason } => assert!(reason.contains("timed out")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_archive_failure_keeps_completion() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(&pool, Arc::new(RecordingNotifier::default()), Arc::new(FailingArchive));

    let payment = svc.confirm(2, may()).await.unwrap().record;
    let result = svc.complete(payment.id).await.unwrap();

    assert!(result.committed);
    assert_eq!(result.record.status, PaymentStatus::Completed);
    assert!(result.side_effects[0].is_failure());
    assert!(result.warnings()[0].starts_with("archival failed"));
}

#[tokio::test]
async fn test_disabled_archive_is_skipped() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(&pool, Arc::new(RecordingNotifier::default()), Arc::new(DisabledArchivalGateway));

    let payment = svc.confirm(2, may()).await.unwrap().record;
    let result = svc.complete(payment.id).await.unwrap();

    assert!(result.committed);
    assert!(matches!(result.side_effects[0].status, SideEffectStatus::Skipped { .. }));
    assert!(result.warnings().is_empty());
}

#[tokio::test]
async fn test_notify_period_skips_creators_without_email() {
    let pool = db().await;
    seed_month(&pool).await;
    sqlx::query("UPDATE creators SET email = '  ' WHERE id = 2")
        .execute(&pool)
        .await
        .unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(&pool, notifier.clone(), Arc::new(RecordingArchive::default()));
    svc.confirm_period(may()).await.unwrap();

    let report = svc.notify_period(may()).await.unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].creator_id, 2);
    assert_eq!(report.skipped[0].code, ErrorCode::EmailMissing);
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_export_skips_rows_without_bank_details() {
    let pool = db().await;
    seed_month(&pool).await;
    sqlx::query("UPDATE creators SET account_number = NULL WHERE id = 2")
        .execute(&pool)
        .await
        .unwrap();
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );
    svc.confirm_period(may()).await.unwrap();

    let file = svc.export(may(), ExportFormat::BankTransfer).await.unwrap();
    assert_eq!(file.row_count, 1);
    assert_eq!(file.skipped.len(), 1);
    assert_eq!(file.skipped[0].creator_id, 2);
    assert_eq!(file.skipped[0].code, ErrorCode::BankDetailsMissing);
    assert!(file.skipped[0].reason.contains("account_number"));
}

#[tokio::test]
async fn test_export_without_pending_rows_is_empty() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );

    let err = svc.export(may(), ExportFormat::Generic).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ExportEmpty);

    let payment = svc.confirm(2, may()).await.unwrap().record;
    svc.complete(payment.id).await.unwrap();
    let err = svc.export(may(), ExportFormat::BankTransfer).await.unwrap_err();
    assert!(matches!(err, SettlementError::ExportEmpty { .. }));
}

#[tokio::test]
async fn test_remittance_marked_paid_twice() {
    let pool = db().await;
    seed_month(&pool).await;
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );
    svc.confirm_period(may()).await.unwrap();

    let first = svc.mark_remittance_paid(may()).await.unwrap();
    // a later recompute changes what is withheld, the remitted record stays
    insert_paid_order(&pool, 300, paid_at(may(), 30), &[(10, 1, 100_000)]).await;
    svc.confirm(1, may()).await.unwrap();
    let second = svc.mark_remittance_paid(may()).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.total_amount, 40_840);
    assert_eq!(second.due_date, first.due_date);
    assert_eq!(second.status, RemittanceStatus::Paid);

    let summary = svc.remittance_summary(may()).await.unwrap();
    assert_eq!(summary.status, RemittanceStatus::Paid);
    assert_eq!(summary.total_withheld, 49_008);
    assert_eq!(summary.record.unwrap().total_amount, 40_840);
}

#[tokio::test]
async fn test_unknown_creator_and_payment() {
    let pool = db().await;
    let svc = service(
        &pool,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingArchive::default()),
    );

    let err = svc.confirm(42, may()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CreatorNotFound);

    let err = svc.complete(42).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PaymentNotFound);

    let err = svc.notify(42).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PaymentNotFound);
}
