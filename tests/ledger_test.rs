mod common;

use anyhow::Result;
use common::{parse_date, test_service};
use spendlog::application::AppError;
use spendlog::domain::{Field, MAX_AMOUNT_CENTS, NewRecord, RecordUpdate, SortOrder, aggregate, parse_cents};

#[test]
fn test_add_then_list_contains_exactly_one_new_record() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let inputs = [
        (1, "Food", "2024-01-01"),
        (99999, "Transport", "2023-06-15"),
        (1250, "Rent", "2024-01-31"),
        (42, "Food", "2020-02-29"),
    ];

    for (amount, category, date) in inputs {
        let before = service.list_expenses(SortOrder::Insertion);
        let record = service.add_expense(NewRecord::new(amount, category).on(parse_date(date)))?;
        let after = service.list_expenses(SortOrder::Insertion);

        assert_eq!(after.len(), before.len() + 1);
        assert!(before.iter().all(|r| r.id != record.id));

        let matching: Vec<_> = after.iter().filter(|r| r.id == record.id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].amount_cents, amount);
        assert_eq!(matching[0].category, category);
        assert_eq!(matching[0].date, parse_date(date));
    }

    Ok(())
}

#[test]
fn test_add_defaults_to_today() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let record = service.add_expense(NewRecord::new(300, "Coffee"))?;
    assert_eq!(record.date, parse_date(common::TODAY));

    Ok(())
}

#[test]
fn test_add_rejects_zero_and_negative_amounts() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    service.add_expense(NewRecord::new(100, "Food"))?;

    for amount in [0, -300] {
        let result = service.add_expense(NewRecord::new(amount, "Food"));
        match result {
            Err(AppError::Validation(e)) => assert!(e.has_issue(Field::Amount)),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(service.ledger().len(), 1);
    Ok(())
}

#[test]
fn test_add_rejects_empty_category() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let result = service.add_expense(NewRecord::new(100, "   "));
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(service.ledger().is_empty());

    Ok(())
}

#[test]
fn test_add_rejects_future_date_by_default() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let result = service.add_expense(NewRecord::new(100, "Food").on(parse_date("2024-02-01")));
    match result {
        Err(AppError::Validation(e)) => assert!(e.has_issue(Field::Date)),
        other => panic!("expected validation error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_delete_removes_record() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    common::add_scenario(&mut service)?;

    let deleted = service.delete_expense(2)?;
    assert_eq!(deleted.category, "Transport");

    let ids: Vec<_> = service
        .list_expenses(SortOrder::Insertion)
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);

    Ok(())
}

#[test]
fn test_delete_unknown_id_leaves_ledger_unchanged() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    common::add_scenario(&mut service)?;
    let before = service.list_expenses(SortOrder::Insertion);

    let result = service.delete_expense(99);
    assert!(matches!(result, Err(AppError::NotFound(99))));
    assert_eq!(service.list_expenses(SortOrder::Insertion), before);

    Ok(())
}

#[test]
fn test_edit_changes_only_given_fields() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    common::add_scenario(&mut service)?;

    let updated = service.edit_expense(
        1,
        RecordUpdate::default()
            .category("Groceries")
            .description("weekly shop"),
    )?;

    assert_eq!(updated.id, 1);
    assert_eq!(updated.amount_cents, 1250);
    assert_eq!(updated.category, "Groceries");
    assert_eq!(updated.date, parse_date("2024-01-01"));
    assert_eq!(updated.description.as_deref(), Some("weekly shop"));

    // Stored copy matches the returned one
    assert_eq!(service.get_expense(1)?, &updated);
    Ok(())
}

#[test]
fn test_edit_validates_merged_record() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    common::add_scenario(&mut service)?;

    let result = service.edit_expense(
        3,
        RecordUpdate::default()
            .amount(0)
            .date(parse_date("2025-01-01")),
    );
    match result {
        Err(AppError::Validation(e)) => {
            assert!(e.has_issue(Field::Amount));
            assert!(e.has_issue(Field::Date));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let record = service.get_expense(3)?;
    assert_eq!(record.amount_cents, 500);
    assert_eq!(record.date, parse_date("2024-01-02"));
    Ok(())
}

#[test]
fn test_edit_unknown_id() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let result = service.edit_expense(7, RecordUpdate::default().amount(100));
    assert!(matches!(result, Err(AppError::NotFound(7))));

    Ok(())
}

#[test]
fn test_list_sorted_by_date_and_amount() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    service.add_expense(NewRecord::new(900, "Rent").on(parse_date("2024-01-20")))?;
    service.add_expense(NewRecord::new(100, "Food").on(parse_date("2024-01-05")))?;
    service.add_expense(NewRecord::new(500, "Books").on(parse_date("2024-01-10")))?;

    let by_date: Vec<_> = service
        .list_expenses(SortOrder::Date)
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(by_date, vec![2, 3, 1]);

    let by_amount: Vec<_> = service
        .list_expenses(SortOrder::Amount)
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(by_amount, vec![2, 3, 1]);

    let by_category: Vec<_> = service
        .list_expenses(SortOrder::Category)
        .iter()
        .map(|r| r.category.clone())
        .collect();
    assert_eq!(by_category, vec!["Books", "Food", "Rent"]);

    Ok(())
}

#[test]
fn test_used_categories() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    common::add_scenario(&mut service)?;

    assert_eq!(service.used_categories(), vec!["Food", "Transport"]);
    Ok(())
}

#[test]
fn test_amounts_above_cap_are_rejected() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let huge = parse_cents("90000000000000000")?;
    for _ in 0..2 {
        let result = service.add_expense(NewRecord::new(huge, "Food"));
        match result {
            Err(AppError::Validation(e)) => assert!(e.has_issue(Field::Amount)),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    service.add_expense(NewRecord::new(MAX_AMOUNT_CENTS, "Food"))?;
    service.add_expense(NewRecord::new(MAX_AMOUNT_CENTS, "Food"))?;
    assert_eq!(aggregate::total(service.ledger().list()), 2 * MAX_AMOUNT_CENTS);
    assert_eq!(service.totals_by_category().get("Food"), Some(&(2 * MAX_AMOUNT_CENTS)));

    Ok(())
}
