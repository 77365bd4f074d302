use std::fs::File;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::application::{AppError, ExpenseService};
use crate::domain::{Cents, NewRecord, RecordId, RecordUpdate, SortOrder, format_cents, parse_cents};
use crate::io::Exporter;

use super::render;

const MENU_ITEMS: [&str; 8] = [
    "Add Expense",
    "View All Expenses",
    "View Summary",
    "View Category Summary",
    "Edit Expense",
    "Delete Expense",
    "Export to CSV",
    "Exit",
];

enum Flow {
    Continue,
    Exit,
}

/// Line-oriented interactive menu over an `ExpenseService`.
///
/// Bad answers are reported and asked again; they never end the session.
/// End of input behaves like choosing Exit.
pub struct Menu<'a, R, W> {
    service: &'a mut ExpenseService,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(service: &'a mut ExpenseService, input: R, out: W) -> Self {
        Self {
            service,
            input,
            out,
        }
    }

    pub fn run(mut self) -> Result<()> {
        writeln!(self.out, "Welcome to Spendlog!")?;
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt(&format!("Select an option (1-{}): ", MENU_ITEMS.len()))? else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => self.add()?,
                "2" => self.view_all()?,
                "3" => self.summary()?,
                "4" => self.category_summary()?,
                "5" => self.edit()?,
                "6" => self.delete()?,
                "7" => self.export()?,
                "8" => Flow::Exit,
                _ => {
                    writeln!(self.out, "Invalid choice. Please select 1-{}.", MENU_ITEMS.len())?;
                    Flow::Continue
                }
            };

            if let Flow::Exit = flow {
                break;
            }
        }
        writeln!(self.out, "Goodbye!")?;
        Ok(())
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(40))?;
        for (i, item) in MENU_ITEMS.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, item)?;
        }
        writeln!(self.out, "{}", "=".repeat(40))?;
        Ok(())
    }

    /// Read one trimmed line, or `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until `parse` accepts the answer. `None` at end of input.
    fn ask<T>(
        &mut self,
        label: &str,
        mut parse: impl FnMut(&str) -> std::result::Result<T, String>,
    ) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(label)? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => writeln!(self.out, "{} Please try again.", message)?,
            }
        }
    }

    fn ask_id(&mut self, label: &str) -> Result<Option<RecordId>> {
        self.ask(label, |answer| {
            answer
                .parse::<RecordId>()
                .map_err(|_| "Please enter a valid ID number.".to_string())
        })
    }

    fn add(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n--- Add New Expense ---")?;
        loop {
            let Some(amount_cents) = self.ask("Enter amount: ", parse_amount)? else {
                return Ok(Flow::Exit);
            };

            let choices = self.service.category_choices();
            self.show_choices(&choices)?;
            let policy = self.service.ledger().policy().categories.clone();
            let Some(category) = self.ask("Select category (number or name): ", |answer| {
                policy.resolve_choice(answer, &choices).map_err(|e| e.to_string())
            })?
            else {
                return Ok(Flow::Exit);
            };

            let Some(date) = self.ask("Enter date (YYYY-MM-DD) or press Enter for today: ", |answer| {
                parse_optional_date(answer)
            })?
            else {
                return Ok(Flow::Exit);
            };

            let Some(description) = self.prompt("Enter description (optional): ")? else {
                return Ok(Flow::Exit);
            };

            let mut new = NewRecord::new(amount_cents, category);
            if let Some(date) = date {
                new = new.on(date);
            }
            if !description.is_empty() {
                new = new.with_description(description);
            }

            match self.service.add_expense(new) {
                Ok(record) => {
                    write!(self.out, "Expense added: ")?;
                    render::write_record(&mut self.out, &record)?;
                    return Ok(Flow::Continue);
                }
                Err(e) if e.is_validation() => {
                    writeln!(self.out, "{} Please try again.", e)?;
                }
                Err(e) => return self.report(e),
            }
        }
    }

    fn view_all(&mut self) -> Result<Flow> {
        let records = self.service.list_expenses(SortOrder::Insertion);
        render::write_records(&mut self.out, &records)?;
        Ok(Flow::Continue)
    }

    fn summary(&mut self) -> Result<Flow> {
        let summary = self.service.summary();
        render::write_summary(&mut self.out, &summary)?;
        Ok(Flow::Continue)
    }

    fn category_summary(&mut self) -> Result<Flow> {
        let used = self.service.used_categories();
        if used.is_empty() {
            writeln!(self.out, "No expenses recorded yet.")?;
            return Ok(Flow::Continue);
        }
        self.show_choices(&used)?;

        let Some(name) = self.prompt("Enter category name: ")? else {
            return Ok(Flow::Exit);
        };
        match self.service.category_detail(&name) {
            Ok(detail) => render::write_category_detail(&mut self.out, &detail)?,
            Err(AppError::CategoryNotFound(_)) => {
                writeln!(self.out, "No expenses found for this category.")?
            }
            Err(e) => return self.report(e),
        }
        Ok(Flow::Continue)
    }

    fn edit(&mut self) -> Result<Flow> {
        if self.service.ledger().is_empty() {
            writeln!(self.out, "No expenses to edit.")?;
            return Ok(Flow::Continue);
        }
        self.view_all()?;

        let Some(id) = self.ask_id("Enter the ID of the expense to edit: ")? else {
            return Ok(Flow::Exit);
        };
        let current = match self.service.get_expense(id) {
            Ok(record) => record.clone(),
            Err(_) => {
                writeln!(self.out, "Expense not found.")?;
                return Ok(Flow::Continue);
            }
        };
        write!(self.out, "Editing: ")?;
        render::write_record(&mut self.out, &current)?;

        loop {
            let mut update = RecordUpdate::default();

            let label = format!("New amount (current: {}, Enter to keep): ", format_cents(current.amount_cents));
            let Some(amount) = self.ask(&label, |answer| {
                if answer.is_empty() { Ok(None) } else { parse_amount(answer).map(Some) }
            })?
            else {
                return Ok(Flow::Exit);
            };
            update.amount_cents = amount;

            let choices = self.service.category_choices();
            self.show_choices(&choices)?;
            let policy = self.service.ledger().policy().categories.clone();
            let label = format!("New category (current: {}, Enter to keep): ", current.category);
            let Some(category) = self.ask(&label, |answer| {
                if answer.is_empty() {
                    Ok(None)
                } else {
                    policy
                        .resolve_choice(answer, &choices)
                        .map(Some)
                        .map_err(|e| e.to_string())
                }
            })?
            else {
                return Ok(Flow::Exit);
            };
            update.category = category;

            let label = format!("New date (current: {}, Enter to keep): ", current.date.format("%Y-%m-%d"));
            let Some(date) = self.ask(&label, parse_optional_date)? else {
                return Ok(Flow::Exit);
            };
            update.date = date;

            let label = format!(
                "New description (current: {}, Enter to keep, '-' to clear): ",
                current.description.as_deref().unwrap_or("None")
            );
            let Some(description) = self.prompt(&label)? else {
                return Ok(Flow::Exit);
            };
            update.description = match description.as_str() {
                "" => None,
                "-" => Some(String::new()),
                _ => Some(description),
            };

            match self.service.edit_expense(id, update) {
                Ok(record) => {
                    write!(self.out, "Expense updated: ")?;
                    render::write_record(&mut self.out, &record)?;
                    return Ok(Flow::Continue);
                }
                Err(e) if e.is_validation() => writeln!(self.out, "{} Please try again.", e)?,
                Err(e) => return self.report(e),
            }
        }
    }

    fn delete(&mut self) -> Result<Flow> {
        if self.service.ledger().is_empty() {
            writeln!(self.out, "No expenses to delete.")?;
            return Ok(Flow::Continue);
        }
        self.view_all()?;

        let Some(id) = self.ask_id("Enter the ID of the expense to delete: ")? else {
            return Ok(Flow::Exit);
        };
        match self.service.delete_expense(id) {
            Ok(record) => {
                write!(self.out, "Deleted expense: ")?;
                render::write_record(&mut self.out, &record)?;
            }
            Err(AppError::NotFound(_)) => writeln!(self.out, "Expense not found.")?,
            Err(e) => return self.report(e),
        }
        Ok(Flow::Continue)
    }

    fn export(&mut self) -> Result<Flow> {
        if self.service.ledger().is_empty() {
            writeln!(self.out, "No expenses to export.")?;
            return Ok(Flow::Continue);
        }

        let default_name = format!("expenses_export_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
        let label = format!("Export file (Enter for {}): ", default_name);
        let Some(answer) = self.prompt(&label)? else {
            return Ok(Flow::Exit);
        };
        let path = if answer.is_empty() { default_name } else { answer };

        let exporter = Exporter::new(&*self.service);
        let result = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path))
            .and_then(|file| exporter.export_csv(file));
        match result {
            Ok(count) => writeln!(self.out, "Exported {} expenses to {}", count, path)?,
            Err(e) => writeln!(self.out, "Error exporting to CSV: {:#}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn show_choices(&mut self, choices: &[String]) -> Result<()> {
        writeln!(self.out, "Categories:")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, choice)?;
        }
        Ok(())
    }

    /// Errors other than bad input end the current action, not the session.
    fn report(&mut self, err: AppError) -> Result<Flow> {
        debug!(error = %err, "menu action failed");
        writeln!(self.out, "Error: {}", err)?;
        Ok(Flow::Continue)
    }
}

fn parse_amount(answer: &str) -> std::result::Result<Cents, String> {
    match parse_cents(answer) {
        Ok(cents) if cents > 0 => Ok(cents),
        Ok(_) => Err("Amount must be positive.".to_string()),
        Err(e) => Err(format!("Please enter a valid number ({}).", e)),
    }
}

fn parse_optional_date(answer: &str) -> std::result::Result<Option<NaiveDate>, String> {
    if answer.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(answer, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Invalid date format. Please use YYYY-MM-DD.".to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::*;
    use crate::config::SaveMode;
    use crate::domain::{Clock, Ledger, LedgerPolicy};
    use crate::storage::JsonStore;

    fn service(dir: &TempDir) -> ExpenseService {
        let ledger = Ledger::with_policy(LedgerPolicy {
            clock: Clock::Fixed(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
            ..LedgerPolicy::default()
        });
        ExpenseService::new(ledger, JsonStore::new(dir.path().join("e.json")), SaveMode::OnExit)
    }

    fn run(service: &mut ExpenseService, script: &str) -> String {
        let mut out = Vec::new();
        Menu::new(service, Cursor::new(script.to_string()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_add_reprompts_invalid_input() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);

        let output = run(
            &mut service,
            "1\nabc\n0\n12.50\n99\n1\n2024-13-01\n2024-01-01\nlunch\n8\n",
        );

        assert!(output.contains("Please enter a valid number"));
        assert!(output.contains("Amount must be positive."));
        assert!(output.contains("out of range"));
        assert!(output.contains("Invalid date format"));
        assert!(output.contains("Expense added: #1 12.50 Food on 2024-01-01 (lunch)"));

        let records = service.list_expenses(SortOrder::Insertion);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount_cents, 1250);
    }

    #[test]
    fn test_future_date_rejected_then_retried() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);

        let output = run(&mut service, "1\n5\nFood\n2030-01-01\n\n5\nFood\n\n\n8\n");

        assert!(output.contains("in the future"));
        let records = service.list_expenses(SortOrder::Insertion);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_edit_keeps_blank_fields() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);
        service
            .add_expense(NewRecord::new(1250, "Food").with_description("lunch"))
            .unwrap();

        let output = run(&mut service, "5\nx\n1\n15\n\n\n-\n8\n");

        assert!(output.contains("Please enter a valid ID number."));
        let record = service.get_expense(1).unwrap();
        assert_eq!(record.amount_cents, 1500);
        assert_eq!(record.category, "Food");
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_delete_unknown_id_keeps_ledger() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);
        service.add_expense(NewRecord::new(1250, "Food")).unwrap();

        let output = run(&mut service, "6\n42\n8\n");

        assert!(output.contains("Expense not found."));
        assert_eq!(service.ledger().len(), 1);
    }

    #[test]
    fn test_invalid_choice_and_end_of_input() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);

        let output = run(&mut service, "42\n");

        assert!(output.contains("Invalid choice."));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_category_summary() {
        let dir = TempDir::new().unwrap();
        let mut service = service(&dir);
        service.add_expense(NewRecord::new(1250, "Food")).unwrap();
        service.add_expense(NewRecord::new(500, "Food")).unwrap();

        let output = run(&mut service, "4\nfood\n4\nRent\n8\n");

        assert!(output.contains("Food Summary"));
        assert!(output.contains("Total:        17.50"));
        assert!(output.contains("No expenses found for this category."));
    }
}
