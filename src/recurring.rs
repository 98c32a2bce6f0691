//! Monthly recurring events: salary, benefit credits and the card payment.
//!
//! Events are derived in memory for each run and never stored, so changing a
//! rule can never leave stale instances behind.

use crate::account::AccountId;
use crate::calendar::{date_on, month_starts, previous_business_day, second_to_last_business_day, Window};
use crate::config::RecurringRules;
use crate::consolidate::{Event, EventKind};
use crate::error::{EngineError, Result};
use crate::money::Money;
use chrono::{Datelike, Months, NaiveDate};
use log::debug;

pub const SALARY_DESCRIPTION: &str = "Salário";
pub const CARD_PAYMENT_DESCRIPTION: &str = "Pagamento fatura";

/// Generates every recurring event that lands inside `window`.
///
/// Walks each calendar month overlapping the window, plus the month after it:
/// a rule date early in that month can move back onto the last days of the
/// window when it falls on a weekend. Rule days are checked for every
/// overlapping month, so a pay day of 31 fails as soon as the window touches a
/// shorter month, even when the adjusted date would fall outside the window.
pub fn generate_recurring(window: &Window, rules: &RecurringRules, primary: AccountId) -> Result<Vec<Event>> {
    let Some(end) = window.end() else {
        return Ok(Vec::new());
    };

    let following = end
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)));
    let months = month_starts(window.start, end)
        .map(|month| (month, false))
        .chain(following.map(|month| (month, true)));

    let mut events = Vec::new();
    for (month, lookahead) in months {
        let (year, m) = (month.year(), month.month());

        let salary_date = rule_date(year, m, rules.salary_pay_day, lookahead)?;
        if let Some(salary_date) = salary_date.filter(|date| window.contains(*date)) {
            events.push(Event::new(
                salary_date,
                SALARY_DESCRIPTION,
                rules.salary_amount,
                EventKind::Salary { account: primary },
            ));
        }

        let credit_date = second_to_last_business_day(year, m)
            .ok_or(EngineError::InvalidDayOfMonth { day: 1, year, month: m })?;
        if window.contains(credit_date) {
            for credit in &rules.benefit_credits {
                events.push(Event::new(
                    credit_date,
                    format!("Crédito {}", credit.name),
                    credit.amount,
                    EventKind::BenefitCredit { key: credit.key.clone() },
                ));
            }
        }

        let due_date = rule_date(year, m, rules.card_due_day, lookahead)?;
        if let Some(due_date) = due_date.filter(|date| window.contains(*date)) {
            events.push(Event::new(
                due_date,
                CARD_PAYMENT_DESCRIPTION,
                Money::ZERO,
                EventKind::CardPayment { account: primary },
            ));
        }
    }

    debug!(
        "Generated {} recurring events for {} days from {}",
        events.len(),
        window.days,
        window.start
    );
    Ok(events)
}

/// Business-day adjusted date of a monthly rule.
///
/// A day missing from the month after the window is skipped, since only days
/// at the start of a month can move back into the window.
fn rule_date(year: i32, month: u32, day: u32, lookahead: bool) -> Result<Option<NaiveDate>> {
    match date_on(year, month, day) {
        Ok(date) => Ok(Some(previous_business_day(date))),
        Err(_) if lookahead => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenefitCredit;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn rules(pay_day: u32, due_day: u32) -> RecurringRules {
        RecurringRules {
            salary_amount: money("5000"),
            salary_pay_day: pay_day,
            card_due_day: due_day,
            benefit_credits: vec![
                BenefitCredit {
                    key: "vale_refeicao".to_string(),
                    name: "Vale Refeição".to_string(),
                    amount: money("1236.40"),
                },
                BenefitCredit {
                    key: "vale_alimentacao".to_string(),
                    name: "Vale Alimentação".to_string(),
                    amount: money("974.16"),
                },
            ],
        }
    }

    fn dates_of(events: &[Event], pred: impl Fn(&EventKind) -> bool) -> Vec<NaiveDate> {
        events.iter().filter(|e| pred(&e.kind)).map(|e| e.date).collect()
    }

    #[test]
    fn test_weekend_payday_moves_to_friday() {
        // 2025-04-05 is a Saturday
        let window = Window::new(d(2025, 4, 1), 30);
        let events = generate_recurring(&window, &rules(5, 10), 1).unwrap();

        let salaries = dates_of(&events, |k| matches!(k, EventKind::Salary { .. }));
        assert_eq!(salaries, vec![d(2025, 4, 4)]);
        let salary = events.iter().find(|e| e.date == d(2025, 4, 4)).unwrap();
        assert_eq!(salary.amount, money("5000"));
        assert_eq!(salary.description, "Salário");
    }

    #[test]
    fn test_benefit_credits_on_second_to_last_business_day() {
        // November 2025 ends on a Sunday
        let window = Window::new(d(2025, 11, 1), 30);
        let events = generate_recurring(&window, &rules(5, 10), 1).unwrap();

        let credits: Vec<&Event> = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::BenefitCredit { .. }))
            .collect();
        assert_eq!(credits.len(), 2);
        assert!(credits.iter().all(|e| e.date == d(2025, 11, 27)));
        assert_eq!(credits[0].amount, money("1236.40"));
        assert_eq!(credits[0].description, "Crédito Vale Refeição");
        assert_eq!(credits[1].amount, money("974.16"));
    }

    #[test]
    fn test_card_payment_placeholder() {
        // 2025-05-10 is a Saturday
        let window = Window::new(d(2025, 5, 1), 31);
        let events = generate_recurring(&window, &rules(5, 10), 7).unwrap();

        let payment = events
            .iter()
            .find(|e| matches!(e.kind, EventKind::CardPayment { .. }))
            .unwrap();
        assert_eq!(payment.date, d(2025, 5, 9));
        assert!(payment.amount.is_zero());
        assert_eq!(payment.kind, EventKind::CardPayment { account: 7 });
    }

    #[test]
    fn test_only_events_inside_window() {
        // Window 2025-01-06 .. 2025-01-28: misses payday (5th is Sunday -> 3rd)
        // and the benefit credit on the 30th, keeps the card on the 10th
        let window = Window::new(d(2025, 1, 6), 23);
        let events = generate_recurring(&window, &rules(5, 10), 1).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, d(2025, 1, 10));
    }

    #[test]
    fn test_window_spanning_months() {
        let window = Window::new(d(2025, 1, 1), 90);
        let events = generate_recurring(&window, &rules(5, 10), 1).unwrap();

        let salaries = dates_of(&events, |k| matches!(k, EventKind::Salary { .. }));
        // Jan 5 Sunday -> Jan 3; Feb 5 Wednesday; Mar 5 Wednesday
        assert_eq!(salaries, vec![d(2025, 1, 3), d(2025, 2, 5), d(2025, 3, 5)]);

        let payments = dates_of(&events, |k| matches!(k, EventKind::CardPayment { .. }));
        // Jan 10 Friday; Feb 10 Monday; Mar 10 Monday
        assert_eq!(payments, vec![d(2025, 1, 10), d(2025, 2, 10), d(2025, 3, 10)]);
    }

    #[test]
    fn test_next_month_payday_moved_back_into_window() {
        // 2025-02-01 is a Saturday, so February's salary is paid Friday 2025-01-31
        let window = Window::new(d(2025, 1, 1), 31);
        let events = generate_recurring(&window, &rules(1, 1), 1).unwrap();

        let salaries = dates_of(&events, |k| matches!(k, EventKind::Salary { .. }));
        assert_eq!(salaries, vec![d(2025, 1, 1), d(2025, 1, 31)]);
        let payments = dates_of(&events, |k| matches!(k, EventKind::CardPayment { .. }));
        assert_eq!(payments, vec![d(2025, 1, 1), d(2025, 1, 31)]);
    }

    #[test]
    fn test_next_month_only_checked_for_landing_dates() {
        // Pay day 31 is valid in January; February lacks it but is only looked ahead into
        let window = Window::new(d(2025, 1, 1), 31);
        let events = generate_recurring(&window, &rules(31, 10), 1).unwrap();

        let salaries = dates_of(&events, |k| matches!(k, EventKind::Salary { .. }));
        assert_eq!(salaries, vec![d(2025, 1, 31)]);
    }

    #[test]
    fn test_invalid_day_fails_fast() {
        let window = Window::new(d(2025, 1, 15), 30);
        let result = generate_recurring(&window, &rules(31, 10), 1);
        assert!(matches!(
            result,
            Err(EngineError::InvalidDayOfMonth { day: 31, year: 2025, month: 2 })
        ));
    }

    #[test]
    fn test_empty_window_generates_nothing() {
        let window = Window::new(d(2025, 1, 1), 0);
        assert!(generate_recurring(&window, &rules(31, 31), 1).unwrap().is_empty());
    }
}
