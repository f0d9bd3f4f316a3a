//! Saved budget operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::SavedBudget;

impl Database {
    /// The user's saved budget, all zeros when nothing has been saved yet
    pub fn get_budget(&self, user_id: i64) -> Result<SavedBudget> {
        let conn = self.conn()?;

        let saved = conn
            .query_row(
                r#"
                SELECT monthly_income, housing, savings, retirement, food, transportation,
                       utilities, insurance, personal_entertainment, debt, household_items,
                       giving, other, updated_at
                FROM budgets
                WHERE user_id = ?
                "#,
                params![user_id],
                |row| {
                    let updated_at: Option<String> = row.get(13)?;
                    Ok(SavedBudget {
                        monthly_income: row.get(0)?,
                        housing: row.get(1)?,
                        savings: row.get(2)?,
                        retirement: row.get(3)?,
                        food: row.get(4)?,
                        transportation: row.get(5)?,
                        utilities: row.get(6)?,
                        insurance: row.get(7)?,
                        personal_entertainment: row.get(8)?,
                        debt: row.get(9)?,
                        household_items: row.get(10)?,
                        giving: row.get(11)?,
                        other: row.get(12)?,
                        updated_at: updated_at.as_deref().map(parse_datetime),
                    })
                },
            )
            .optional()?;

        Ok(saved.unwrap_or_default())
    }

    /// Save the user's budget, replacing any previous one
    pub fn upsert_budget(&self, user_id: i64, budget: &SavedBudget) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO budgets (
                user_id, monthly_income, housing, savings, retirement, food, transportation,
                utilities, insurance, personal_entertainment, debt, household_items, giving, other,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, CURRENT_TIMESTAMP)
            ON CONFLICT(user_id) DO UPDATE SET
                monthly_income = excluded.monthly_income,
                housing = excluded.housing,
                savings = excluded.savings,
                retirement = excluded.retirement,
                food = excluded.food,
                transportation = excluded.transportation,
                utilities = excluded.utilities,
                insurance = excluded.insurance,
                personal_entertainment = excluded.personal_entertainment,
                debt = excluded.debt,
                household_items = excluded.household_items,
                giving = excluded.giving,
                other = excluded.other,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                user_id,
                budget.monthly_income,
                budget.housing,
                budget.savings,
                budget.retirement,
                budget.food,
                budget.transportation,
                budget.utilities,
                budget.insurance,
                budget.personal_entertainment,
                budget.debt,
                budget.household_items,
                budget.giving,
                budget.other,
            ],
        )?;

        Ok(())
    }
}
