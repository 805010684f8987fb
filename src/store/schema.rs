//! SQLite schema of the workforce database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const EMPLOYEE_TABLE_V1: Table = Table {
    name: "employee",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("telephone", &SqlType::Text, non_null = true),
        sqlite_column!("cpf", &SqlType::Text),
        sqlite_column!("rg", &SqlType::Text),
        sqlite_column!("hire_date", &SqlType::Text),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!("salary", &SqlType::Real, non_null = true, default_value = Some("0")),
        sqlite_column!(
            "weekend_rate",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "holiday_rate",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "has_insurance",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "insurance_amount",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "has_transport_fee",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "transport_fee_daily",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "has_food_support",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "food_support_amount",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("bank_name", &SqlType::Text),
        sqlite_column!("bank_branch", &SqlType::Text),
        sqlite_column!("bank_account", &SqlType::Text),
        sqlite_column!("bank_pix", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_employee_name", "name")],
    unique_constraints: &[],
};

const EMPLOYEE_FK: ForeignKey = ForeignKey {
    foreign_table: "employee",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// One row per employee and period, enforced by the composite unique constraint.
const MONTHLY_WORK_RECORD_TABLE_V1: Table = Table {
    name: "monthly_work_record",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "employee_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&EMPLOYEE_FK)
        ),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "weekends_worked",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "holidays_worked",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "weekend_amount",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "holiday_amount",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "total_amount",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_monthly_work_record_period", "year, month")],
    unique_constraints: &[&["employee_id", "year", "month"]],
};

pub const WORKFORCE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[EMPLOYEE_TABLE_V1, MONTHLY_WORK_RECORD_TABLE_V1],
    migration: None,
}];
