use super::schema::WORKFORCE_VERSIONED_SCHEMAS;
use super::{EmployeeQuery, RecordQuery, StoreError, WorkforceStore};
use crate::model::{
    Employee, EmployeePatch, EmployeeSummary, MonthlyWorkRecord, MonthlyWorkRecordWithEmployee,
    NewEmployee, NewMonthlyWorkRecord, PayAmounts, RecordPatch,
};
use crate::sqlite_persistence::open_versioned;
use anyhow::Result;
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const EMPLOYEE_COLUMNS: &str = "id, name, email, telephone, cpf, rg, hire_date, is_active, \
    salary, weekend_rate, holiday_rate, has_insurance, insurance_amount, has_transport_fee, \
    transport_fee_daily, has_food_support, food_support_amount, bank_name, bank_branch, \
    bank_account, bank_pix, created_at, updated_at";

const RECORD_COLUMNS: &str = "r.id, r.employee_id, r.year, r.month, r.weekends_worked, \
    r.holidays_worked, r.weekend_amount, r.holiday_amount, r.total_amount, r.notes, \
    r.created_at, r.updated_at";

const JOINED_EMPLOYEE_COLUMNS: &str = "e.name AS employee_name, e.email AS employee_email, \
    e.weekend_rate AS employee_weekend_rate, e.holiday_rate AS employee_holiday_rate";

pub struct SqliteWorkforceStore {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl SqliteWorkforceStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = open_versioned(path, WORKFORCE_VERSIONED_SCHEMAS, "workforce")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    fn row_to_employee(row: &rusqlite::Row) -> rusqlite::Result<Employee> {
        Ok(Employee {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            telephone: row.get("telephone")?,
            cpf: row.get("cpf")?,
            rg: row.get("rg")?,
            hire_date: row.get("hire_date")?,
            is_active: row.get("is_active")?,
            salary: row.get("salary")?,
            weekend_rate: row.get("weekend_rate")?,
            holiday_rate: row.get("holiday_rate")?,
            has_insurance: row.get("has_insurance")?,
            insurance_amount: row.get("insurance_amount")?,
            has_transport_fee: row.get("has_transport_fee")?,
            transport_fee_daily: row.get("transport_fee_daily")?,
            has_food_support: row.get("has_food_support")?,
            food_support_amount: row.get("food_support_amount")?,
            bank_name: row.get("bank_name")?,
            bank_branch: row.get("bank_branch")?,
            bank_account: row.get("bank_account")?,
            bank_pix: row.get("bank_pix")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MonthlyWorkRecord> {
        Ok(MonthlyWorkRecord {
            id: row.get("id")?,
            employee_id: row.get("employee_id")?,
            year: row.get("year")?,
            month: row.get("month")?,
            weekends_worked: row.get("weekends_worked")?,
            holidays_worked: row.get("holidays_worked")?,
            weekend_amount: row.get("weekend_amount")?,
            holiday_amount: row.get("holiday_amount")?,
            total_amount: row.get("total_amount")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn row_to_joined_record(row: &rusqlite::Row) -> rusqlite::Result<MonthlyWorkRecordWithEmployee> {
        let record = Self::row_to_record(row)?;
        let employee = EmployeeSummary {
            id: record.employee_id,
            name: row.get("employee_name")?,
            email: row.get("employee_email")?,
            weekend_rate: row.get("employee_weekend_rate")?,
            holiday_rate: row.get("employee_holiday_rate")?,
        };
        Ok(MonthlyWorkRecordWithEmployee { record, employee })
    }

    fn query_employee(conn: &Connection, id: i64) -> rusqlite::Result<Option<Employee>> {
        conn.query_row(
            &format!("SELECT {} FROM employee WHERE id = ?1", EMPLOYEE_COLUMNS),
            params![id],
            Self::row_to_employee,
        )
        .optional()
    }

    fn query_record(conn: &Connection, id: i64) -> rusqlite::Result<Option<MonthlyWorkRecord>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM monthly_work_record r WHERE r.id = ?1",
                RECORD_COLUMNS
            ),
            params![id],
            Self::row_to_record,
        )
        .optional()
    }

    /// Runs `UPDATE table SET ... WHERE id = ?`, returning the number of changed rows.
    fn apply_assignments(
        conn: &Connection,
        table: &str,
        id: i64,
        mut assignments: Vec<(&'static str, SqlValue)>,
    ) -> rusqlite::Result<usize> {
        assignments.push(("updated_at", SqlValue::Text(Self::now())));
        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{} = ?{}", column, index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            set_clause,
            assignments.len() + 1
        );
        let values = assignments
            .into_iter()
            .map(|(_, value)| value)
            .chain(std::iter::once(SqlValue::Integer(id)));
        conn.execute(&sql, params_from_iter(values))
    }
}

fn text(value: &Option<String>) -> SqlValue {
    match value {
        Some(s) => SqlValue::Text(s.clone()),
        None => SqlValue::Null,
    }
}

fn employee_assignments(patch: &EmployeePatch) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    let mut push_text = |column: &'static str, value: &Option<String>| {
        if let Some(v) = value {
            out.push((column, SqlValue::Text(v.clone())));
        }
    };
    push_text("name", &patch.name);
    push_text("email", &patch.email);
    push_text("telephone", &patch.telephone);

    let nullable = [
        ("cpf", &patch.cpf),
        ("rg", &patch.rg),
        ("hire_date", &patch.hire_date),
        ("bank_name", &patch.bank_name),
        ("bank_branch", &patch.bank_branch),
        ("bank_account", &patch.bank_account),
        ("bank_pix", &patch.bank_pix),
    ];
    for (column, value) in nullable {
        if let Some(v) = value {
            out.push((column, text(v)));
        }
    }

    let flags = [
        ("is_active", patch.is_active),
        ("has_insurance", patch.has_insurance),
        ("has_transport_fee", patch.has_transport_fee),
        ("has_food_support", patch.has_food_support),
    ];
    for (column, value) in flags {
        if let Some(v) = value {
            out.push((column, SqlValue::Integer(v as i64)));
        }
    }

    let amounts = [
        ("salary", patch.salary),
        ("weekend_rate", patch.weekend_rate),
        ("holiday_rate", patch.holiday_rate),
        ("insurance_amount", patch.insurance_amount),
        ("transport_fee_daily", patch.transport_fee_daily),
        ("food_support_amount", patch.food_support_amount),
    ];
    for (column, value) in amounts {
        if let Some(v) = value {
            out.push((column, SqlValue::Real(v)));
        }
    }
    out
}

fn record_assignments(patch: &RecordPatch) -> Vec<(&'static str, SqlValue)> {
    let mut out = Vec::new();
    if let Some(year) = patch.year {
        out.push(("year", SqlValue::Integer(year as i64)));
    }
    if let Some(month) = patch.month {
        out.push(("month", SqlValue::Integer(month as i64)));
    }
    if let Some(weekends) = patch.weekends_worked {
        out.push(("weekends_worked", SqlValue::Integer(weekends)));
    }
    if let Some(holidays) = patch.holidays_worked {
        out.push(("holidays_worked", SqlValue::Integer(holidays)));
    }
    if let Some(PayAmounts {
        weekend_amount,
        holiday_amount,
        total_amount,
    }) = patch.amounts
    {
        out.push(("weekend_amount", SqlValue::Real(weekend_amount)));
        out.push(("holiday_amount", SqlValue::Real(holiday_amount)));
        out.push(("total_amount", SqlValue::Real(total_amount)));
    }
    if let Some(notes) = &patch.notes {
        out.push(("notes", text(notes)));
    }
    out
}

impl WorkforceStore for SqliteWorkforceStore {
    fn get_employee(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        let conn = self.lock()?;
        Ok(Self::query_employee(&conn, id)?)
    }

    fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, StoreError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        if let Some(is_active) = query.is_active {
            values.push(SqlValue::Integer(is_active as i64));
            conditions.push("is_active = ?");
        }
        if let Some(name) = &query.name {
            values.push(SqlValue::Text(name.clone()));
            conditions.push("name = ?");
        }
        if let Some(email) = &query.email {
            values.push(SqlValue::Text(email.clone()));
            conditions.push("email = ?");
        }

        let mut sql = format!("SELECT {} FROM employee", EMPLOYEE_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY {} {}, id ASC",
            query.order_by.column(),
            query.direction.sql()
        ));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let employees = stmt
            .query_map(params_from_iter(values), Self::row_to_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, StoreError> {
        let now = Self::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO employee (name, email, telephone, cpf, rg, hire_date, is_active, \
             salary, weekend_rate, holiday_rate, has_insurance, insurance_amount, \
             has_transport_fee, transport_fee_daily, has_food_support, food_support_amount, \
             bank_name, bank_branch, bank_account, bank_pix, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
             ?17, ?18, ?19, ?20, ?21, ?21)",
            params![
                employee.name,
                employee.email,
                employee.telephone,
                employee.cpf,
                employee.rg,
                employee.hire_date,
                employee.is_active,
                employee.salary,
                employee.weekend_rate,
                employee.holiday_rate,
                employee.has_insurance,
                employee.insurance_amount,
                employee.has_transport_fee,
                employee.transport_fee_daily,
                employee.has_food_support,
                employee.food_support_amount,
                employee.bank_name,
                employee.bank_branch,
                employee.bank_account,
                employee.bank_pix,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Created employee {} ({})", id, employee.email);
        Self::query_employee(&conn, id)?.ok_or(StoreError::EmployeeNotFound)
    }

    fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<Employee, StoreError> {
        let conn = self.lock()?;
        let changed = Self::apply_assignments(&conn, "employee", id, employee_assignments(patch))?;
        if changed == 0 {
            return Err(StoreError::EmployeeNotFound);
        }
        Self::query_employee(&conn, id)?.ok_or(StoreError::EmployeeNotFound)
    }

    fn delete_employee(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM employee WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::EmployeeNotFound);
        }
        debug!("Deleted employee {}", id);
        Ok(())
    }

    fn count_employees(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_record(&self, id: i64) -> Result<Option<MonthlyWorkRecord>, StoreError> {
        let conn = self.lock()?;
        Ok(Self::query_record(&conn, id)?)
    }

    fn get_record_with_employee(
        &self,
        id: i64,
    ) -> Result<Option<MonthlyWorkRecordWithEmployee>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {}, {} FROM monthly_work_record r \
                     JOIN employee e ON e.id = r.employee_id WHERE r.id = ?1",
                    RECORD_COLUMNS, JOINED_EMPLOYEE_COLUMNS
                ),
                params![id],
                Self::row_to_joined_record,
            )
            .optional()?;
        Ok(record)
    }

    fn find_record_for_period(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyWorkRecord>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM monthly_work_record r \
                     WHERE r.employee_id = ?1 AND r.year = ?2 AND r.month = ?3",
                    RECORD_COLUMNS
                ),
                params![employee_id, year, month],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<MonthlyWorkRecordWithEmployee>, StoreError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        if let Some(employee_id) = query.employee_id {
            values.push(SqlValue::Integer(employee_id));
            conditions.push("r.employee_id = ?");
        }
        if let Some(year) = query.year {
            values.push(SqlValue::Integer(year as i64));
            conditions.push("r.year = ?");
        }
        if let Some(month) = query.month {
            values.push(SqlValue::Integer(month as i64));
            conditions.push("r.month = ?");
        }

        let mut sql = format!(
            "SELECT {}, {} FROM monthly_work_record r JOIN employee e ON e.id = r.employee_id",
            RECORD_COLUMNS, JOINED_EMPLOYEE_COLUMNS
        );
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&query.order_by.clause(query.direction));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), Self::row_to_joined_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn create_record(
        &self,
        record: &NewMonthlyWorkRecord,
    ) -> Result<MonthlyWorkRecord, StoreError> {
        let now = Self::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO monthly_work_record (employee_id, year, month, weekends_worked, \
             holidays_worked, weekend_amount, holiday_amount, total_amount, notes, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                record.employee_id,
                record.year,
                record.month,
                record.weekends_worked,
                record.holidays_worked,
                record.amounts.weekend_amount,
                record.amounts.holiday_amount,
                record.amounts.total_amount,
                record.notes,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(
            "Created monthly record {} for employee {} ({}-{:02})",
            id, record.employee_id, record.year, record.month
        );
        Self::query_record(&conn, id)?.ok_or(StoreError::RecordNotFound)
    }

    fn update_record(
        &self,
        id: i64,
        patch: &RecordPatch,
    ) -> Result<MonthlyWorkRecord, StoreError> {
        let conn = self.lock()?;
        let changed =
            Self::apply_assignments(&conn, "monthly_work_record", id, record_assignments(patch))?;
        if changed == 0 {
            return Err(StoreError::RecordNotFound);
        }
        Self::query_record(&conn, id)?.ok_or(StoreError::RecordNotFound)
    }

    fn delete_record(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM monthly_work_record WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::RecordNotFound);
        }
        Ok(())
    }

    fn count_records(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM monthly_work_record", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
